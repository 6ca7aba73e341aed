use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{CreateUser, User, UserField};

const USER_COLUMNS: &str = "id, first_name, last_name, username, password, avatar_url, email, \
     telephone_number, receive_email_alerts, email_is_verified, email_verified_at, created_at";

pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = $1",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    if user.is_none() {
        log::info!("No user with email={} in db.", email);
    }
    Ok(user)
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Inserts a new, unverified user. `password_hash` must already be hashed.
pub async fn create_user(
    pool: &PgPool,
    input: &CreateUser,
    password_hash: &str,
) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, first_name, last_name, username, password, avatar_url, email, \
         telephone_number, receive_email_alerts) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.username)
    .bind(password_hash)
    .bind(&input.avatar_url)
    .bind(&input.email)
    .bind(&input.telephone_number)
    .bind(input.receive_email_alerts)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_write(e, "Can't create user"))
}

/// Writes `fields` to the user's row. Nothing is sent when `fields` is empty.
pub async fn update_user(
    pool: &PgPool,
    user_id: Uuid,
    fields: &[UserField],
) -> Result<(), AppError> {
    if fields.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
    let mut assignments = builder.separated(", ");
    for field in fields {
        assignments.push(format!("{} = ", field.column()));
        match field {
            UserField::FirstName(v)
            | UserField::LastName(v)
            | UserField::Username(v)
            | UserField::Email(v)
            | UserField::Password(v) => assignments.push_bind_unseparated(v.clone()),
            UserField::AvatarUrl(v) | UserField::TelephoneNumber(v) => {
                assignments.push_bind_unseparated(v.clone())
            }
            UserField::ReceiveEmailAlerts(v) => assignments.push_bind_unseparated(*v),
        };
    }
    builder.push(" WHERE id = ").push_bind(user_id);

    builder
        .build()
        .execute(pool)
        .await
        .map_err(|e| AppError::from_write(e, "Can't update user"))?;
    Ok(())
}

pub async fn mark_email_verified(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET email_is_verified = TRUE, email_verified_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns `false` when no user has this email.
pub async fn set_password_by_email(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE users SET password = $1 WHERE email = $2")
        .bind(password_hash)
        .bind(email)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
