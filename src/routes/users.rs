use actix_web::{get, patch, post, web, HttpResponse, Responder};
use serde_json::{Map, Value};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    auth::{hash_password, verify_password, CurrentUser, JwtKeys},
    db,
    email::MailgunClient,
    error::AppError,
    models::{CreateUser, UpdateUser, UserField},
    routes::auth::send_verification_email,
};

/// Registers a new user.
///
/// The password is stored as a bcrypt hash and a verification email is sent in the
/// background for users whose email is not verified yet.
///
/// ## Responses:
/// - `201 Created`: Returns the public representation of the new user.
/// - `400 Bad Request`: Invalid payload, or the username or email is already taken.
#[post("")]
pub async fn create_user(
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    mailer: web::Data<MailgunClient>,
    payload: web::Json<CreateUser>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let password_hash = hash_password(&payload.password)?;
    let user = db::users::create_user(&pool, &payload, &password_hash).await?;
    log::info!("User {} is registered", user.id);

    if !user.email_is_verified {
        send_verification_email(&keys, mailer, &user)?;
    }

    Ok(HttpResponse::Created().json(user))
}

/// Returns the authenticated user.
#[get("/me")]
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(user))
}

/// Updates the authenticated user.
///
/// Only fields that differ from the stored values are written, and only those are
/// echoed back. A password change requires the current password in `old_password`.
///
/// ## Responses:
/// - `200 OK`: JSON object of the written fields; a new password is reported as `"updated"`.
/// - `400 Bad Request`: Invalid payload, unknown field, taken username or email, wrong old password.
/// - `401 Unauthorized`: Missing or invalid access token.
#[patch("")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<UpdateUser>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let mut fields = payload.changed_fields(&user);

    for field in &fields {
        match field {
            UserField::Username(username) => {
                if db::users::username_exists(&pool, username).await? {
                    return Err(AppError::user_already_exists(&format!(
                        "username={}",
                        username
                    )));
                }
            }
            UserField::Email(email) => {
                if db::users::email_exists(&pool, email).await? {
                    return Err(AppError::user_already_exists(&format!("email={}", email)));
                }
            }
            _ => {}
        }
    }

    if let (Some(password), Some(old_password)) = (&payload.password, &payload.old_password) {
        // Accounts without a stored password may set one directly.
        if let Some(hash) = &user.password {
            if !verify_password(old_password, hash) {
                return Err(AppError::BadRequest(
                    "Not correct old password, it's not equal to already existing password."
                        .into(),
                ));
            }
        }
        fields.push(UserField::Password(hash_password(password)?));
    }

    db::users::update_user(&pool, user.id, &fields).await?;

    let written: Map<String, Value> = fields
        .iter()
        .map(|field| (field.column().to_string(), field.echo()))
        .collect();
    Ok(HttpResponse::Ok().json(written))
}
