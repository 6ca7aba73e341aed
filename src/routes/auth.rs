use actix_web::{get, http::header, post, web, HttpResponse, Responder};
use chrono::Duration;
use serde_json::Value;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    auth::{
        token::{ACCESS_TOKEN_EXPIRE_MINUTES, REFRESH_PASSWORD_EXPIRE_HOURS},
        hash_password, verify_password, AccessTokenResponse, EmailRequest, JwtKeys,
        NewPasswordRequest, TokenRequest,
    },
    config::Config,
    db,
    email::MailgunClient,
    error::AppError,
    models::User,
};

/// Mints a verify-email token for `user` and mails the confirmation link in the background.
pub(crate) fn send_verification_email(
    keys: &JwtKeys,
    mailer: web::Data<MailgunClient>,
    user: &User,
) -> Result<(), AppError> {
    let token = keys.create_verify_email_token(&user.email)?;
    let email = user.email.clone();
    let avatar_url = user.avatar_url.clone();
    let username = user.username.clone();

    actix_web::rt::spawn(async move {
        if let Err(e) = mailer
            .send_email_confirmation(&token, &email, avatar_url.as_deref(), username.as_deref())
            .await
        {
            log::error!("Can't send verification email to {}: {}", email, e);
        }
    });
    Ok(())
}

async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<User, AppError> {
    db::users::get_user_by_email(pool, email)
        .await?
        .ok_or_else(|| AppError::user_not_found(&format!("email={}", email)))
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::PermanentRedirect()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Issue an access token
///
/// OAuth2 password flow keyed by email. Only verified users with a password may log in.
#[post("/token")]
pub async fn login_for_access_token(
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    form: web::Form<TokenRequest>,
) -> Result<impl Responder, AppError> {
    form.validate()?;

    let user = db::users::get_user_by_email(&pool, &form.email)
        .await?
        .ok_or_else(|| {
            AppError::Unauthorized(format!("User with email={} is not found.", form.email))
        })?;

    if !user.email_is_verified {
        return Err(AppError::Unauthorized(format!(
            "Email {} is not verified.",
            user.email
        )));
    }

    match &user.password {
        Some(hash) if verify_password(&form.password, hash) => {}
        _ => return Err(AppError::Unauthorized("Invalid password".into())),
    }

    log::debug!("Issuing access token for {} with scopes {:?}", user.email, form.scopes());
    let token =
        keys.create_access_token(&user.email, Duration::minutes(ACCESS_TOKEN_EXPIRE_MINUTES))?;
    Ok(HttpResponse::Ok().json(AccessTokenResponse::bearer(token)))
}

/// Confirm an email address from the link sent by mail
#[get("/verifyemail/{token}")]
pub async fn verify_email(
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    config: web::Data<Config>,
    token: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let email = keys.decode_verify_email_token(&token)?;
    let user = find_user_by_email(&pool, &email).await?;

    if user.email_is_verified {
        return Ok(redirect(&config.verified_redirect_url));
    }

    db::users::mark_email_verified(&pool, user.id).await?;
    log::info!("Email {} is verified", user.email);
    Ok(redirect(&config.welcome_redirect_url))
}

#[post("/verifyemail/resend")]
pub async fn resend_verification_email(
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    mailer: web::Data<MailgunClient>,
    payload: web::Json<EmailRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let user = find_user_by_email(&pool, &payload.email).await?;
    if user.email_is_verified {
        return Err(AppError::BadRequest(format!(
            "Email {} is already verified.",
            user.email
        )));
    }

    send_verification_email(&keys, mailer, &user)?;
    Ok(HttpResponse::Ok().json(Value::Null))
}

/// Mail a link for setting a new password
#[post("/refresh-password")]
pub async fn request_password_refresh(
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    mailer: web::Data<MailgunClient>,
    payload: web::Json<EmailRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let user = find_user_by_email(&pool, &payload.email).await?;
    let token = keys.create_refresh_password_token(
        &user.email,
        Duration::hours(REFRESH_PASSWORD_EXPIRE_HOURS),
    )?;

    actix_web::rt::spawn(async move {
        if let Err(e) = mailer
            .send_refresh_password(
                &token,
                &user.email,
                user.avatar_url.as_deref(),
                user.username.as_deref(),
            )
            .await
        {
            log::error!("Can't send refresh password email to {}: {}", user.email, e);
        }
    });

    Ok(HttpResponse::Ok().json(Value::Null))
}

/// Set a new password using the token from the refresh-password email
#[post("/refresh-password/{token}")]
pub async fn refresh_password(
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    token: web::Path<String>,
    payload: web::Json<NewPasswordRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let email = keys.decode_refresh_password_token(&token)?;
    let password_hash = hash_password(&payload.password)?;

    if !db::users::set_password_by_email(&pool, &email, &password_hash).await? {
        return Err(AppError::BadRequest(format!(
            "User with email={} is not found.",
            email
        )));
    }

    Ok(HttpResponse::Ok().json(Value::Null))
}
