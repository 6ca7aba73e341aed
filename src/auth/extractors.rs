use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;

use crate::auth::middleware::AccessTokenOutcome;
use crate::db;
use crate::error::AppError;
use crate::models::User;

/// The authenticated caller.
///
/// Requires `AuthMiddleware` to have decoded a valid access token, and the
/// token's email to belong to an existing user. Anything else is a 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The caller if a bearer token was sent, otherwise anonymous.
///
/// A token that is present but invalid is still rejected with 401.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

fn token_outcome(req: &HttpRequest) -> Option<Result<String, AppError>> {
    req.extensions()
        .get::<AccessTokenOutcome>()
        .map(|AccessTokenOutcome(outcome)| outcome.clone().map_err(|e| e.into_access_error()))
}

async fn load_user(pool: Option<web::Data<PgPool>>, email: String) -> Result<User, AppError> {
    let pool = pool.ok_or_else(|| {
        AppError::InternalServerError("Database pool is not configured".into())
    })?;
    db::users::get_user_by_email(&pool, &email)
        .await?
        .ok_or_else(|| AppError::Unauthorized(format!("User with email={} is not found.", email)))
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let outcome = token_outcome(req);
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        Box::pin(async move {
            let email = match outcome {
                Some(outcome) => outcome?,
                None => return Err(AppError::Unauthorized("Not authenticated".into()).into()),
            };
            Ok(CurrentUser(load_user(pool, email).await?))
        })
    }
}

impl FromRequest for MaybeUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let outcome = token_outcome(req);
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        Box::pin(async move {
            match outcome {
                None => Ok(MaybeUser(None)),
                Some(outcome) => {
                    let email = outcome?;
                    Ok(MaybeUser(Some(load_user(pool, email).await?)))
                }
            }
        })
    }
}
