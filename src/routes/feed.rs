use actix_web::{get, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

use crate::{auth::MaybeUser, db, error::AppError, pagination::FeedPageQuery};

/// Public feed of tasks, newest first.
///
/// Anonymous callers are welcome; a bearer token, when sent, must still be valid.
#[get("")]
pub async fn get_feed(
    pool: web::Data<PgPool>,
    MaybeUser(viewer): MaybeUser,
    query: web::Query<FeedPageQuery>,
) -> Result<impl Responder, AppError> {
    query.validate()?;

    let page = db::tasks::get_feed(&pool, query.page, query.size).await?;
    log::debug!(
        "Feed page {} for {}",
        query.page,
        viewer.map_or_else(|| "anonymous".to_string(), |user| user.id.to_string())
    );
    Ok(HttpResponse::Ok().json(page))
}
