use std::time::Duration;

use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

const DATABASE_PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Health check endpoint
///
/// Returns the current status of the API and timestamp, plus whether the database answers.
#[get("/health")]
pub async fn health(pool: Option<web::Data<PgPool>>) -> impl Responder {
    let database = match pool {
        Some(pool) => {
            let ping = sqlx::query("SELECT 1").execute(pool.get_ref());
            match tokio::time::timeout(DATABASE_PING_TIMEOUT, ping).await {
                Ok(Ok(_)) => "ok",
                Ok(Err(e)) => {
                    log::warn!("Database is unavailable: {}", e);
                    "unavailable"
                }
                Err(_) => {
                    log::warn!("Database did not answer within {:?}", DATABASE_PING_TIMEOUT);
                    "unavailable"
                }
            }
        }
        None => "unavailable",
    };

    HttpResponse::Ok().json(json!({
        "status": "ok",
        "database": database,
        "timestamp": Utc::now()
    }))
}
