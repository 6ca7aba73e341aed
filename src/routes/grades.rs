use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    auth::CurrentUser,
    db,
    error::AppError,
    models::{CreateGrade, Grade, GradeQuery, GradeWithRights},
};

/// Subscribes the current user to a creator, optionally for a single task.
///
/// ## Responses:
/// - `201 Created`: The grade with its `rank` and `rights`.
/// - `400 Bad Request`: Duplicate subscription or unknown creator/task.
#[post("/subscribe")]
pub async fn subscribe(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<CreateGrade>,
) -> Result<impl Responder, AppError> {
    let grade = Grade::new(payload.into_inner(), user.id);
    let grade = db::grades::create_grade(&pool, &grade).await?;

    log::info!(
        "User {} subscribed to creator {} as {:?}",
        user.id,
        grade.creator_id,
        grade.grade_variant
    );
    Ok(HttpResponse::Created().json(GradeWithRights::from(grade)))
}

/// Grades held by the current user.
#[get("/subscriptions")]
pub async fn get_subscriptions(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    query: web::Query<GradeQuery>,
) -> Result<impl Responder, AppError> {
    let grades: Vec<GradeWithRights> =
        db::grades::get_user_grades(&pool, user.id, query.creator_id, query.task_id)
            .await?
            .into_iter()
            .map(GradeWithRights::from)
            .collect();

    Ok(HttpResponse::Ok().json(json!({ "grades": grades })))
}
