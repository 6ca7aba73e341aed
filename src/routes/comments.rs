use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::CurrentUser,
    db,
    error::AppError,
    models::{CreateComment, TaskComment, UpdateComment},
    pagination::CommentsPageQuery,
};

/// Loads a comment and checks that `user_id` wrote it; `action` names the refused operation.
async fn comment_owned_by(
    pool: &PgPool,
    comment_id: Uuid,
    user_id: Uuid,
    action: &str,
) -> Result<TaskComment, AppError> {
    let comment = db::comments::get_task_comment(pool, comment_id)
        .await?
        .ok_or_else(|| AppError::comment_not_found(comment_id))?;
    if comment.user_id != user_id {
        return Err(AppError::Forbidden(action.to_string()));
    }
    Ok(comment)
}

/// Lists the comments of a task, newest first.
#[get("/{task_id}/comments")]
pub async fn get_comments(
    pool: web::Data<PgPool>,
    _user: CurrentUser,
    task_id: web::Path<Uuid>,
    query: web::Query<CommentsPageQuery>,
) -> Result<impl Responder, AppError> {
    query.validate()?;

    let page =
        db::comments::get_comments_for_task(&pool, task_id.into_inner(), query.page, query.size)
            .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Adds a comment to a task on behalf of the current user.
///
/// ## Responses:
/// - `201 Created`: Returns the stored comment.
/// - `400 Bad Request`: Invalid payload, `user_id` is not the current user, or the task does not exist.
/// - `401 Unauthorized`: Missing or invalid access token.
#[post("/comment")]
pub async fn add_comment(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<CreateComment>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    if payload.user_id != user.id {
        return Err(AppError::BadRequest(
            "Can't add comment to task: Invalid user_id, not equal to current user.".into(),
        ));
    }

    let comment = TaskComment::new(payload.into_inner());
    let comment = db::comments::add_comment_to_task(&pool, &comment).await?;
    Ok(HttpResponse::Created().json(comment))
}

#[patch("/comment/{comment_id}")]
pub async fn update_comment(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    comment_id: web::Path<Uuid>,
    payload: web::Json<UpdateComment>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let comment =
        comment_owned_by(&pool, comment_id.into_inner(), user.id, "Can't update comment").await?;
    db::comments::update_task_comment(&pool, comment.id, &payload.content).await?;

    Ok(HttpResponse::Ok().json(json!({ "content": payload.content })))
}

#[delete("/comment/{comment_id}")]
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    comment_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let comment =
        comment_owned_by(&pool, comment_id.into_inner(), user.id, "Can't delete comment").await?;
    db::comments::delete_task_comment(&pool, comment.id).await?;

    Ok(HttpResponse::Ok().json(Value::Null))
}
