use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::CurrentUser,
    db,
    error::AppError,
    models::{extract_hashtags, CreateTask, Task, UpdateTask},
};

/// Loads the task and checks that `user_id` created it.
async fn task_owned_by(pool: &PgPool, task_id: Uuid, user_id: Uuid) -> Result<Task, AppError> {
    let task = db::tasks::get_task(pool, task_id)
        .await?
        .ok_or_else(|| AppError::task_not_found(task_id))?;
    if task.creator_id != user_id {
        return Err(AppError::not_creator());
    }
    Ok(task)
}

/// Creates a new task.
///
/// A user either creates a task of their own (`creator_id` is the current user) or
/// suggests one to another creator (`suggested_by_id` is the current user).
/// Hashtags found in the description are stored in the same transaction.
///
/// ## Responses:
/// - `201 Created`: Returns the flat `Task` with foreign keys only.
/// - `400 Bad Request`: Invalid payload, a creator/suggester mismatch, or unknown referenced users.
/// - `401 Unauthorized`: Missing or invalid access token.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<CreateTask>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    match payload.suggested_by_id {
        Some(suggested_by_id) if suggested_by_id != user.id => {
            return Err(AppError::BadRequest(
                "Can't create task: Current user id is not equal to suggested_by_id".into(),
            ));
        }
        None if payload.creator_id != user.id => {
            return Err(AppError::BadRequest(
                "Can't create task: Current user id is not equal to creator_id".into(),
            ));
        }
        _ => {}
    }

    let task = Task::new(payload.into_inner());
    let hashtags = task
        .description
        .as_deref()
        .map(extract_hashtags)
        .unwrap_or_default();

    let mut tx = pool.begin().await?;
    let task = db::tasks::create_task(&mut tx, &task).await?;
    db::hashtags::replace_task_hashtags(&mut tx, task.id, &hashtags).await?;
    tx.commit().await?;

    log::info!("Task {} is created by user {}", task.id, user.id);
    Ok(HttpResponse::Created().json(task))
}

/// Returns a task with its creator, assignee and suggester resolved.
///
/// Planning fields (`assignee*`, `assigned_at`, `due_to_date`, `suggested_by*`) are
/// only visible to the creator.
#[get("/{task_id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let mut task = db::tasks::get_task_details(&pool, task_id)
        .await?
        .ok_or_else(|| AppError::task_not_found(task_id))?;

    task.hide_private_fields(user.id);
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task. Only the creator may do it.
///
/// ## Responses:
/// - `200 OK`: JSON object of the written columns.
/// - `400 Bad Request`: Invalid payload, unknown field or unknown assignee.
/// - `403 Forbidden`: The current user is not the creator.
/// - `404 Not Found`: No such task.
#[patch("/{task_id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    task_id: web::Path<Uuid>,
    payload: web::Json<UpdateTask>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let task = task_owned_by(&pool, task_id.into_inner(), user.id).await?;

    let payload = payload.into_inner();
    let hashtags = payload.new_description().map(extract_hashtags);
    let fields = payload.into_fields(Utc::now());

    let mut tx = pool.begin().await?;
    db::tasks::update_task(&mut tx, task.id, &fields).await?;
    if let Some(hashtags) = hashtags {
        db::hashtags::replace_task_hashtags(&mut tx, task.id, &hashtags).await?;
    }
    tx.commit().await?;

    let written: Map<String, Value> = fields
        .iter()
        .map(|field| (field.column().to_string(), field.echo()))
        .collect();
    Ok(HttpResponse::Ok().json(written))
}

/// Deletes a task together with its hashtags, comments and grades.
#[delete("/{task_id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    CurrentUser(user): CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = task_owned_by(&pool, task_id.into_inner(), user.id).await?;

    let mut tx = pool.begin().await?;
    db::tasks::delete_task(&mut tx, task.id).await?;
    tx.commit().await?;

    log::info!("Task {} is deleted by user {}", task.id, user.id);
    Ok(HttpResponse::Ok().json(Value::Null))
}
