use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Grade;

const GRADE_COLUMNS: &str = "id, user_id, creator_id, grade_variant, task_id, degrades_at, created_at";

pub async fn create_grade(pool: &PgPool, grade: &Grade) -> Result<Grade, AppError> {
    sqlx::query_as::<_, Grade>(&format!(
        "INSERT INTO grades ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {cols}",
        cols = GRADE_COLUMNS
    ))
    .bind(grade.id)
    .bind(grade.user_id)
    .bind(grade.creator_id)
    .bind(grade.grade_variant)
    .bind(grade.task_id)
    .bind(grade.degrades_at)
    .bind(grade.created_at)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_write(e, "Can't create grade"))
}

/// Grades held by `user_id`, optionally narrowed to one creator and/or one task.
pub async fn get_user_grades(
    pool: &PgPool,
    user_id: Uuid,
    creator_id: Option<Uuid>,
    task_id: Option<Uuid>,
) -> Result<Vec<Grade>, AppError> {
    let grades = sqlx::query_as::<_, Grade>(&format!(
        "SELECT {} FROM grades \
         WHERE user_id = $1 \
           AND ($2::uuid IS NULL OR creator_id = $2) \
           AND ($3::uuid IS NULL OR task_id = $3) \
         ORDER BY created_at",
        GRADE_COLUMNS
    ))
    .bind(user_id)
    .bind(creator_id)
    .bind(task_id)
    .fetch_all(pool)
    .await?;
    Ok(grades)
}
