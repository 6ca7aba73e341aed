use sqlx::PgPool;
use uuid::Uuid;

use super::user_preview_json;
use crate::error::AppError;
use crate::models::{CommentWithUser, TaskComment};
use crate::pagination::{offset, Page};

const COMMENT_COLUMNS: &str = "id, task_id, user_id, content, edited, edited_at, created_at";

pub async fn add_comment_to_task(
    pool: &PgPool,
    comment: &TaskComment,
) -> Result<TaskComment, AppError> {
    sqlx::query_as::<_, TaskComment>(&format!(
        "INSERT INTO tasks_comments ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {cols}",
        cols = COMMENT_COLUMNS
    ))
    .bind(comment.id)
    .bind(comment.task_id)
    .bind(comment.user_id)
    .bind(&comment.content)
    .bind(comment.edited)
    .bind(comment.edited_at)
    .bind(comment.created_at)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_write(e, "Can't add comment to task"))
}

pub async fn get_task_comment(
    pool: &PgPool,
    comment_id: Uuid,
) -> Result<Option<TaskComment>, AppError> {
    let comment = sqlx::query_as::<_, TaskComment>(&format!(
        "SELECT {} FROM tasks_comments WHERE id = $1",
        COMMENT_COLUMNS
    ))
    .bind(comment_id)
    .fetch_optional(pool)
    .await?;
    Ok(comment)
}

/// Replaces the text and marks the comment as edited now.
pub async fn update_task_comment(
    pool: &PgPool,
    comment_id: Uuid,
    content: &str,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE tasks_comments SET content = $1, edited = TRUE, edited_at = NOW() WHERE id = $2",
    )
    .bind(content)
    .bind(comment_id)
    .execute(pool)
    .await
    .map_err(|e| AppError::from_write(e, "Can't update comment"))?;
    Ok(())
}

pub async fn delete_task_comment(pool: &PgPool, comment_id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM tasks_comments WHERE id = $1")
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count_comments_for_task(pool: &PgPool, task_id: Uuid) -> Result<i64, AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks_comments WHERE task_id = $1")
        .bind(task_id)
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// One page of a task's comments, newest first, each with its author preview.
pub async fn get_comments_for_task(
    pool: &PgPool,
    task_id: Uuid,
    page: i64,
    size: i64,
) -> Result<Page<CommentWithUser>, AppError> {
    let skip = offset(page, size)?;
    let query = format!(
        r#"
        SELECT
            comment.id,
            comment.content,
            comment.edited,
            comment.edited_at,
            comment.created_at,
            {author} AS "user"
        FROM tasks_comments comment
        JOIN users author ON comment.user_id = author.id
        WHERE comment.task_id = $1
        ORDER BY comment.created_at DESC, comment.id
        LIMIT $2
        OFFSET $3
        "#,
        author = user_preview_json("author"),
    );

    let items = async {
        sqlx::query_as::<_, CommentWithUser>(&query)
            .bind(task_id)
            .bind(size)
            .bind(skip)
            .fetch_all(pool)
            .await
            .map_err(AppError::from)
    };

    let (items, total) = futures::try_join!(items, count_comments_for_task(pool, task_id))?;
    Ok(Page::new(items, total, page, size))
}
