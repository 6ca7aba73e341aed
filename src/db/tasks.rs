use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::user_preview_json;
use crate::error::AppError;
use crate::models::{FeedTask, Task, TaskDetails, TaskField};
use crate::pagination::{offset, Page};

const TASK_COLUMNS: &str = "id, title, description, due_to_date, status, created_at, creator_id, \
     suggested_by_id, assignee_id, assigned_at";

pub async fn create_task(
    tx: &mut Transaction<'_, Postgres>,
    task: &Task,
) -> Result<Task, AppError> {
    sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {cols}",
        cols = TASK_COLUMNS
    ))
    .bind(task.id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.due_to_date)
    .bind(task.status)
    .bind(task.created_at)
    .bind(task.creator_id)
    .bind(task.suggested_by_id)
    .bind(task.assignee_id)
    .bind(task.assigned_at)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| AppError::from_write(e, "Can't create task"))
}

pub async fn get_task(pool: &PgPool, task_id: Uuid) -> Result<Option<Task>, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1",
        TASK_COLUMNS
    ))
    .bind(task_id)
    .fetch_optional(pool)
    .await?;
    Ok(task)
}

/// Loads a task with creator, assignee and suggester previews and its comment count.
pub async fn get_task_details(
    pool: &PgPool,
    task_id: Uuid,
) -> Result<Option<TaskDetails>, AppError> {
    let query = format!(
        r#"
        SELECT
            tasks.id,
            tasks.title,
            tasks.description,
            tasks.status,
            tasks.due_to_date,
            tasks.created_at,
            tasks.creator_id,
            {creator} AS creator,
            tasks.assignee_id,
            CASE WHEN tasks.assignee_id IS NULL THEN NULL ELSE {assignee} END AS assignee,
            tasks.assigned_at,
            tasks.suggested_by_id,
            CASE WHEN tasks.suggested_by_id IS NULL THEN NULL ELSE {suggested_by} END AS suggested_by,
            (SELECT COUNT(*) FROM tasks_comments tc WHERE tc.task_id = tasks.id) AS n_comments
        FROM tasks
        JOIN users creator ON tasks.creator_id = creator.id
        LEFT JOIN users assignee ON tasks.assignee_id = assignee.id
        LEFT JOIN users suggested_by ON tasks.suggested_by_id = suggested_by.id
        WHERE tasks.id = $1
        "#,
        creator = user_preview_json("creator"),
        assignee = user_preview_json("assignee"),
        suggested_by = user_preview_json("suggested_by"),
    );

    let task = sqlx::query_as::<_, TaskDetails>(&query)
        .bind(task_id)
        .fetch_optional(pool)
        .await?;
    Ok(task)
}

/// Writes `fields` to the task's row. Nothing is sent when `fields` is empty.
pub async fn update_task(
    tx: &mut Transaction<'_, Postgres>,
    task_id: Uuid,
    fields: &[TaskField],
) -> Result<(), AppError> {
    if fields.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE tasks SET ");
    let mut assignments = builder.separated(", ");
    for field in fields {
        assignments.push(format!("{} = ", field.column()));
        match field {
            TaskField::Title(v) => assignments.push_bind_unseparated(v.clone()),
            TaskField::Description(v) => assignments.push_bind_unseparated(v.clone()),
            TaskField::Status(v) => assignments.push_bind_unseparated(*v),
            TaskField::DueToDate(v) | TaskField::AssignedAt(v) => {
                assignments.push_bind_unseparated(*v)
            }
            TaskField::AssigneeId(v) => assignments.push_bind_unseparated(*v),
        };
    }
    builder.push(" WHERE id = ").push_bind(task_id);

    builder
        .build()
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::from_write(e, "Can't update task"))?;
    Ok(())
}

/// Removes the task together with its hashtags, comments and grades.
pub async fn delete_task(
    tx: &mut Transaction<'_, Postgres>,
    task_id: Uuid,
) -> Result<(), AppError> {
    for statement in [
        "DELETE FROM hashtags WHERE task_id = $1",
        "DELETE FROM tasks_comments WHERE task_id = $1",
        "DELETE FROM grades WHERE task_id = $1",
        "DELETE FROM tasks WHERE id = $1",
    ] {
        sqlx::query(statement)
            .bind(task_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                log::error!("Can't delete task_id={}: {}", task_id, e);
                AppError::BadRequest(format!("Can't delete task: {}", e))
            })?;
    }
    Ok(())
}

pub async fn count_tasks(pool: &PgPool) -> Result<i64, AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// One page of the public feed, newest tasks first.
pub async fn get_feed(pool: &PgPool, page: i64, size: i64) -> Result<Page<FeedTask>, AppError> {
    let skip = offset(page, size)?;
    let query = format!(
        r#"
        SELECT
            tasks.id,
            tasks.title,
            tasks.description,
            tasks.created_at,
            tasks.status,
            {creator} AS creator,
            (SELECT COUNT(*) FROM tasks_comments tc WHERE tc.task_id = tasks.id) AS n_comments
        FROM tasks
        JOIN users creator ON tasks.creator_id = creator.id
        ORDER BY tasks.created_at DESC, tasks.id
        LIMIT $1
        OFFSET $2
        "#,
        creator = user_preview_json("creator"),
    );

    let items = async {
        sqlx::query_as::<_, FeedTask>(&query)
            .bind(size)
            .bind(skip)
            .fetch_all(pool)
            .await
            .map_err(AppError::from)
    };

    let (items, total) = futures::try_join!(items, count_tasks(pool))?;
    Ok(Page::new(items, total, page, size))
}
