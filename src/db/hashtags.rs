use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Hashtag;

/// Removes all hashtags of the task and inserts `tags` instead.
pub async fn replace_task_hashtags(
    tx: &mut Transaction<'_, Postgres>,
    task_id: Uuid,
    tags: &[String],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM hashtags WHERE task_id = $1")
        .bind(task_id)
        .execute(&mut **tx)
        .await?;

    if tags.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO hashtags (id, hashtag, task_id) ");
    builder.push_values(tags, |mut row, tag| {
        row.push_bind(Uuid::new_v4())
            .push_bind(tag.clone())
            .push_bind(task_id);
    });

    builder
        .build()
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::from_write(e, "Can't save hashtags"))?;

    log::debug!("Saved {} hashtags for task_id={}", tags.len(), task_id);
    Ok(())
}

pub async fn get_hashtags_for_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Hashtag>, AppError> {
    let hashtags = sqlx::query_as::<_, Hashtag>(
        "SELECT id, hashtag, task_id FROM hashtags WHERE task_id = $1 ORDER BY hashtag",
    )
    .bind(task_id)
    .fetch_all(pool)
    .await?;
    Ok(hashtags)
}
