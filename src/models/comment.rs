use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::{not_blank, UserPreview};

/// A row of the `tasks_comments` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskComment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TaskComment {
    pub fn new(input: CreateComment) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id: input.task_id,
            user_id: input.user_id,
            content: input.content,
            edited: false,
            edited_at: None,
            created_at: Utc::now(),
        }
    }
}

/// A comment as listed under a task, with its author resolved.
#[derive(Debug, Serialize, FromRow)]
pub struct CommentWithUser {
    pub id: Uuid,
    pub content: String,
    pub edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub user: Json<UserPreview>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateComment {
    pub task_id: Uuid,
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 2000), custom = "not_blank")]
    pub content: String,
}

/// Only the text of a comment can be edited.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateComment {
    #[validate(length(min = 1, max = 2000), custom = "not_blank")]
    pub content: String,
}
