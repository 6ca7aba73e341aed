use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{double_option, non_null, not_blank, UserPreview};

const MAX_DESCRIPTION_LENGTH: usize = 1024;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started yet.
    #[default]
    Idea,
    InProgress,
    Done,
}

/// Payload of `POST /tasks`.
///
/// Either the creator posts a task for themselves, or a user posts a suggestion
/// (`suggested_by_id`) addressed to `creator_id`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateTask {
    #[validate(length(min = 2, max = 128), custom = "not_blank")]
    pub title: String,
    #[validate(length(max = 1024), custom = "not_blank")]
    pub description: Option<String>,
    pub due_to_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
    pub creator_id: Uuid,
    pub suggested_by_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
}

/// A row of the `tasks` table, foreign keys only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_to_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub creator_id: Uuid,
    pub suggested_by_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub assigned_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Builds the row to insert. `assigned_at` is stamped when an assignee is given.
    pub fn new(input: CreateTask) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            due_to_date: input.due_to_date,
            status: input.status,
            created_at: now,
            creator_id: input.creator_id,
            suggested_by_id: input.suggested_by_id,
            assignee_id: input.assignee_id,
            assigned_at: input.assignee_id.map(|_| now),
        }
    }
}

/// A task with its related users resolved, as returned by `GET /tasks/{task_id}`.
#[derive(Debug, Serialize, FromRow)]
pub struct TaskDetails {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_to_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub creator_id: Uuid,
    pub creator: Json<UserPreview>,
    pub assignee_id: Option<Uuid>,
    pub assignee: Option<Json<UserPreview>>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub suggested_by_id: Option<Uuid>,
    pub suggested_by: Option<Json<UserPreview>>,
    pub n_comments: i64,
}

impl TaskDetails {
    /// Blanks out the planning fields that only the creator may see.
    pub fn hide_private_fields(&mut self, viewer_id: Uuid) {
        if viewer_id == self.creator_id {
            return;
        }
        self.assignee = None;
        self.assignee_id = None;
        self.assigned_at = None;
        self.due_to_date = None;
        self.suggested_by_id = None;
        self.suggested_by = None;
    }
}

/// A feed entry.
#[derive(Debug, Serialize, FromRow)]
pub struct FeedTask {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: TaskStatus,
    pub creator: Json<UserPreview>,
    pub n_comments: i64,
}

/// Payload of `PATCH /tasks/{task_id}`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_update_task", skip_on_field_errors = false))]
pub struct UpdateTask {
    #[serde(default, deserialize_with = "non_null")]
    #[validate(length(min = 2, max = 128), custom = "not_blank")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "non_null")]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_to_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,
}

fn validate_update_task(update: &UpdateTask) -> Result<(), ValidationError> {
    if let Some(Some(description)) = &update.description {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(ValidationError::new("description is too long"));
        }
        not_blank(description)?;
    }
    if let Some(Some(due_to_date)) = update.due_to_date {
        if due_to_date <= Utc::now() {
            return Err(ValidationError::new("due_to_date must be in the future"));
        }
    }
    Ok(())
}

/// One column written by `PATCH /tasks/{task_id}`, carrying its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskField {
    Title(String),
    Description(Option<String>),
    Status(TaskStatus),
    DueToDate(Option<DateTime<Utc>>),
    AssigneeId(Option<Uuid>),
    AssignedAt(Option<DateTime<Utc>>),
}

impl TaskField {
    pub fn column(&self) -> &'static str {
        match self {
            TaskField::Title(_) => "title",
            TaskField::Description(_) => "description",
            TaskField::Status(_) => "status",
            TaskField::DueToDate(_) => "due_to_date",
            TaskField::AssigneeId(_) => "assignee_id",
            TaskField::AssignedAt(_) => "assigned_at",
        }
    }

    pub fn echo(&self) -> Value {
        match self {
            TaskField::Title(v) => json!(v),
            TaskField::Description(v) => json!(v),
            TaskField::Status(v) => json!(v),
            TaskField::DueToDate(v) | TaskField::AssignedAt(v) => json!(v),
            TaskField::AssigneeId(v) => json!(v),
        }
    }
}

impl UpdateTask {
    /// The columns to write, in a stable order. Changing the assignee restamps `assigned_at`.
    pub fn into_fields(self, now: DateTime<Utc>) -> Vec<TaskField> {
        let mut fields = Vec::new();
        if let Some(title) = self.title {
            fields.push(TaskField::Title(title));
        }
        if let Some(description) = self.description {
            fields.push(TaskField::Description(description));
        }
        if let Some(status) = self.status {
            fields.push(TaskField::Status(status));
        }
        if let Some(due_to_date) = self.due_to_date {
            fields.push(TaskField::DueToDate(due_to_date));
        }
        if let Some(assignee_id) = self.assignee_id {
            fields.push(TaskField::AssigneeId(assignee_id));
            fields.push(TaskField::AssignedAt(assignee_id.map(|_| now)));
        }
        fields
    }

    /// New description text to extract hashtags from, if the update sets one.
    pub fn new_description(&self) -> Option<&str> {
        match &self.description {
            Some(Some(description)) if !description.is_empty() => Some(description),
            _ => None,
        }
    }
}
