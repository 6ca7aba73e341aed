use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Subscription tier of a user towards a creator, optionally scoped to one task.
/// Corresponds to the `grade_variant` SQL enum.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "grade_variant", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GradeVariant {
    #[default]
    Subscribed,
    PaidPost,
    PaidSubscriber,
    TeamCreator,
    Creator,
}

/// Capability names with the minimal rank that grants them.
pub const RIGHTS: &[(&str, u8)] = &[
    ("view_tasks", 1),
    ("comment_tasks", 1),
    ("suggest_tasks", 1),
    ("view_paid_posts", 2),
    ("view_paid_tasks", 3),
    ("assign_tasks", 4),
    ("manage_tasks", 5),
];

impl GradeVariant {
    /// Rank 0 is reserved for "no grade at all".
    pub fn rank(self) -> u8 {
        match self {
            GradeVariant::Subscribed => 1,
            GradeVariant::PaidPost => 2,
            GradeVariant::PaidSubscriber => 3,
            GradeVariant::TeamCreator => 4,
            GradeVariant::Creator => 5,
        }
    }

    pub fn rights(self) -> Vec<&'static str> {
        rights_for_rank(self.rank())
    }
}

pub fn rights_for_rank(rank: u8) -> Vec<&'static str> {
    RIGHTS
        .iter()
        .filter(|(_, threshold)| rank >= *threshold)
        .map(|(name, _)| *name)
        .collect()
}

/// A row of the `grades` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Grade {
    pub id: Uuid,
    pub user_id: Uuid,
    pub creator_id: Uuid,
    pub grade_variant: GradeVariant,
    pub task_id: Option<Uuid>,
    pub degrades_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A grade together with what it allows.
#[derive(Debug, Serialize)]
pub struct GradeWithRights {
    #[serde(flatten)]
    pub grade: Grade,
    pub rank: u8,
    pub rights: Vec<&'static str>,
}

impl From<Grade> for GradeWithRights {
    fn from(grade: Grade) -> Self {
        Self {
            rank: grade.grade_variant.rank(),
            rights: grade.grade_variant.rights(),
            grade,
        }
    }
}

/// Payload of `POST /tasks/subscribe`. The subscriber is always the current user.
#[derive(Debug, Deserialize)]
pub struct CreateGrade {
    pub creator_id: Uuid,
    #[serde(default)]
    pub grade_variant: GradeVariant,
    pub task_id: Option<Uuid>,
    pub degrades_at: Option<DateTime<Utc>>,
}

impl Grade {
    pub fn new(input: CreateGrade, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            creator_id: input.creator_id,
            grade_variant: input.grade_variant,
            task_id: input.task_id,
            degrades_at: input.degrades_at,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GradeQuery {
    pub creator_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
}
