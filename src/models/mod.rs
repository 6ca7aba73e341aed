pub mod comment;
pub mod grade;
pub mod hashtag;
pub mod task;
pub mod user;

use serde::{Deserialize, Deserializer};
use validator::ValidationError;

pub use comment::{CommentWithUser, CreateComment, TaskComment, UpdateComment};
pub use grade::{CreateGrade, Grade, GradeQuery, GradeVariant, GradeWithRights};
pub use hashtag::{extract_hashtags, Hashtag};
pub use task::{CreateTask, FeedTask, Task, TaskDetails, TaskField, TaskStatus, UpdateTask};
pub use user::{CreateUser, UpdateUser, User, UserField, UserPreview};

/// Deserializes a field that distinguishes "absent" from `null`.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`: a missing key
/// stays `None`, an explicit `null` becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Deserializes an optional field that must not be `null` when present.
///
/// Use with `#[serde(default, deserialize_with = "non_null")]`.
pub fn non_null<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        avatar_url: Option<Option<String>>,
        #[serde(default, deserialize_with = "non_null")]
        first_name: Option<String>,
    }

    #[test]
    fn test_absent_null_and_value_are_distinct() {
        let patch: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.avatar_url, None);
        assert_eq!(patch.first_name, None);

        let patch: Patch = serde_json::from_str(r#"{"avatar_url": null}"#).unwrap();
        assert_eq!(patch.avatar_url, Some(None));

        let patch: Patch =
            serde_json::from_str(r#"{"avatar_url": "https://a.b/c.png", "first_name": "Steve"}"#)
                .unwrap();
        assert_eq!(patch.avatar_url, Some(Some("https://a.b/c.png".to_string())));
        assert_eq!(patch.first_name.as_deref(), Some("Steve"));
    }

    #[test]
    fn test_null_for_non_nullable_field_is_rejected() {
        assert!(serde_json::from_str::<Patch>(r#"{"first_name": null}"#).is_err());
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("a").is_ok());
        assert!(not_blank("  ").is_err());
        assert!(not_blank("").is_err());
    }
}
