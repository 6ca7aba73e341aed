use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{double_option, non_null, not_blank};
use crate::auth::EMAIL_REGEX;

lazy_static! {
    // Starts with a letter, then letters, digits or underscores; 3..=64 chars total.
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_]{2,63}$").unwrap();
    pub static ref URL_REGEX: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();
}

const MAX_TELEPHONE_LENGTH: usize = 12;

/// A row of the `users` table.
///
/// Serializes to the public representation: the password hash is never written out.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub avatar_url: Option<String>,
    pub email: String,
    pub telephone_number: Option<String>,
    pub receive_email_alerts: bool,
    pub email_is_verified: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// How other users appear inside task, feed and comment payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreview {
    pub id: Uuid,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 64), custom = "not_blank")]
    pub first_name: String,
    #[validate(length(min = 1, max = 64), custom = "not_blank")]
    pub last_name: String,
    #[validate(regex(path = "USERNAME_REGEX", message = "Invalid username"))]
    pub username: Option<String>,
    #[validate(length(min = 8, max = 64))]
    pub password: String,
    #[validate(
        length(max = 35),
        regex(path = "EMAIL_REGEX", message = "Invalid email")
    )]
    pub email: String,
    #[validate(regex(path = "URL_REGEX", message = "Invalid url"))]
    pub avatar_url: Option<String>,
    #[validate(length(max = 12))]
    pub telephone_number: Option<String>,
    #[serde(default = "default_true")]
    pub receive_email_alerts: bool,
}

/// Partial update of the current user.
///
/// Only `avatar_url` and `telephone_number` may be set to `null`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_update_user", skip_on_field_errors = false))]
pub struct UpdateUser {
    #[serde(default, deserialize_with = "non_null")]
    #[validate(length(min = 1, max = 64), custom = "not_blank")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    #[validate(length(min = 1, max = 64), custom = "not_blank")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    #[validate(regex(path = "USERNAME_REGEX", message = "Invalid username"))]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    #[validate(
        length(max = 35),
        regex(path = "EMAIL_REGEX", message = "Invalid email")
    )]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub telephone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "non_null")]
    pub receive_email_alerts: Option<bool>,
    #[serde(default, deserialize_with = "non_null")]
    #[validate(length(min = 8, max = 64))]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub old_password: Option<String>,
}

fn validate_update_user(update: &UpdateUser) -> Result<(), ValidationError> {
    if let Some(Some(url)) = &update.avatar_url {
        if !URL_REGEX.is_match(url) {
            return Err(ValidationError::new("avatar_url must be a http(s) url"));
        }
    }
    if let Some(Some(phone)) = &update.telephone_number {
        if phone.chars().count() > MAX_TELEPHONE_LENGTH {
            return Err(ValidationError::new("telephone_number is too long"));
        }
    }
    match (&update.password, &update.old_password) {
        (Some(_), None) => Err(ValidationError::new(
            "old_password is required to set a new password",
        )),
        (None, Some(_)) => Err(ValidationError::new(
            "password is required when old_password is given",
        )),
        (Some(new), Some(old)) if new == old => Err(ValidationError::new(
            "new password must differ from the old one",
        )),
        _ => Ok(()),
    }
}

/// One column written by `PATCH /users`, carrying its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum UserField {
    FirstName(String),
    LastName(String),
    Username(String),
    Email(String),
    AvatarUrl(Option<String>),
    TelephoneNumber(Option<String>),
    ReceiveEmailAlerts(bool),
    /// Already hashed.
    Password(String),
}

impl UserField {
    pub fn column(&self) -> &'static str {
        match self {
            UserField::FirstName(_) => "first_name",
            UserField::LastName(_) => "last_name",
            UserField::Username(_) => "username",
            UserField::Email(_) => "email",
            UserField::AvatarUrl(_) => "avatar_url",
            UserField::TelephoneNumber(_) => "telephone_number",
            UserField::ReceiveEmailAlerts(_) => "receive_email_alerts",
            UserField::Password(_) => "password",
        }
    }

    /// The value echoed back to the client. Password hashes are reported as `"updated"`.
    pub fn echo(&self) -> Value {
        match self {
            UserField::FirstName(v)
            | UserField::LastName(v)
            | UserField::Username(v)
            | UserField::Email(v) => json!(v),
            UserField::AvatarUrl(v) | UserField::TelephoneNumber(v) => json!(v),
            UserField::ReceiveEmailAlerts(v) => json!(v),
            UserField::Password(_) => json!("updated"),
        }
    }
}

impl UpdateUser {
    /// Plain fields that differ from the current values of `user`.
    ///
    /// The password pair is handled separately because it has to be verified and hashed.
    pub fn changed_fields(&self, user: &User) -> Vec<UserField> {
        let mut fields = Vec::new();

        if let Some(v) = self.first_name.as_ref().filter(|v| **v != user.first_name) {
            fields.push(UserField::FirstName(v.clone()));
        }
        if let Some(v) = self.last_name.as_ref().filter(|v| **v != user.last_name) {
            fields.push(UserField::LastName(v.clone()));
        }
        if let Some(v) = self
            .username
            .as_ref()
            .filter(|v| user.username.as_ref() != Some(*v))
        {
            fields.push(UserField::Username(v.clone()));
        }
        if let Some(v) = self.email.as_ref().filter(|v| **v != user.email) {
            fields.push(UserField::Email(v.clone()));
        }
        if let Some(v) = self.avatar_url.as_ref().filter(|v| **v != user.avatar_url) {
            fields.push(UserField::AvatarUrl(v.clone()));
        }
        if let Some(v) = self
            .telephone_number
            .as_ref()
            .filter(|v| **v != user.telephone_number)
        {
            fields.push(UserField::TelephoneNumber(v.clone()));
        }
        if let Some(v) = self
            .receive_email_alerts
            .filter(|v| *v != user.receive_email_alerts)
        {
            fields.push(UserField::ReceiveEmailAlerts(v));
        }

        fields
    }
}
