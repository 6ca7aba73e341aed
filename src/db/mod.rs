//! Thin data-access functions over the Postgres pool.
//!
//! Reads take the pool. Writes that belong to a larger unit of work take a
//! `Transaction` so the route handler decides where the unit begins and commits.

pub mod comments;
pub mod grades;
pub mod hashtags;
pub mod tasks;
pub mod users;

/// Renders a user preview `{id, username, avatar_url}` for the users table aliased as `alias`.
pub(crate) fn user_preview_json(alias: &str) -> String {
    format!(
        "json_build_object('id', {a}.id, 'username', {a}.username, 'avatar_url', {a}.avatar_url)",
        a = alias
    )
}
