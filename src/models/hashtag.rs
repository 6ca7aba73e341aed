use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

lazy_static! {
    static ref HASHTAG_CANDIDATE: Regex = Regex::new(r"#[-_0-9a-zA-Z]*").unwrap();
}

pub const MAX_HASHTAG_LENGTH: usize = 20;

// A tag must not run straight into one of these.
const FORBIDDEN_FOLLOWERS: &[char] = &[
    ';', '=', '@', '!', '±', '§', '<', '>', '.', '?', '#', '$', '%', '^', '&', '*', '(', ')',
];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hashtag {
    pub id: Uuid,
    pub hashtag: String,
    pub task_id: Uuid,
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Extracts the hashtags of a task description, lower-cased and deduplicated.
///
/// A hashtag is a `#` that does not directly follow a word character, then 1..=20 of
/// `[-_0-9a-zA-Z]` ending on a word boundary. The character right after the tag must
/// not be one of `;=@!±§<>.?#$%^&*()`. When the whole run does not qualify, the longest
/// qualifying prefix is taken.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    for candidate in HASHTAG_CANDIDATE.find_iter(text) {
        let preceded_by_word = text[..candidate.start()]
            .chars()
            .next_back()
            .map_or(false, is_word);
        if preceded_by_word {
            continue;
        }

        let run: Vec<char> = candidate.as_str()[1..].chars().collect();
        let after_run = text[candidate.end()..].chars().next();

        let tag_length = (1..=run.len().min(MAX_HASHTAG_LENGTH)).rev().find(|&len| {
            let next = if len < run.len() { Some(run[len]) } else { after_run };
            let on_boundary = is_word(run[len - 1]) != next.map_or(false, is_word);
            let allowed_next = next.map_or(true, |c| !FORBIDDEN_FOLLOWERS.contains(&c));
            on_boundary && allowed_next
        });

        if let Some(len) = tag_length {
            let tag: String = run[..len].iter().collect::<String>().to_lowercase();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }

    tags
}
