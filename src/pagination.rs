//! Page-number pagination shared by the comment list and the feed.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

fn default_page() -> i64 {
    1
}

fn default_comments_size() -> i64 {
    10
}

fn default_feed_size() -> i64 {
    20
}

/// `?page=&size=` for `GET /tasks/{task_id}/comments`.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentsPageQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: i64,
    #[serde(default = "default_comments_size")]
    #[validate(range(min = 10, max = 20))]
    pub size: i64,
}

/// `?page=&size=` for `GET /feed`.
#[derive(Debug, Deserialize, Validate)]
pub struct FeedPageQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: i64,
    #[serde(default = "default_feed_size")]
    #[validate(range(min = 1, max = 100))]
    pub size: i64,
}

/// Rows to skip before `page`. Pages far beyond any table are rejected.
pub fn offset(page: i64, size: i64) -> Result<i64, AppError> {
    page.checked_sub(1)
        .and_then(|skipped| skipped.checked_mul(size))
        .ok_or_else(|| AppError::BadRequest(format!("Page {} is out of range", page)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, size: i64) -> Self {
        let pages = if size > 0 { (total + size - 1) / size } else { 0 };
        Self {
            items,
            total,
            page,
            size,
            pages,
        }
    }
}
