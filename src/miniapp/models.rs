use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const COPY_POSTS_ACTION: &str = "copy_posts";

pub const MIN_COUNT: u32 = 1;
pub const MAX_COUNT: u32 = 100;
pub const DEFAULT_COUNT: u32 = 50;

/// Width of the date window the form starts with.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// The single message handed to the host for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub action: String,
    pub group_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub count: u32,
    pub target_chat: String,
    pub user_id: Option<i64>,
}

impl SubmissionRequest {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub name: String,
    pub id: String,
}

impl Shortcut {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Enter the community name or ID.")]
    EmptyGroupId,
    #[error("The start date must not be later than the end date.")]
    DateRangeInverted,
    #[error("The number of posts must be between 1 and 100.")]
    CountOutOfRange,
    #[error("The target chat must be a numeric chat ID, for example -1001234567890.")]
    InvalidTargetChat,
    #[error("Fill in both the shortcut name and the community ID.")]
    IncompleteShortcut,
}
