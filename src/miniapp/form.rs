use super::models::{
    COPY_POSTS_ACTION, DEFAULT_COUNT, DEFAULT_WINDOW_DAYS, MAX_COUNT, MIN_COUNT, SubmissionRequest,
    ValidationError,
};
use chrono::{Duration, Local, Months, NaiveDate};
use std::num::IntErrorKind;

/// Field values that passed every check, ready to become a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    pub group_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub count: u32,
    pub target_chat: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

#[derive(Debug, Clone)]
pub struct FormController {
    pub group_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    count_text: String,
    count_range: u32,
    pub target_chat: String,
    user_id: Option<i64>,
}

impl FormController {
    pub fn new(user_id: Option<i64>, target_chat: Option<String>) -> Self {
        Self::with_today(Local::now().date_naive(), user_id, target_chat)
    }

    pub fn with_today(today: NaiveDate, user_id: Option<i64>, target_chat: Option<String>) -> Self {
        Self {
            group_id: String::new(),
            start_date: today - Duration::days(DEFAULT_WINDOW_DAYS),
            end_date: today,
            count_text: DEFAULT_COUNT.to_string(),
            count_range: DEFAULT_COUNT,
            target_chat: target_chat.unwrap_or_default(),
            user_id,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn count_text(&self) -> &str {
        &self.count_text
    }

    pub fn count_range(&self) -> u32 {
        self.count_range
    }

    /// Stores the typed count as-is and mirrors its clamped value into the slider.
    pub fn set_count_text(&mut self, text: impl Into<String>) {
        self.count_text = text.into();
        match self.count_text.trim().parse::<i64>() {
            Ok(value) => self.count_range = clamp_count(value),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => self.count_range = MAX_COUNT,
                IntErrorKind::NegOverflow => self.count_range = MIN_COUNT,
                _ => {}
            },
        }
    }

    pub fn set_count_range(&mut self, value: i64) {
        self.count_range = clamp_count(value);
        self.count_text = self.count_range.to_string();
    }

    pub fn step_count_range(&mut self, delta: i64) {
        self.set_count_range(self.count_range as i64 + delta);
    }

    pub fn date(&self, field: DateField) -> NaiveDate {
        match field {
            DateField::Start => self.start_date,
            DateField::End => self.end_date,
        }
    }

    pub fn set_date(&mut self, field: DateField, date: NaiveDate) {
        match field {
            DateField::Start => self.start_date = date,
            DateField::End => self.end_date = date,
        }
    }

    pub fn shift_days(&mut self, field: DateField, days: i64) {
        if let Some(date) = self.date(field).checked_add_signed(Duration::days(days)) {
            self.set_date(field, date);
        }
    }

    pub fn shift_months(&mut self, field: DateField, months: i32) {
        let current = self.date(field);
        let shifted = if months >= 0 {
            current.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            current.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        if let Some(date) = shifted {
            self.set_date(field, date);
        }
    }

    /// Checks run in a fixed order and stop at the first failure.
    pub fn validate(&self) -> Result<ValidatedInput, ValidationError> {
        let group_id = self.group_id.trim();
        if group_id.is_empty() {
            return Err(ValidationError::EmptyGroupId);
        }

        if self.start_date > self.end_date {
            return Err(ValidationError::DateRangeInverted);
        }

        let count = match self.count_text.trim().parse::<i64>() {
            Ok(value) if (MIN_COUNT as i64..=MAX_COUNT as i64).contains(&value) => value as u32,
            _ => return Err(ValidationError::CountOutOfRange),
        };

        let target_chat = self.target_chat.trim();
        if !target_chat.is_empty() && !is_chat_id(target_chat) {
            return Err(ValidationError::InvalidTargetChat);
        }

        Ok(ValidatedInput {
            group_id: group_id.to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            count,
            target_chat: target_chat.to_string(),
        })
    }

    pub fn build_request(&self, validated: ValidatedInput) -> SubmissionRequest {
        SubmissionRequest {
            action: COPY_POSTS_ACTION.to_string(),
            group_id: validated.group_id,
            start_date: validated.start_date,
            end_date: validated.end_date,
            count: validated.count,
            target_chat: validated.target_chat,
            user_id: self.user_id,
        }
    }
}

pub fn clamp_count(value: i64) -> u32 {
    value.clamp(MIN_COUNT as i64, MAX_COUNT as i64) as u32
}

/// Telegram chat ids: digits with an optional leading minus for groups and channels.
pub fn is_chat_id(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
