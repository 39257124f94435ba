//! Personal checklist items shown on dashboards.

use crate::error::CoreError;

pub const TODO_STATUS_TODO: &str = "todo";
pub const TODO_STATUS_DOING: &str = "doing";
pub const TODO_STATUS_DONE: &str = "done";

pub const VALID_TODO_STATUSES: &[&str] = &[TODO_STATUS_TODO, TODO_STATUS_DOING, TODO_STATUS_DONE];

/// Maximum length of a todo's text.
pub const MAX_TODO_TEXT_LENGTH: usize = 500;

pub fn validate_todo_status(status: &str) -> Result<(), CoreError> {
    if VALID_TODO_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid todo status '{status}'. Must be one of: {}",
            VALID_TODO_STATUSES.join(", ")
        )))
    }
}

pub fn validate_todo_text(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation("Todo text cannot be empty".to_string()));
    }
    if text.chars().count() > MAX_TODO_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Todo text exceeds maximum length of {MAX_TODO_TEXT_LENGTH} characters"
        )));
    }
    Ok(())
}
