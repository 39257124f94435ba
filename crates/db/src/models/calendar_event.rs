//! Calendar event model and DTOs.

use sqlx::FromRow;
use talent_core::calendar::{CalendarEventType, Visibility, VisibilityType};
use talent_core::error::CoreError;
use talent_core::types::{DbId, Timestamp};

/// A row from the `calendar_events` table. Instants are UTC; handlers
/// project them into the caller's zone before responding.
#[derive(Debug, Clone, FromRow)]
pub struct CalendarEvent {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub start_date_time: Timestamp,
    pub end_date_time: Timestamp,
    pub is_multi_day: bool,
    pub location: Option<String>,
    pub event_type: String,
    pub created_by: DbId,
    pub owner_id: DbId,
    pub visibility_type: String,
    pub visibility_agent_ids: Vec<DbId>,
    pub status: String,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CalendarEvent {
    pub fn event_type(&self) -> Result<CalendarEventType, CoreError> {
        CalendarEventType::try_from(self.event_type.as_str())
    }

    pub fn visibility(&self) -> Result<Visibility, CoreError> {
        Ok(Visibility {
            kind: VisibilityType::try_from(self.visibility_type.as_str())?,
            agent_ids: self.visibility_agent_ids.clone(),
        })
    }
}

/// Validated fields written on create and on full-replace update.
#[derive(Debug, Clone)]
pub struct CalendarEventInput {
    pub title: String,
    pub description: String,
    pub start_date_time: Timestamp,
    pub end_date_time: Timestamp,
    pub is_multi_day: bool,
    pub location: Option<String>,
    pub event_type: CalendarEventType,
    pub visibility: Visibility,
}
