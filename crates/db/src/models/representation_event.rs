//! Representation audit event model.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use talent_core::representation::{FieldChange, RepresentationEventType};
use talent_core::types::{DbId, Timestamp};

/// A row from the append-only `representation_events` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RepresentationEvent {
    pub id: DbId,
    pub representation_id: DbId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "date")]
    pub event_date: Timestamp,
    pub changes: Option<Json<Vec<FieldChange>>>,
    pub created_by: DbId,
    pub created_at: Timestamp,
}

/// DTO for appending an audit event.
#[derive(Debug, Clone)]
pub struct CreateRepresentationEvent {
    pub representation_id: DbId,
    pub event_type: RepresentationEventType,
    pub title: String,
    pub description: String,
    /// Defaults to now.
    pub event_date: Option<Timestamp>,
    pub changes: Option<Vec<FieldChange>>,
    pub created_by: DbId,
}
