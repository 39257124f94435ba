//! Representation model and DTOs.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use talent_core::error::CoreError;
use talent_core::representation::{RepresentationState, RepresentationStatus, RepresentationTerms};
use talent_core::types::{DbId, Timestamp};

/// A row from the `representations` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Representation {
    pub id: DbId,
    pub agent_id: DbId,
    pub client_id: DbId,
    pub status: String,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub next_key_date: Option<Timestamp>,
    pub notes: Option<String>,
    pub terms: Option<Json<RepresentationTerms>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Representation {
    pub fn status(&self) -> Result<RepresentationStatus, CoreError> {
        RepresentationStatus::try_from(self.status.as_str())
    }

    /// The updatable fields, for diffing.
    pub fn state(&self) -> Result<RepresentationState, CoreError> {
        Ok(RepresentationState {
            status: self.status()?,
            next_key_date: self.next_key_date,
            notes: self.notes.clone(),
            terms: self.terms.as_ref().map(|t| t.0.clone()),
        })
    }
}

/// A representation joined with its client's identity.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub representation: Representation,
    pub client_username: String,
    pub client_name: String,
    pub client_avatar_url: Option<String>,
}

/// DTO for creating a representation. Status always starts as `pending`.
#[derive(Debug, Clone)]
pub struct CreateRepresentation {
    pub agent_id: DbId,
    pub client_id: DbId,
    pub terms: Option<RepresentationTerms>,
    pub notes: Option<String>,
}
