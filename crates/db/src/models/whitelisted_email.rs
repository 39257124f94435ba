//! Whitelisted email model.

use serde::Serialize;
use sqlx::FromRow;
use talent_core::types::{DbId, Timestamp};

/// An email allowed to self-register with the given role and code.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistedEmail {
    pub id: DbId,
    pub email: String,
    pub user_type: String,
    #[serde(skip_serializing)]
    pub registration_code: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
