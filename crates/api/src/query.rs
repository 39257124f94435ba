//! Shared query parameter types for API handlers.

use serde::Deserialize;
use talent_core::types::DbId;

/// `?includeInactive=true` on list endpoints that hide archived rows.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Calendar range parameters. `clientId` lets an agent view a client's
/// calendar; without it the requester's own calendar is used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRangeParams {
    pub start_date: String,
    pub end_date: String,
    pub time_zone: String,
    pub client_id: Option<DbId>,
}
