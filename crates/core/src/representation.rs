//! Representation lifecycle rules.
//!
//! A representation links one agent to one client. Every mutation goes
//! through a field-by-field diff against the persisted state so that only
//! real changes are written and each mutating call produces at most one
//! audit event carrying all of its field changes.

use std::fmt;

use chrono::SubsecRound;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a representation.
///
/// `Inactive` is terminal: re-engaging a client requires a new
/// representation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationStatus {
    Pending,
    Active,
    OnSet,
    Away,
    OnHold,
    Inactive,
}

impl RepresentationStatus {
    pub const ALL: [RepresentationStatus; 6] = [
        Self::Pending,
        Self::Active,
        Self::OnSet,
        Self::Away,
        Self::OnHold,
        Self::Inactive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::OnSet => "on_set",
            Self::Away => "away",
            Self::OnHold => "on_hold",
            Self::Inactive => "inactive",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Inactive
    }

    /// Whether a record in this status may move to `next`.
    pub fn can_transition_to(self, next: RepresentationStatus) -> bool {
        self == next || !self.is_terminal()
    }
}

impl fmt::Display for RepresentationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RepresentationStatus {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| CoreError::Validation(format!("Unknown representation status '{value}'")))
    }
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

/// Commercial terms of a representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentationTerms {
    /// Commission percentage, 0 to 100.
    pub commission: f64,
    pub exclusivity: bool,
    pub territories: Vec<String>,
    pub media_types: Vec<String>,
}

impl RepresentationTerms {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.commission.is_finite() || !(0.0..=100.0).contains(&self.commission) {
            return Err(CoreError::Validation(format!(
                "Commission must be between 0 and 100, got {}",
                self.commission
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Audit event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationEventType {
    Created,
    Updated,
    StatusChanged,
    TermsUpdated,
    Archived,
    Ended,
    Meeting,
    Call,
    Email,
    Submission,
    Audition,
    Other,
}

impl RepresentationEventType {
    pub const ALL: [RepresentationEventType; 12] = [
        Self::Created,
        Self::Updated,
        Self::StatusChanged,
        Self::TermsUpdated,
        Self::Archived,
        Self::Ended,
        Self::Meeting,
        Self::Call,
        Self::Email,
        Self::Submission,
        Self::Audition,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::TermsUpdated => "terms_updated",
            Self::Archived => "archived",
            Self::Ended => "ended",
            Self::Meeting => "meeting",
            Self::Call => "call",
            Self::Email => "email",
            Self::Submission => "submission",
            Self::Audition => "audition",
            Self::Other => "other",
        }
    }

    /// Activity types an agent may log by hand. The rest are emitted by the
    /// lifecycle operations only.
    pub fn is_manual(self) -> bool {
        matches!(
            self,
            Self::Meeting | Self::Call | Self::Email | Self::Submission | Self::Audition | Self::Other
        )
    }
}

impl fmt::Display for RepresentationEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RepresentationEventType {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| CoreError::Validation(format!("Unknown representation event type '{value}'")))
    }
}

pub const CREATED_TITLE: &str = "Representation Created";
pub const CREATED_DESCRIPTION: &str = "Representation established for client.";
pub const ARCHIVED_TITLE: &str = "Representation Archived";
pub const ARCHIVED_DESCRIPTION: &str = "Representation marked as inactive.";
pub const UPDATED_DESCRIPTION: &str = "Representation details updated.";

// ---------------------------------------------------------------------------
// Updatable state
// ---------------------------------------------------------------------------

/// The mutable portion of a representation, as persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RepresentationState {
    pub status: RepresentationStatus,
    pub next_key_date: Option<Timestamp>,
    pub notes: Option<String>,
    pub terms: Option<RepresentationTerms>,
}

/// One updatable field together with its value.
#[derive(Debug, Clone, PartialEq)]
pub enum RepresentationField {
    Status(RepresentationStatus),
    NextKeyDate(Option<Timestamp>),
    Notes(Option<String>),
    Terms(Option<RepresentationTerms>),
}

impl RepresentationField {
    /// Field name as it appears in request bodies and audit entries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::NextKeyDate(_) => "nextKeyDate",
            Self::Notes(_) => "notes",
            Self::Terms(_) => "terms",
        }
    }

    /// The same field read from `state`.
    fn current(&self, state: &RepresentationState) -> RepresentationField {
        match self {
            Self::Status(_) => Self::Status(state.status),
            Self::NextKeyDate(_) => Self::NextKeyDate(state.next_key_date),
            Self::Notes(_) => Self::Notes(state.notes.clone()),
            Self::Terms(_) => Self::Terms(state.terms.clone()),
        }
    }

    /// An owned JSON snapshot of the value, detached from the live record.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Status(s) => Value::String(s.as_str().to_string()),
            Self::NextKeyDate(d) => d.map_or(Value::Null, |d| Value::String(d.to_rfc3339())),
            Self::Notes(n) => n.clone().map_or(Value::Null, Value::String),
            Self::Terms(t) => serde_json::to_value(t).unwrap_or(Value::Null),
        }
    }

    fn apply(self, state: &mut RepresentationState) {
        match self {
            Self::Status(s) => state.status = s,
            Self::NextKeyDate(d) => state.next_key_date = d,
            Self::Notes(n) => state.notes = n,
            Self::Terms(t) => state.terms = t,
        }
    }
}

/// A partial update. For the optional fields an absent key leaves the
/// field untouched while an explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentationUpdate {
    #[serde(default)]
    pub status: Option<RepresentationStatus>,
    #[serde(default, deserialize_with = "present")]
    pub next_key_date: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub terms: Option<Option<RepresentationTerms>>,
}

/// Marks a key as present, keeping `null` distinct from absent.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl RepresentationUpdate {
    pub fn status(status: RepresentationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn terms(terms: Option<RepresentationTerms>) -> Self {
        Self {
            terms: Some(terms),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// The fields present in this update.
    ///
    /// `nextKeyDate` is truncated to microseconds, the precision it is
    /// stored at, so a repeated update compares equal to the persisted value.
    pub fn fields(&self) -> Vec<RepresentationField> {
        let mut fields = Vec::new();
        if let Some(status) = self.status {
            fields.push(RepresentationField::Status(status));
        }
        if let Some(next_key_date) = self.next_key_date {
            fields.push(RepresentationField::NextKeyDate(
                next_key_date.map(|d| d.trunc_subsecs(6)),
            ));
        }
        if let Some(notes) = &self.notes {
            fields.push(RepresentationField::Notes(notes.clone()));
        }
        if let Some(terms) = &self.terms {
            fields.push(RepresentationField::Terms(terms.clone()));
        }
        fields
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(Some(terms)) = &self.terms {
            terms.validate()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Diffing
// ---------------------------------------------------------------------------

/// One entry of an audit event's change list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
}

/// Result of comparing an update with the persisted state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepresentationDiff {
    pub changes: Vec<FieldChange>,
    pub changed: Vec<RepresentationField>,
}

impl RepresentationDiff {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn status_changed(&self) -> bool {
        self.changed
            .iter()
            .any(|f| matches!(f, RepresentationField::Status(_)))
    }

    pub fn event_type(&self) -> RepresentationEventType {
        if self.status_changed() {
            RepresentationEventType::StatusChanged
        } else {
            RepresentationEventType::Updated
        }
    }

    pub fn event_title(&self) -> &'static str {
        match self.event_type() {
            RepresentationEventType::StatusChanged => "Representation Status Changed",
            _ => "Representation Updated",
        }
    }

    /// `current` with every changed field overwritten.
    pub fn apply_to(&self, current: &RepresentationState) -> RepresentationState {
        let mut next = current.clone();
        for field in &self.changed {
            field.clone().apply(&mut next);
        }
        next
    }
}

/// Compare every field present in `update` with `current`.
///
/// Values compare structurally; an absent optional value and an explicit
/// `null` are the same thing.
pub fn diff(current: &RepresentationState, update: &RepresentationUpdate) -> RepresentationDiff {
    let mut result = RepresentationDiff::default();
    for proposed in update.fields() {
        let existing = proposed.current(current);
        if existing != proposed {
            result.changes.push(FieldChange {
                field: proposed.name().to_string(),
                old_value: existing.to_value(),
                new_value: proposed.to_value(),
            });
            result.changed.push(proposed);
        }
    }
    result
}

/// Validate an update and diff it against `current`, rejecting status
/// changes out of a terminal status.
pub fn plan_update(
    current: &RepresentationState,
    update: &RepresentationUpdate,
) -> Result<RepresentationDiff, CoreError> {
    update.validate()?;
    let planned = diff(current, update);
    for field in &planned.changed {
        if let RepresentationField::Status(next) = field {
            if !current.status.can_transition_to(*next) {
                return Err(CoreError::Conflict(format!(
                    "Representation is {} and cannot move to {next}",
                    current.status
                )));
            }
        }
    }
    Ok(planned)
}

/// Change list for archiving, or `None` when the record is already inactive.
pub fn archive_changes(
    current_status: RepresentationStatus,
    current_end_date: Option<Timestamp>,
    now: Timestamp,
) -> Option<Vec<FieldChange>> {
    if current_status.is_terminal() {
        return None;
    }
    Some(vec![
        FieldChange {
            field: "status".to_string(),
            old_value: Value::String(current_status.as_str().to_string()),
            new_value: Value::String(RepresentationStatus::Inactive.as_str().to_string()),
        },
        FieldChange {
            field: "endDate".to_string(),
            old_value: current_end_date.map_or(Value::Null, |d| Value::String(d.to_rfc3339())),
            new_value: Value::String(now.to_rfc3339()),
        },
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn terms() -> RepresentationTerms {
        RepresentationTerms {
            commission: 10.0,
            exclusivity: false,
            territories: vec!["US".into()],
            media_types: vec!["Theatrical".into()],
        }
    }

    fn state(status: RepresentationStatus) -> RepresentationState {
        RepresentationState {
            status,
            next_key_date: None,
            notes: None,
            terms: Some(terms()),
        }
    }

    // -- status --------------------------------------------------------------

    #[test]
    fn status_strings_round_trip() {
        for status in RepresentationStatus::ALL {
            assert_eq!(RepresentationStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(RepresentationStatus::try_from("retired").is_err());
    }

    #[test]
    fn inactive_is_terminal() {
        use RepresentationStatus::*;
        assert!(Active.can_transition_to(OnHold));
        assert!(Pending.can_transition_to(Inactive));
        assert!(OnHold.can_transition_to(Active));
        assert!(!Inactive.can_transition_to(Active));
        assert!(!Inactive.can_transition_to(Pending));
        assert!(Inactive.can_transition_to(Inactive));
    }

    #[test]
    fn manual_event_types() {
        let manual: Vec<_> = RepresentationEventType::ALL
            .into_iter()
            .filter(|t| t.is_manual())
            .map(|t| t.as_str())
            .collect();
        assert_eq!(manual, ["meeting", "call", "email", "submission", "audition", "other"]);
    }

    // -- update payloads -----------------------------------------------------

    #[test]
    fn absent_and_null_keys_are_distinct() {
        let update: RepresentationUpdate =
            serde_json::from_value(json!({ "notes": null, "status": "on_hold" })).unwrap();
        assert_eq!(update.status, Some(RepresentationStatus::OnHold));
        assert_eq!(update.notes, Some(None));
        assert_eq!(update.next_key_date, None);
        assert_eq!(update.terms, None);
    }

    #[test]
    fn empty_payload_has_no_fields() {
        let update: RepresentationUpdate = serde_json::from_value(json!({})).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn commission_out_of_range_rejected() {
        let mut bad = terms();
        bad.commission = 120.0;
        assert_matches!(
            RepresentationUpdate::terms(Some(bad)).validate(),
            Err(CoreError::Validation(_))
        );
        let mut negative = terms();
        negative.commission = -1.0;
        assert!(negative.validate().is_err());
        assert!(terms().validate().is_ok());
    }

    // -- diff ----------------------------------------------------------------

    #[test]
    fn status_only_change_yields_status_changed_event() {
        let current = state(RepresentationStatus::Active);
        let result = diff(&current, &RepresentationUpdate::status(RepresentationStatus::OnHold));
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].field, "status");
        assert_eq!(result.changes[0].old_value, json!("active"));
        assert_eq!(result.changes[0].new_value, json!("on_hold"));
        assert_eq!(result.event_type(), RepresentationEventType::StatusChanged);
    }

    #[test]
    fn unchanged_values_produce_no_diff() {
        let current = state(RepresentationStatus::Active);
        let update = RepresentationUpdate {
            status: Some(RepresentationStatus::Active),
            next_key_date: Some(None),
            notes: Some(None),
            terms: Some(Some(terms())),
        };
        assert!(diff(&current, &update).is_empty());
    }

    #[test]
    fn next_key_date_compares_at_microsecond_precision() {
        let mut current = state(RepresentationStatus::Active);
        current.next_key_date = Some("2024-06-01T12:00:00.123456Z".parse().unwrap());
        let update: RepresentationUpdate =
            serde_json::from_value(json!({ "nextKeyDate": "2024-06-01T12:00:00.123456789Z" }))
                .unwrap();
        assert!(diff(&current, &update).is_empty());
    }

    #[test]
    fn nested_terms_compare_structurally() {
        let current = state(RepresentationStatus::Active);
        let mut changed = terms();
        changed.territories.push("CA".into());
        let result = diff(&current, &RepresentationUpdate::terms(Some(changed)));
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].field, "terms");
        assert_eq!(result.changes[0].old_value["territories"], json!(["US"]));
        assert_eq!(result.changes[0].new_value["territories"], json!(["US", "CA"]));
        assert_eq!(result.event_type(), RepresentationEventType::Updated);
    }

    #[test]
    fn multiple_fields_batch_into_one_diff() {
        let current = state(RepresentationStatus::Active);
        let update = RepresentationUpdate {
            status: Some(RepresentationStatus::Away),
            notes: Some(Some("Touring in Europe".into())),
            ..Default::default()
        };
        let result = diff(&current, &update);
        let fields: Vec<_> = result.changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, ["status", "notes"]);
        assert_eq!(result.event_type(), RepresentationEventType::StatusChanged);
    }

    #[test]
    fn applying_diff_then_rediffing_is_empty() {
        let current = state(RepresentationStatus::Active);
        let update = RepresentationUpdate {
            notes: Some(Some("Callback Tuesday".into())),
            terms: Some(None),
            ..Default::default()
        };
        let first = diff(&current, &update);
        assert_eq!(first.changes.len(), 2);
        let next = first.apply_to(&current);
        assert_eq!(next.notes.as_deref(), Some("Callback Tuesday"));
        assert!(next.terms.is_none());
        assert!(diff(&next, &update).is_empty());
    }

    #[test]
    fn change_values_are_detached_snapshots() {
        let mut current = state(RepresentationStatus::Active);
        current.notes = Some("before".into());
        let result = diff(&current, &RepresentationUpdate {
            notes: Some(Some("after".into())),
            ..Default::default()
        });
        current.notes = Some("mutated later".into());
        assert_eq!(result.changes[0].old_value, json!("before"));
    }

    // -- plan_update ---------------------------------------------------------

    #[test]
    fn status_change_on_inactive_conflicts() {
        let current = state(RepresentationStatus::Inactive);
        assert_matches!(
            plan_update(&current, &RepresentationUpdate::status(RepresentationStatus::Active)),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn notes_on_inactive_still_allowed() {
        let current = state(RepresentationStatus::Inactive);
        let planned = plan_update(&current, &RepresentationUpdate {
            notes: Some(Some("closed out".into())),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(planned.changes.len(), 1);
    }

    // -- archive -------------------------------------------------------------

    #[test]
    fn archive_records_status_and_end_date() {
        let now: Timestamp = "2024-05-01T12:00:00Z".parse().unwrap();
        let changes = archive_changes(RepresentationStatus::Active, None, now).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].new_value, json!("inactive"));
        assert_eq!(changes[1].field, "endDate");
        assert_eq!(changes[1].old_value, Value::Null);
    }

    #[test]
    fn archive_of_inactive_is_noop() {
        let now: Timestamp = "2024-05-01T12:00:00Z".parse().unwrap();
        assert!(archive_changes(RepresentationStatus::Inactive, Some(now), now).is_none());
    }
}
