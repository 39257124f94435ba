//! Calendar visibility and overlap rules.
//!
//! Events are stored as UTC instants. Range queries arrive as local dates in
//! the requester's zone and are widened to whole local days; per-day
//! classification then works on the local date strings of each event.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::time::{self, DATE_FORMAT};
use crate::types::{DbId, Timestamp};

/// Longest range a single query may cover, in days (one leap year).
pub const MAX_QUERY_DAYS: i64 = 366;

/// Wall-clock bounds applied to multi-day events.
pub const MULTI_DAY_START_TIME: &str = "00:00";
pub const MULTI_DAY_END_TIME: &str = "23:59";

// ---------------------------------------------------------------------------
// Event type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEventType {
    BookedOut,
    OnSet,
    EpisodeAiring,
    AvailabilityHold,
    Pinned,
    Premiere,
    Callback,
    Audition,
    ClassWorkshop,
    AgencyMeeting,
    Deadline,
    Other,
}

impl CalendarEventType {
    /// Highest display priority first.
    pub const BY_PRIORITY: [CalendarEventType; 12] = [
        Self::BookedOut,
        Self::OnSet,
        Self::EpisodeAiring,
        Self::AvailabilityHold,
        Self::Pinned,
        Self::Premiere,
        Self::Callback,
        Self::Audition,
        Self::ClassWorkshop,
        Self::AgencyMeeting,
        Self::Deadline,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BookedOut => "booked_out",
            Self::OnSet => "on_set",
            Self::EpisodeAiring => "episode_airing",
            Self::AvailabilityHold => "availability_hold",
            Self::Pinned => "pinned",
            Self::Premiere => "premiere",
            Self::Callback => "callback",
            Self::Audition => "audition",
            Self::ClassWorkshop => "class_workshop",
            Self::AgencyMeeting => "agency_meeting",
            Self::Deadline => "deadline",
            Self::Other => "other",
        }
    }

    /// Position in the display priority table; 0 is the highest.
    pub fn priority_rank(self) -> usize {
        Self::BY_PRIORITY
            .iter()
            .position(|t| *t == self)
            .unwrap_or(Self::BY_PRIORITY.len())
    }
}

impl fmt::Display for CalendarEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CalendarEventType {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::BY_PRIORITY
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| CoreError::Validation(format!("Unknown calendar event type '{value}'")))
    }
}

/// Stored status of a calendar event. Deleted rows are kept but never
/// returned by queries.
pub const EVENT_STATUS_ACTIVE: &str = "active";
pub const EVENT_STATUS_DELETED: &str = "deleted";

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityType {
    Private,
    SelectedAgents,
    /// Reserved; not offered by any client yet.
    Public,
}

impl VisibilityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::SelectedAgents => "selected_agents",
            Self::Public => "public",
        }
    }
}

impl TryFrom<&str> for VisibilityType {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "private" => Ok(Self::Private),
            "selected_agents" => Ok(Self::SelectedAgents),
            "public" => Ok(Self::Public),
            other => Err(CoreError::Validation(format!("Unknown visibility type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visibility {
    #[serde(rename = "type")]
    pub kind: VisibilityType,
    #[serde(default)]
    pub agent_ids: Vec<DbId>,
}

impl Visibility {
    pub fn private() -> Self {
        Self {
            kind: VisibilityType::Private,
            agent_ids: Vec::new(),
        }
    }

    pub fn selected_agents(agent_ids: Vec<DbId>) -> Self {
        Self {
            kind: VisibilityType::SelectedAgents,
            agent_ids,
        }
    }

    /// Validate and canonicalise: `selected_agents` needs at least one
    /// agent id (duplicates removed), the other kinds carry none.
    pub fn normalized(mut self) -> Result<Self, CoreError> {
        match self.kind {
            VisibilityType::SelectedAgents => {
                let mut seen = Vec::with_capacity(self.agent_ids.len());
                self.agent_ids.retain(|id| {
                    if seen.contains(id) {
                        false
                    } else {
                        seen.push(*id);
                        true
                    }
                });
                if self.agent_ids.is_empty() {
                    return Err(CoreError::Validation(
                        "selected_agents visibility requires at least one agent".to_string(),
                    ));
                }
            }
            VisibilityType::Private | VisibilityType::Public => self.agent_ids.clear(),
        }
        Ok(self)
    }
}

/// Whether `requester` may see an event on `owner_id`'s calendar.
///
/// The owner sees everything on their own calendar. Anyone else sees only
/// public events and `selected_agents` events that list them; private
/// events never leave the owner's view, whoever created them.
pub fn is_visible_to(visibility: &Visibility, owner_id: DbId, requester: DbId) -> bool {
    if requester == owner_id {
        return true;
    }
    match visibility.kind {
        VisibilityType::Public => true,
        VisibilityType::SelectedAgents => visibility.agent_ids.contains(&requester),
        VisibilityType::Private => false,
    }
}

// ---------------------------------------------------------------------------
// Query window
// ---------------------------------------------------------------------------

/// A UTC window covering whole local days, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl QueryWindow {
    /// Build the window for `[start_date, end_date]` in `time_zone`: local
    /// 00:00:00 on the first day to 23:59:59 on the last.
    pub fn for_local_dates(
        start_date: &str,
        end_date: &str,
        time_zone: &str,
    ) -> Result<Self, CoreError> {
        let tz = time::parse_time_zone(time_zone)?;
        let first = time::parse_date(start_date)?;
        let last = time::parse_date(end_date)?;
        validate_date_range(first, last)?;

        let start = time::local_to_utc(NaiveDateTime::new(first, NaiveTime::MIN), tz)?;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        let end = time::local_to_utc(NaiveDateTime::new(last, end_of_day), tz)?;
        Ok(Self { start, end })
    }

    /// Regular events match when they start inside the window; multi-day
    /// events match when their span overlaps it.
    pub fn matches(&self, is_multi_day: bool, start: Timestamp, end: Timestamp) -> bool {
        if is_multi_day {
            start <= self.end && end >= self.start
        } else {
            start >= self.start && start <= self.end
        }
    }
}

fn validate_date_range(first: NaiveDate, last: NaiveDate) -> Result<(), CoreError> {
    if last < first {
        return Err(CoreError::Validation(
            "endDate must not be before startDate".to_string(),
        ));
    }
    if (last - first).num_days() + 1 > MAX_QUERY_DAYS {
        return Err(CoreError::Validation(format!(
            "Date range may cover at most {MAX_QUERY_DAYS} days"
        )));
    }
    Ok(())
}

/// Every local date from `start_date` to `end_date` inclusive.
pub fn dates_in_range(start_date: &str, end_date: &str) -> Result<Vec<String>, CoreError> {
    let first = time::parse_date(start_date)?;
    let last = time::parse_date(end_date)?;
    validate_date_range(first, last)?;
    Ok(first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .collect())
}

// ---------------------------------------------------------------------------
// Event times
// ---------------------------------------------------------------------------

/// Local start and end of an event as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSpan<'a> {
    pub date: &'a str,
    pub time: &'a str,
    pub end_date: &'a str,
    pub end_time: &'a str,
}

/// Convert a submitted span to UTC instants, clamping multi-day events to
/// whole local days first.
pub fn resolve_span(
    span: &LocalSpan<'_>,
    is_multi_day: bool,
    time_zone: &str,
) -> Result<(Timestamp, Timestamp), CoreError> {
    let (start_time, end_time) = if is_multi_day {
        (MULTI_DAY_START_TIME, MULTI_DAY_END_TIME)
    } else {
        (span.time, span.end_time)
    };
    let start = time::to_instant(span.date, start_time, time_zone)?;
    let end = time::to_instant(span.end_date, end_time, time_zone)?;
    if end < start {
        return Err(CoreError::Validation(
            "Event end must not be before its start".to_string(),
        ));
    }
    Ok((start, end))
}

// ---------------------------------------------------------------------------
// Per-day classification
// ---------------------------------------------------------------------------

/// An event already projected into the viewer's local calendar.
pub trait LocalCalendarEntry {
    fn local_date(&self) -> &str;
    fn local_end_date(&self) -> &str;
    fn is_multi_day(&self) -> bool;
    fn event_type(&self) -> CalendarEventType;
}

/// Events touching one local date, each list in priority order.
#[derive(Debug)]
pub struct DayEvents<'a, E> {
    pub regular: Vec<&'a E>,
    pub multi_day: Vec<&'a E>,
}

impl<E: LocalCalendarEntry> DayEvents<'_, E> {
    /// Highest-priority type among all events of the day.
    pub fn dominant_type(&self) -> Option<CalendarEventType> {
        self.regular
            .iter()
            .chain(self.multi_day.iter())
            .map(|e| e.event_type())
            .min_by_key(|t| t.priority_rank())
    }
}

/// Split `events` into those that fall on `day` (`YYYY-MM-DD`).
///
/// Fixed-width zero-padded dates compare correctly as strings.
pub fn events_for_day<'a, E: LocalCalendarEntry>(events: &'a [E], day: &str) -> DayEvents<'a, E> {
    let mut regular = Vec::new();
    let mut multi_day = Vec::new();
    for event in events {
        if event.is_multi_day() {
            if event.local_date() <= day && day <= event.local_end_date() {
                multi_day.push(event);
            }
        } else if event.local_date() == day {
            regular.push(event);
        }
    }
    sort_by_priority(&mut regular);
    sort_by_priority(&mut multi_day);
    DayEvents { regular, multi_day }
}

/// Stable sort by type priority; equal types keep their input order.
pub fn sort_by_priority<E: LocalCalendarEntry>(events: &mut [&E]) {
    events.sort_by_key(|e| e.event_type().priority_rank());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
