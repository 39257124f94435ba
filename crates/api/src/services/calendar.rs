//! Calendar engine: event persistence, the visibility filter, and
//! projection of stored instants into the caller's zone.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use talent_core::calendar::{
    self, CalendarEventType, LocalCalendarEntry, LocalSpan, QueryWindow, Visibility,
};
use talent_core::error::CoreError;
use talent_core::time;
use talent_core::types::{DbId, Timestamp};
use talent_db::models::calendar_event::{CalendarEvent, CalendarEventInput};
use talent_db::repositories::{CalendarEventRepo, RepresentationRepo};
use validator::Validate;

use crate::error::AppResult;

/// Body of `PUT /api/calendar/events` and `PATCH /api/calendar/events/{id}`.
///
/// Times are local to `timeZone`. `endDate` defaults to `date` and
/// `endTime` to `time`; both times are ignored for multi-day events.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    pub date: String,
    pub time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub time_zone: String,
    #[serde(rename = "type")]
    pub event_type: CalendarEventType,
    #[validate(length(max = 500))]
    pub location: Option<String>,
    #[serde(default)]
    pub is_multi_day: bool,
    #[serde(default = "Visibility::private")]
    pub visibility: Visibility,
}

impl CalendarEventRequest {
    /// Resolve local times to UTC and canonicalise visibility.
    pub fn into_input(self) -> AppResult<CalendarEventInput> {
        self.validate()?;

        let start_time = match (&self.time, self.is_multi_day) {
            (Some(t), _) => t.as_str(),
            (None, true) => calendar::MULTI_DAY_START_TIME,
            (None, false) => {
                return Err(CoreError::Validation("time is required".to_string()).into())
            }
        };
        let span = LocalSpan {
            date: &self.date,
            time: start_time,
            end_date: self.end_date.as_deref().unwrap_or(&self.date),
            end_time: self.end_time.as_deref().unwrap_or(start_time),
        };
        let (start_date_time, end_date_time) =
            calendar::resolve_span(&span, self.is_multi_day, &self.time_zone)?;

        Ok(CalendarEventInput {
            title: self.title.trim().to_string(),
            description: self.description,
            start_date_time,
            end_date_time,
            is_multi_day: self.is_multi_day,
            location: self.location.filter(|l| !l.trim().is_empty()),
            event_type: self.event_type,
            visibility: self.visibility.normalized()?,
        })
    }
}

/// A calendar event as returned to a caller: local strings in `timeZone`
/// alongside the canonical UTC instants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventView {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub end_date: String,
    pub end_time: String,
    pub time_zone: String,
    pub start_date_time: Timestamp,
    pub end_date_time: Timestamp,
    pub is_multi_day: bool,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub event_type: CalendarEventType,
    pub created_by: DbId,
    pub owner_id: DbId,
    pub visibility: Visibility,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CalendarEventView {
    pub fn project(event: CalendarEvent, tz: Tz) -> Result<Self, CoreError> {
        let start = time::project(event.start_date_time, tz);
        let end = time::project(event.end_date_time, tz);
        Ok(Self {
            event_type: event.event_type()?,
            visibility: event.visibility()?,
            id: event.id,
            title: event.title,
            description: event.description,
            date: start.date,
            time: start.time,
            end_date: end.date,
            end_time: end.time,
            time_zone: tz.name().to_string(),
            start_date_time: event.start_date_time,
            end_date_time: event.end_date_time,
            is_multi_day: event.is_multi_day,
            location: event.location,
            created_by: event.created_by,
            owner_id: event.owner_id,
            created_at: event.created_at,
            updated_at: event.updated_at,
        })
    }
}

impl LocalCalendarEntry for CalendarEventView {
    fn local_date(&self) -> &str {
        &self.date
    }

    fn local_end_date(&self) -> &str {
        &self.end_date
    }

    fn is_multi_day(&self) -> bool {
        self.is_multi_day
    }

    fn event_type(&self) -> CalendarEventType {
        self.event_type
    }
}

/// Events touching one local date, as rendered by day/week/month views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: String,
    pub regular_events: Vec<CalendarEventView>,
    pub multi_day_events: Vec<CalendarEventView>,
    pub dominant_type: Option<CalendarEventType>,
}

/// A local date range in a zone, as sent on calendar queries.
#[derive(Debug, Clone, Copy)]
pub struct LocalRange<'a> {
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub time_zone: &'a str,
}

pub struct CalendarService;

impl CalendarService {
    /// Whose calendar a request targets. Viewing another user's calendar
    /// requires an active representation of that client by the requester.
    pub async fn resolve_owner(
        pool: &PgPool,
        requester: DbId,
        client_id: Option<DbId>,
    ) -> AppResult<DbId> {
        let Some(client_id) = client_id.filter(|id| *id != requester) else {
            return Ok(requester);
        };
        if !RepresentationRepo::has_active(pool, requester, client_id).await? {
            tracing::warn!(requester, client_id, "Rejected calendar access without active representation");
            return Err(CoreError::Forbidden(
                "No active representation of this client".to_string(),
            )
            .into());
        }
        Ok(client_id)
    }

    /// Create an event on the requester's own calendar.
    pub async fn create(
        pool: &PgPool,
        requester: DbId,
        request: CalendarEventRequest,
    ) -> AppResult<CalendarEventView> {
        let tz = time::parse_time_zone(&request.time_zone).map_err(CoreError::from)?;
        let input = request.into_input()?;
        let created = CalendarEventRepo::create(pool, requester, requester, &input).await?;
        tracing::info!(
            event_id = created.id,
            owner_id = requester,
            event_type = %input.event_type,
            "Calendar event created"
        );
        Ok(CalendarEventView::project(created, tz)?)
    }

    /// Events on `owner_id`'s calendar in the range that `requester` may see,
    /// projected into the range's zone.
    pub async fn events_for_calendar(
        pool: &PgPool,
        requester: DbId,
        owner_id: DbId,
        range: LocalRange<'_>,
    ) -> AppResult<Vec<CalendarEventView>> {
        let tz = time::parse_time_zone(range.time_zone).map_err(CoreError::from)?;
        let window = QueryWindow::for_local_dates(range.start_date, range.end_date, range.time_zone)?;
        tracing::debug!(owner_id, requester, start = %window.start, end = %window.end, "Calendar window query");

        let rows = CalendarEventRepo::list_in_window(pool, owner_id, window.start, window.end).await?;
        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            if calendar::is_visible_to(&row.visibility()?, row.owner_id, requester) {
                events.push(CalendarEventView::project(row, tz)?);
            }
        }
        Ok(events)
    }

    /// Per-day classification for every date in the range.
    pub async fn days(
        pool: &PgPool,
        requester: DbId,
        owner_id: DbId,
        range: LocalRange<'_>,
    ) -> AppResult<Vec<DaySummary>> {
        let dates = calendar::dates_in_range(range.start_date, range.end_date)?;
        let events = Self::events_for_calendar(pool, requester, owner_id, range).await?;

        Ok(dates
            .into_iter()
            .map(|date| {
                let day = calendar::events_for_day(&events, &date);
                DaySummary {
                    dominant_type: day.dominant_type(),
                    regular_events: day.regular.into_iter().cloned().collect(),
                    multi_day_events: day.multi_day.into_iter().cloned().collect(),
                    date,
                }
            })
            .collect())
    }

    /// Replace the editable fields of an event the requester owns.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        requester: DbId,
        request: CalendarEventRequest,
    ) -> AppResult<CalendarEventView> {
        Self::find_owned(pool, id, requester).await?;
        let tz = time::parse_time_zone(&request.time_zone).map_err(CoreError::from)?;
        let input = request.into_input()?;
        let updated = CalendarEventRepo::update(pool, id, requester, &input)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CalendarEvent",
                id,
            })?;
        tracing::info!(event_id = id, updated_by = requester, "Calendar event updated");
        Ok(CalendarEventView::project(updated, tz)?)
    }

    /// Soft-delete an event the requester owns.
    pub async fn delete(pool: &PgPool, id: DbId, requester: DbId) -> AppResult<()> {
        Self::find_owned(pool, id, requester).await?;
        if !CalendarEventRepo::soft_delete(pool, id, requester).await? {
            return Err(CoreError::NotFound {
                entity: "CalendarEvent",
                id,
            }
            .into());
        }
        tracing::info!(event_id = id, deleted_by = requester, "Calendar event deleted");
        Ok(())
    }

    /// Physically remove an event. Not routed; for maintenance only.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> AppResult<()> {
        if !CalendarEventRepo::hard_delete(pool, id).await? {
            return Err(CoreError::NotFound {
                entity: "CalendarEvent",
                id,
            }
            .into());
        }
        tracing::info!(event_id = id, "Calendar event purged");
        Ok(())
    }

    async fn find_owned(pool: &PgPool, id: DbId, requester: DbId) -> AppResult<CalendarEvent> {
        let event = CalendarEventRepo::find_active_by_id(pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CalendarEvent",
                id,
            })?;
        if event.owner_id != requester {
            tracing::warn!(event_id = id, requester, "Rejected change to another user's event");
            return Err(CoreError::Forbidden("Event belongs to another user".to_string()).into());
        }
        Ok(event)
    }
}
