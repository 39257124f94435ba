//! Repository for the `calendar_events` table.

use sqlx::PgPool;
use talent_core::calendar::{EVENT_STATUS_ACTIVE, EVENT_STATUS_DELETED};
use talent_core::types::{DbId, Timestamp};

use crate::models::calendar_event::{CalendarEvent, CalendarEventInput};

/// Column list for calendar_events queries.
const COLUMNS: &str = "id, title, description, start_date_time, end_date_time, is_multi_day, \
    location, event_type, created_by, owner_id, visibility_type, visibility_agent_ids, \
    status, updated_by, created_at, updated_at";

/// Provides CRUD operations for calendar events.
///
/// Every read filters out soft-deleted rows.
pub struct CalendarEventRepo;

impl CalendarEventRepo {
    /// Insert a new active event, returning the created row.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        owner_id: DbId,
        input: &CalendarEventInput,
    ) -> Result<CalendarEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO calendar_events
                (title, description, start_date_time, end_date_time, is_multi_day, location,
                 event_type, created_by, owner_id, visibility_type, visibility_agent_ids, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.start_date_time)
            .bind(input.end_date_time)
            .bind(input.is_multi_day)
            .bind(&input.location)
            .bind(input.event_type.as_str())
            .bind(created_by)
            .bind(owner_id)
            .bind(input.visibility.kind.as_str())
            .bind(&input.visibility.agent_ids)
            .bind(EVENT_STATUS_ACTIVE)
            .fetch_one(pool)
            .await
    }

    /// Find an active event by its ID.
    pub async fn find_active_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CalendarEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM calendar_events WHERE id = $1 AND status = $2");
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(id)
            .bind(EVENT_STATUS_ACTIVE)
            .fetch_optional(pool)
            .await
    }

    /// Active events on `owner_id`'s calendar that fall in the window.
    ///
    /// Regular events match when they start inside `[start, end]`; multi-day
    /// events match when their span overlaps it. Ordered by start time.
    pub async fn list_in_window(
        pool: &PgPool,
        owner_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<CalendarEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM calendar_events
             WHERE owner_id = $1
               AND status = $4
               AND (
                    (is_multi_day = FALSE AND start_date_time BETWEEN $2 AND $3)
                 OR (is_multi_day = TRUE AND start_date_time <= $3 AND end_date_time >= $2)
               )
             ORDER BY start_date_time, id"
        );
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(owner_id)
            .bind(start)
            .bind(end)
            .bind(EVENT_STATUS_ACTIVE)
            .fetch_all(pool)
            .await
    }

    /// Replace the editable fields of an active event.
    ///
    /// Returns `None` if no active row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        updated_by: DbId,
        input: &CalendarEventInput,
    ) -> Result<Option<CalendarEvent>, sqlx::Error> {
        let query = format!(
            "UPDATE calendar_events SET
                title = $2,
                description = $3,
                start_date_time = $4,
                end_date_time = $5,
                is_multi_day = $6,
                location = $7,
                event_type = $8,
                visibility_type = $9,
                visibility_agent_ids = $10,
                updated_by = $11,
                updated_at = NOW()
             WHERE id = $1 AND status = $12
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.start_date_time)
            .bind(input.end_date_time)
            .bind(input.is_multi_day)
            .bind(&input.location)
            .bind(input.event_type.as_str())
            .bind(input.visibility.kind.as_str())
            .bind(&input.visibility.agent_ids)
            .bind(updated_by)
            .bind(EVENT_STATUS_ACTIVE)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an event by setting its status to `deleted`.
    ///
    /// Returns `true` if an active row was updated.
    pub async fn soft_delete(
        pool: &PgPool,
        id: DbId,
        deleted_by: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE calendar_events SET status = $3, updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(deleted_by)
        .bind(EVENT_STATUS_DELETED)
        .bind(EVENT_STATUS_ACTIVE)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Physically remove an event, whatever its status.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
