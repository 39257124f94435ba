//! Repository for the append-only `representation_events` table.

use sqlx::types::Json;
use sqlx::PgPool;
use talent_core::types::DbId;

use crate::models::representation_event::{CreateRepresentationEvent, RepresentationEvent};

const COLUMNS: &str = "id, representation_id, event_type, title, description, event_date, \
    changes, created_by, created_at";

/// Insert and read audit events. Rows are never updated or deleted.
pub struct RepresentationEventRepo;

impl RepresentationEventRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateRepresentationEvent,
    ) -> Result<RepresentationEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO representation_events
                (representation_id, event_type, title, description, event_date, changes, created_by)
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RepresentationEvent>(&query)
            .bind(input.representation_id)
            .bind(input.event_type.as_str())
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.event_date)
            .bind(input.changes.clone().map(Json))
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Events of a representation, most recent first.
    pub async fn list_for_representation(
        pool: &PgPool,
        representation_id: DbId,
    ) -> Result<Vec<RepresentationEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM representation_events
             WHERE representation_id = $1
             ORDER BY event_date DESC, id DESC"
        );
        sqlx::query_as::<_, RepresentationEvent>(&query)
            .bind(representation_id)
            .fetch_all(pool)
            .await
    }
}
