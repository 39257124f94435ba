//! Representation lifecycle: diff-based updates with one audit event per
//! mutating call.
//!
//! The record write and the event insert are separate statements. A failure
//! between them leaves the record changed without its event, and concurrent
//! updates to one record are last-write-wins.

use chrono::Utc;
use sqlx::PgPool;
use talent_core::error::CoreError;
use talent_core::representation::{
    self, RepresentationEventType, RepresentationStatus, RepresentationTerms,
    RepresentationUpdate, ARCHIVED_DESCRIPTION, ARCHIVED_TITLE, CREATED_DESCRIPTION,
    CREATED_TITLE, UPDATED_DESCRIPTION,
};
use talent_core::types::{DbId, Timestamp};
use talent_db::models::representation::{CreateRepresentation, Representation, RosterEntry};
use talent_db::models::representation_event::{CreateRepresentationEvent, RepresentationEvent};
use talent_db::models::user::ConnectedUser;
use talent_db::repositories::{RepresentationEventRepo, RepresentationRepo};

use crate::error::AppResult;

/// A hand-logged activity (meeting, call, ...) on a representation.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    pub event_type: RepresentationEventType,
    pub title: String,
    pub description: String,
    pub date: Option<Timestamp>,
}

pub struct RepresentationService;

impl RepresentationService {
    /// Create a `pending` representation and its `created` event.
    ///
    /// Existing representations of the same pair are not checked.
    pub async fn create(
        pool: &PgPool,
        agent_id: DbId,
        client_id: DbId,
        terms: Option<RepresentationTerms>,
        notes: Option<String>,
        created_by: DbId,
    ) -> AppResult<Representation> {
        if let Some(terms) = &terms {
            terms.validate()?;
        }

        let created = RepresentationRepo::create(
            pool,
            &CreateRepresentation {
                agent_id,
                client_id,
                terms,
                notes,
            },
        )
        .await?;

        RepresentationEventRepo::create(
            pool,
            &CreateRepresentationEvent {
                representation_id: created.id,
                event_type: RepresentationEventType::Created,
                title: CREATED_TITLE.to_string(),
                description: CREATED_DESCRIPTION.to_string(),
                event_date: None,
                changes: None,
                created_by,
            },
        )
        .await?;

        tracing::info!(
            representation_id = created.id,
            agent_id,
            client_id,
            "Representation created"
        );
        Ok(created)
    }

    /// Fetch by id or fail with `NotFound`.
    pub async fn get(pool: &PgPool, id: DbId) -> AppResult<Representation> {
        RepresentationRepo::find_by_id(pool, id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "Representation",
                    id,
                }
                .into()
            })
    }

    /// Fetch a representation the agent owns; any other agent gets 403.
    pub async fn get_owned(
        pool: &PgPool,
        id: DbId,
        agent_id: DbId,
    ) -> AppResult<Representation> {
        let found = Self::get(pool, id).await?;
        if found.agent_id != agent_id {
            tracing::warn!(representation_id = id, agent_id, "Rejected access to foreign representation");
            return Err(CoreError::Forbidden(
                "Representation belongs to another agent".to_string(),
            )
            .into());
        }
        Ok(found)
    }

    /// Apply the fields of `update` that differ from the stored record.
    ///
    /// No differing field means no write and no event. Otherwise one event
    /// records every change: `status_changed` when the status moved,
    /// `updated` otherwise.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        update: &RepresentationUpdate,
        updated_by: DbId,
    ) -> AppResult<Representation> {
        let current = Self::get(pool, id).await?;
        let planned = representation::plan_update(&current.state()?, update)?;

        if planned.is_empty() {
            tracing::debug!(representation_id = id, "Update matched stored values, nothing written");
            return Ok(current);
        }

        let updated = RepresentationRepo::apply_changes(pool, id, &planned.changed)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Representation",
                id,
            })?;

        RepresentationEventRepo::create(
            pool,
            &CreateRepresentationEvent {
                representation_id: id,
                event_type: planned.event_type(),
                title: planned.event_title().to_string(),
                description: UPDATED_DESCRIPTION.to_string(),
                event_date: None,
                changes: Some(planned.changes.clone()),
                created_by: updated_by,
            },
        )
        .await?;

        tracing::info!(
            representation_id = id,
            changed = planned.changes.len(),
            event_type = %planned.event_type(),
            "Representation updated"
        );
        Ok(updated)
    }

    /// Mark a representation `inactive` with `endDate = now`.
    ///
    /// Already inactive records come back unchanged with no event.
    pub async fn archive(pool: &PgPool, id: DbId, archived_by: DbId) -> AppResult<Representation> {
        let current = Self::get(pool, id).await?;
        let now = Utc::now();
        let Some(changes) = representation::archive_changes(current.status()?, current.end_date, now)
        else {
            tracing::debug!(representation_id = id, "Representation already inactive");
            return Ok(current);
        };

        let Some(archived) = RepresentationRepo::archive(pool, id, now).await? else {
            // Archived by a concurrent request in the meantime.
            return Self::get(pool, id).await;
        };

        RepresentationEventRepo::create(
            pool,
            &CreateRepresentationEvent {
                representation_id: id,
                event_type: RepresentationEventType::Archived,
                title: ARCHIVED_TITLE.to_string(),
                description: ARCHIVED_DESCRIPTION.to_string(),
                event_date: None,
                changes: Some(changes),
                created_by: archived_by,
            },
        )
        .await?;

        tracing::info!(representation_id = id, "Representation archived");
        Ok(archived)
    }

    pub async fn change_status(
        pool: &PgPool,
        id: DbId,
        status: RepresentationStatus,
        changed_by: DbId,
    ) -> AppResult<Representation> {
        Self::update(pool, id, &RepresentationUpdate::status(status), changed_by).await
    }

    /// Replace the terms. Clearing them is not allowed here.
    pub async fn update_terms(
        pool: &PgPool,
        id: DbId,
        terms: Option<RepresentationTerms>,
        updated_by: DbId,
    ) -> AppResult<Representation> {
        let Some(terms) = terms else {
            return Err(CoreError::Validation("terms cannot be empty".to_string()).into());
        };
        Self::update(pool, id, &RepresentationUpdate::terms(Some(terms)), updated_by).await
    }

    pub async fn end_representation(
        pool: &PgPool,
        id: DbId,
        ended_by: DbId,
    ) -> AppResult<Representation> {
        Self::archive(pool, id, ended_by).await
    }

    /// Move every `pending` representation of a client to `active`, each
    /// through [`Self::update`]. Returns how many were activated.
    pub async fn activate_pending_for_client(pool: &PgPool, client_id: DbId) -> AppResult<usize> {
        let pending = RepresentationRepo::list_for_client_with_status(
            pool,
            client_id,
            RepresentationStatus::Pending,
        )
        .await?;
        for row in &pending {
            Self::change_status(pool, row.id, RepresentationStatus::Active, client_id).await?;
        }
        if !pending.is_empty() {
            tracing::info!(client_id, activated = pending.len(), "Pending representations activated");
        }
        Ok(pending.len())
    }

    /// Append a hand-logged activity event. Only the manual types are
    /// accepted.
    pub async fn log_activity(
        pool: &PgPool,
        id: DbId,
        activity: ActivityLog,
        created_by: DbId,
    ) -> AppResult<RepresentationEvent> {
        if !activity.event_type.is_manual() {
            return Err(CoreError::Validation(format!(
                "Event type '{}' cannot be logged manually",
                activity.event_type
            ))
            .into());
        }
        if activity.title.trim().is_empty() {
            return Err(CoreError::Validation("title is required".to_string()).into());
        }

        let event = RepresentationEventRepo::create(
            pool,
            &CreateRepresentationEvent {
                representation_id: id,
                event_type: activity.event_type,
                title: activity.title,
                description: activity.description,
                event_date: activity.date,
                changes: None,
                created_by,
            },
        )
        .await?;
        tracing::info!(representation_id = id, event_type = %activity.event_type, "Activity logged");
        Ok(event)
    }

    pub async fn roster(
        pool: &PgPool,
        agent_id: DbId,
        include_inactive: bool,
    ) -> AppResult<Vec<RosterEntry>> {
        Ok(RepresentationRepo::list_roster(pool, agent_id, include_inactive).await?)
    }

    pub async fn list_for_client(pool: &PgPool, client_id: DbId) -> AppResult<Vec<Representation>> {
        Ok(RepresentationRepo::list_for_client(pool, client_id).await?)
    }

    /// Audit events, most recent first.
    pub async fn events(pool: &PgPool, id: DbId) -> AppResult<Vec<RepresentationEvent>> {
        Ok(RepresentationEventRepo::list_for_representation(pool, id).await?)
    }

    pub async fn connected_agents(pool: &PgPool, client_id: DbId) -> AppResult<Vec<ConnectedUser>> {
        Ok(RepresentationRepo::connected_agents(pool, client_id).await?)
    }

    pub async fn connected_clients(pool: &PgPool, agent_id: DbId) -> AppResult<Vec<ConnectedUser>> {
        Ok(RepresentationRepo::connected_clients(pool, agent_id).await?)
    }
}
