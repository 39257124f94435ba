//! Repository for the `representations` table.

use sqlx::types::Json;
use sqlx::PgPool;
use talent_core::representation::{RepresentationField, RepresentationStatus};
use talent_core::types::{DbId, Timestamp};

use crate::models::representation::{CreateRepresentation, Representation, RosterEntry};
use crate::models::user::ConnectedUser;

/// Column list for representations queries.
const COLUMNS: &str = "id, agent_id, client_id, status, start_date, end_date, \
    next_key_date, notes, terms, created_at, updated_at";

/// Representation columns qualified with `r.` plus the joined client fields.
const ROSTER_COLUMNS: &str = "r.id, r.agent_id, r.client_id, r.status, r.start_date, r.end_date, \
    r.next_key_date, r.notes, r.terms, r.created_at, r.updated_at, \
    u.username AS client_username, \
    COALESCE(NULLIF(TRIM(u.first_name || ' ' || u.last_name), ''), u.username) AS client_name, \
    u.avatar_url AS client_avatar_url";

/// Display name expression for a joined `u` user row.
const DISPLAY_NAME: &str =
    "COALESCE(NULLIF(TRIM(u.first_name || ' ' || u.last_name), ''), u.username)";

/// Provides persistence for agent/client representations.
pub struct RepresentationRepo;

impl RepresentationRepo {
    /// Insert a new `pending` representation, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRepresentation,
    ) -> Result<Representation, sqlx::Error> {
        let query = format!(
            "INSERT INTO representations (agent_id, client_id, status, notes, terms)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Representation>(&query)
            .bind(input.agent_id)
            .bind(input.client_id)
            .bind(RepresentationStatus::Pending.as_str())
            .bind(&input.notes)
            .bind(input.terms.clone().map(Json))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Representation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM representations WHERE id = $1");
        sqlx::query_as::<_, Representation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// An agent's roster joined with client identity, newest first.
    ///
    /// Unless `include_inactive` is set, `inactive` and `pending` rows are
    /// left out.
    pub async fn list_roster(
        pool: &PgPool,
        agent_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<RosterEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {ROSTER_COLUMNS}
             FROM representations r
             JOIN users u ON u.id = r.client_id
             WHERE r.agent_id = $1
               AND ($2 OR r.status NOT IN ('inactive', 'pending'))
             ORDER BY r.created_at DESC, r.id DESC"
        );
        sqlx::query_as::<_, RosterEntry>(&query)
            .bind(agent_id)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Every representation of a client, newest first.
    pub async fn list_for_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<Representation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM representations
             WHERE client_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Representation>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    /// A client's representations in the given status.
    pub async fn list_for_client_with_status(
        pool: &PgPool,
        client_id: DbId,
        status: RepresentationStatus,
    ) -> Result<Vec<Representation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM representations
             WHERE client_id = $1 AND status = $2
             ORDER BY id"
        );
        sqlx::query_as::<_, Representation>(&query)
            .bind(client_id)
            .bind(status.as_str())
            .fetch_all(pool)
            .await
    }

    /// Write only the given fields, stamping `updated_at`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn apply_changes(
        pool: &PgPool,
        id: DbId,
        changed: &[RepresentationField],
    ) -> Result<Option<Representation>, sqlx::Error> {
        let mut status: Option<&str> = None;
        let mut next_key_date: Option<Option<Timestamp>> = None;
        let mut notes: Option<Option<&str>> = None;
        let mut terms = None;
        for field in changed {
            match field {
                RepresentationField::Status(s) => status = Some(s.as_str()),
                RepresentationField::NextKeyDate(d) => next_key_date = Some(*d),
                RepresentationField::Notes(n) => notes = Some(n.as_deref()),
                RepresentationField::Terms(t) => terms = Some(t.clone().map(Json)),
            }
        }

        let query = format!(
            "UPDATE representations SET
                status = COALESCE($2, status),
                next_key_date = CASE WHEN $3 THEN $4::timestamptz ELSE next_key_date END,
                notes = CASE WHEN $5 THEN $6::text ELSE notes END,
                terms = CASE WHEN $7 THEN $8::jsonb ELSE terms END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Representation>(&query)
            .bind(id)
            .bind(status)
            .bind(next_key_date.is_some())
            .bind(next_key_date.flatten())
            .bind(notes.is_some())
            .bind(notes.flatten())
            .bind(terms.is_some())
            .bind(terms.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Mark a representation `inactive` with the given end date.
    ///
    /// Returns `None` if the row does not exist or is already inactive.
    pub async fn archive(
        pool: &PgPool,
        id: DbId,
        end_date: Timestamp,
    ) -> Result<Option<Representation>, sqlx::Error> {
        let query = format!(
            "UPDATE representations SET
                status = 'inactive',
                end_date = $2,
                updated_at = NOW()
             WHERE id = $1 AND status <> 'inactive'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Representation>(&query)
            .bind(id)
            .bind(end_date)
            .fetch_optional(pool)
            .await
    }

    /// Whether the agent actively represents the client.
    pub async fn has_active(
        pool: &PgPool,
        agent_id: DbId,
        client_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(
                SELECT 1 FROM representations
                WHERE agent_id = $1 AND client_id = $2 AND status = 'active'
             )",
        )
        .bind(agent_id)
        .bind(client_id)
        .fetch_one(pool)
        .await?;
        Ok(exists.0)
    }

    /// Distinct agents with an `active` representation of the client.
    pub async fn connected_agents(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<ConnectedUser>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT u.id, {DISPLAY_NAME} AS name
             FROM representations r
             JOIN users u ON u.id = r.agent_id
             WHERE r.client_id = $1 AND r.status = 'active'
             ORDER BY name, u.id"
        );
        sqlx::query_as::<_, ConnectedUser>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    /// Distinct clients with an `active` representation by the agent.
    pub async fn connected_clients(
        pool: &PgPool,
        agent_id: DbId,
    ) -> Result<Vec<ConnectedUser>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT u.id, {DISPLAY_NAME} AS name
             FROM representations r
             JOIN users u ON u.id = r.client_id
             WHERE r.agent_id = $1 AND r.status = 'active'
             ORDER BY name, u.id"
        );
        sqlx::query_as::<_, ConnectedUser>(&query)
            .bind(agent_id)
            .fetch_all(pool)
            .await
    }
}
