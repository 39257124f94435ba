//! Invitation flow: onboard a new or existing client under an agent.
//!
//! Steps are not rolled back on failure. A provisioned client identity stays
//! in place if the representation insert fails afterwards.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use talent_core::error::CoreError;
use talent_core::invitation;
use talent_core::roles::ROLE_CLIENT;
use talent_core::types::{DbId, Timestamp};
use talent_db::models::representation::RosterEntry;
use talent_db::models::user::CreateUser;
use talent_db::repositories::{UserRepo, WhitelistedEmailRepo};
use validator::Validate;

use crate::error::AppResult;
use crate::services::RepresentationService;

/// Note attached to representations created by an invitation.
pub const INVITATION_NOTE: &str = "Representation created via invitation";

/// Body of `POST /api/invites`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InviteRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteResult {
    pub client_id: DbId,
    pub representation_id: DbId,
    pub is_new_client: bool,
    /// Only set when a new identity was provisioned.
    pub magic_link: Option<String>,
}

/// One row of `GET /api/invites`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationSummary {
    pub representation_id: DbId,
    pub client_id: DbId,
    pub client_name: String,
    pub client_username: String,
    pub status: String,
    pub created_at: Timestamp,
}

impl From<RosterEntry> for InvitationSummary {
    fn from(entry: RosterEntry) -> Self {
        Self {
            representation_id: entry.representation.id,
            client_id: entry.representation.client_id,
            client_name: entry.client_name,
            client_username: entry.client_username,
            status: entry.representation.status,
            created_at: entry.representation.created_at,
        }
    }
}

pub struct InvitationService;

impl InvitationService {
    /// Invite `email` as a client of `agent_id`.
    ///
    /// The email is matched exactly against usernames. An existing client is
    /// reused without a magic link; an existing agent with that username is
    /// a conflict. A new representation is created either way.
    pub async fn invite(
        pool: &PgPool,
        agent_id: DbId,
        request: &InviteRequest,
        client_url: &str,
    ) -> AppResult<InviteResult> {
        request.validate()?;
        let email = request.email.trim();

        let (client_id, magic_link) = match UserRepo::find_by_username(pool, email).await? {
            Some(existing) if existing.role == ROLE_CLIENT => (existing.id, None),
            Some(_) => {
                return Err(CoreError::Conflict(
                    "This email belongs to a non-client account".to_string(),
                )
                .into());
            }
            None => {
                let code = invitation::new_registration_code();
                WhitelistedEmailRepo::upsert(pool, email, ROLE_CLIENT, &code).await?;

                let (first_name, last_name) = invitation::split_display_name(&request.name);
                let created = UserRepo::create(
                    pool,
                    &CreateUser {
                        username: email.to_string(),
                        password_hash: None,
                        role: ROLE_CLIENT.to_string(),
                        first_name,
                        last_name,
                    },
                )
                .await?;
                tracing::info!(client_id = created.id, agent_id, "Client provisioned by invitation");
                (
                    created.id,
                    Some(invitation::build_magic_link(client_url, email, &code)),
                )
            }
        };

        let representation = RepresentationService::create(
            pool,
            agent_id,
            client_id,
            Some(invitation::default_terms()),
            Some(INVITATION_NOTE.to_string()),
            agent_id,
        )
        .await?;

        Ok(InviteResult {
            client_id,
            representation_id: representation.id,
            is_new_client: magic_link.is_some(),
            magic_link,
        })
    }

    /// Every representation of the agent, whatever its status.
    pub async fn list(pool: &PgPool, agent_id: DbId) -> AppResult<Vec<InvitationSummary>> {
        let entries = RepresentationService::roster(pool, agent_id, true).await?;
        Ok(entries.into_iter().map(InvitationSummary::from).collect())
    }
}
