//! Integration tests for the representation and audit event repositories.

use sqlx::PgPool;
use talent_core::representation::{
    FieldChange, RepresentationEventType, RepresentationField, RepresentationStatus,
    RepresentationTerms,
};
use talent_core::roles::{ROLE_AGENT, ROLE_CLIENT};
use talent_db::models::representation::CreateRepresentation;
use talent_db::models::representation_event::CreateRepresentationEvent;
use talent_db::models::user::{CreateUser, User};
use talent_db::repositories::{RepresentationEventRepo, RepresentationRepo, UserRepo};

async fn user(pool: &PgPool, username: &str, role: &str, first: &str, last: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            password_hash: None,
            role: role.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        },
    )
    .await
    .unwrap()
}

fn terms() -> RepresentationTerms {
    RepresentationTerms {
        commission: 15.0,
        exclusivity: true,
        territories: vec!["US".into(), "UK".into()],
        media_types: vec!["Theatrical".into()],
    }
}

async fn representation(pool: &PgPool, agent: &User, client: &User) -> i64 {
    RepresentationRepo::create(
        pool,
        &CreateRepresentation {
            agent_id: agent.id,
            client_id: client.id,
            terms: Some(terms()),
            notes: None,
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_starts_pending_with_terms(pool: PgPool) {
    let agent = user(&pool, "agent@x.com", ROLE_AGENT, "Ari", "Gold").await;
    let client = user(&pool, "jane@x.com", ROLE_CLIENT, "Jane", "Doe").await;
    let id = representation(&pool, &agent, &client).await;

    let found = RepresentationRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(found.status().unwrap(), RepresentationStatus::Pending);
    assert_eq!(found.terms.unwrap().0, terms());
    assert!(found.end_date.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_pairs_are_allowed(pool: PgPool) {
    let agent = user(&pool, "agent@x.com", ROLE_AGENT, "Ari", "Gold").await;
    let client = user(&pool, "jane@x.com", ROLE_CLIENT, "Jane", "Doe").await;
    let first = representation(&pool, &agent, &client).await;
    let second = representation(&pool, &agent, &client).await;
    assert_ne!(first, second);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn apply_changes_writes_only_given_fields(pool: PgPool) {
    let agent = user(&pool, "agent@x.com", ROLE_AGENT, "Ari", "Gold").await;
    let client = user(&pool, "jane@x.com", ROLE_CLIENT, "Jane", "Doe").await;
    let id = representation(&pool, &agent, &client).await;

    let updated = RepresentationRepo::apply_changes(
        &pool,
        id,
        &[
            RepresentationField::Status(RepresentationStatus::Active),
            RepresentationField::Notes(Some("Strong comedic timing".into())),
        ],
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.status, "active");
    assert_eq!(updated.notes.as_deref(), Some("Strong comedic timing"));
    assert!(updated.terms.is_some(), "terms were not in the change set");

    let cleared = RepresentationRepo::apply_changes(&pool, id, &[RepresentationField::Terms(None)])
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.terms.is_none());
    assert_eq!(cleared.status, "active");
    assert_eq!(cleared.notes.as_deref(), Some("Strong comedic timing"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn apply_changes_missing_row_is_none(pool: PgPool) {
    let result = RepresentationRepo::apply_changes(
        &pool,
        9999,
        &[RepresentationField::Status(RepresentationStatus::Away)],
    )
    .await
    .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn archive_only_once(pool: PgPool) {
    let agent = user(&pool, "agent@x.com", ROLE_AGENT, "Ari", "Gold").await;
    let client = user(&pool, "jane@x.com", ROLE_CLIENT, "Jane", "Doe").await;
    let id = representation(&pool, &agent, &client).await;
    let now = chrono::Utc::now();

    let archived = RepresentationRepo::archive(&pool, id, now).await.unwrap().unwrap();
    assert_eq!(archived.status, "inactive");
    assert!(archived.end_date.is_some());

    assert!(RepresentationRepo::archive(&pool, id, now).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn roster_excludes_pending_and_inactive_by_default(pool: PgPool) {
    let agent = user(&pool, "agent@x.com", ROLE_AGENT, "Ari", "Gold").await;
    let jane = user(&pool, "jane@x.com", ROLE_CLIENT, "Jane", "Doe").await;
    let john = user(&pool, "john@x.com", ROLE_CLIENT, "", "").await;
    let pending = representation(&pool, &agent, &jane).await;
    let active = representation(&pool, &agent, &john).await;
    RepresentationRepo::apply_changes(
        &pool,
        active,
        &[RepresentationField::Status(RepresentationStatus::Active)],
    )
    .await
    .unwrap();

    let roster = RepresentationRepo::list_roster(&pool, agent.id, false).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].representation.id, active);
    // Name falls back to the username when empty.
    assert_eq!(roster[0].client_name, "john@x.com");

    let everything = RepresentationRepo::list_roster(&pool, agent.id, true).await.unwrap();
    assert_eq!(everything.len(), 2);
    assert!(everything.iter().any(|e| e.representation.id == pending));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn connected_users_only_through_active(pool: PgPool) {
    let ari = user(&pool, "ari@x.com", ROLE_AGENT, "Ari", "Gold").await;
    let lloyd = user(&pool, "lloyd@x.com", ROLE_AGENT, "Lloyd", "Lee").await;
    let jane = user(&pool, "jane@x.com", ROLE_CLIENT, "Jane", "Doe").await;

    let with_ari = representation(&pool, &ari, &jane).await;
    // A second active row for the same pair must not duplicate the agent.
    let again_with_ari = representation(&pool, &ari, &jane).await;
    representation(&pool, &lloyd, &jane).await;
    for id in [with_ari, again_with_ari] {
        RepresentationRepo::apply_changes(
            &pool,
            id,
            &[RepresentationField::Status(RepresentationStatus::Active)],
        )
        .await
        .unwrap();
    }

    let agents = RepresentationRepo::connected_agents(&pool, jane.id).await.unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].id, ari.id);
    assert_eq!(agents[0].name, "Ari Gold");

    let clients = RepresentationRepo::connected_clients(&pool, lloyd.id).await.unwrap();
    assert!(clients.is_empty(), "pending representation is not a connection");

    assert!(RepresentationRepo::has_active(&pool, ari.id, jane.id).await.unwrap());
    assert!(!RepresentationRepo::has_active(&pool, lloyd.id, jane.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn events_listed_most_recent_first(pool: PgPool) {
    let agent = user(&pool, "agent@x.com", ROLE_AGENT, "Ari", "Gold").await;
    let client = user(&pool, "jane@x.com", ROLE_CLIENT, "Jane", "Doe").await;
    let id = representation(&pool, &agent, &client).await;

    let older: talent_core::types::Timestamp = "2024-01-01T10:00:00Z".parse().unwrap();
    let newer: talent_core::types::Timestamp = "2024-02-01T10:00:00Z".parse().unwrap();
    for (date, title) in [(older, "First call"), (newer, "Second call")] {
        RepresentationEventRepo::create(
            &pool,
            &CreateRepresentationEvent {
                representation_id: id,
                event_type: RepresentationEventType::Call,
                title: title.to_string(),
                description: String::new(),
                event_date: Some(date),
                changes: None,
                created_by: agent.id,
            },
        )
        .await
        .unwrap();
    }
    RepresentationEventRepo::create(
        &pool,
        &CreateRepresentationEvent {
            representation_id: id,
            event_type: RepresentationEventType::StatusChanged,
            title: "Representation Status Changed".to_string(),
            description: String::new(),
            event_date: None,
            changes: Some(vec![FieldChange {
                field: "status".into(),
                old_value: serde_json::json!("pending"),
                new_value: serde_json::json!("active"),
            }]),
            created_by: agent.id,
        },
    )
    .await
    .unwrap();

    let events = RepresentationEventRepo::list_for_representation(&pool, id).await.unwrap();
    let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["Representation Status Changed", "Second call", "First call"]);
    let changes = events[0].changes.as_ref().unwrap();
    assert_eq!(changes.0.len(), 1);
    assert_eq!(events[0].event_type, "status_changed");
}
