//! Roster endpoints: diff-based updates, archiving, and the audit trail.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json_auth, put_json_auth};
use sqlx::PgPool;
use talent_api::error::AppError;
use talent_api::services::RepresentationService;
use talent_core::error::CoreError;
use talent_core::representation::{RepresentationStatus, RepresentationTerms};
use talent_db::models::representation::Representation;
use talent_db::models::user::User;

async fn active_representation(pool: &PgPool, agent: &User, client: &User) -> Representation {
    let created = RepresentationService::create(pool, agent.id, client.id, None, None, agent.id)
        .await
        .unwrap();
    RepresentationService::change_status(pool, created.id, RepresentationStatus::Active, agent.id)
        .await
        .unwrap()
}

async fn events_json(pool: &PgPool, token: &str, id: i64) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/roster/{id}/events"), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn roster_lists_active_clients_with_names(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let other = common::create_client(&pool, "sam@x.com", "Sam Roe").await;
    active_representation(&pool, &agent, &client).await;
    RepresentationService::create(&pool, agent.id, other.id, None, None, agent.id)
        .await
        .unwrap();
    let token = common::token_for(&agent);

    let response = get_auth(common::build_test_app(pool.clone()), "/api/roster", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["clientName"], "Jane Doe");
    assert_eq!(rows[0]["clientUsername"], "jane@x.com");
    assert_eq!(rows[0]["status"], "active");

    let response = get_auth(
        common::build_test_app(pool),
        "/api/roster?includeInactive=true",
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn roster_is_agent_only(pool: PgPool) {
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let token = common::token_for(&client);

    let response = get_auth(common::build_test_app(pool), "/api/roster", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_change_records_single_change_entry(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let rep = active_representation(&pool, &agent, &client).await;
    let token = common::token_for(&agent);

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/roster/{}", rep.id),
        &token,
        serde_json::json!({ "status": "on_hold" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "on_hold");

    let events = events_json(&pool, &token, rep.id).await;
    let latest = &events[0];
    assert_eq!(latest["type"], "status_changed");
    let changes = latest["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["field"], "status");
    assert_eq!(changes[0]["oldValue"], "active");
    assert_eq!(changes[0]["newValue"], "on_hold");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeating_an_update_emits_no_second_event(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let rep = active_representation(&pool, &agent, &client).await;
    let token = common::token_for(&agent);
    let body = serde_json::json!({
        "notes": "Strong comedic range",
        "terms": {
            "commission": 15,
            "exclusivity": true,
            "territories": ["US", "CA"],
            "mediaTypes": ["Theatrical", "Commercial"]
        }
    });
    let uri = format!("/api/roster/{}", rep.id);

    let first = put_json_auth(common::build_test_app(pool.clone()), &uri, &token, body.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let after_first = events_json(&pool, &token, rep.id).await;

    let second = put_json_auth(common::build_test_app(pool.clone()), &uri, &token, body).await;
    assert_eq!(second.status(), StatusCode::OK);
    let after_second = events_json(&pool, &token, rep.id).await;

    assert_eq!(after_first.as_array().unwrap().len(), after_second.as_array().unwrap().len());
    assert_eq!(after_first[0]["type"], "updated");
    assert_eq!(after_first[0]["changes"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeating_a_sub_microsecond_key_date_emits_no_second_event(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let rep = active_representation(&pool, &agent, &client).await;
    let token = common::token_for(&agent);
    let body = serde_json::json!({ "nextKeyDate": "2024-06-01T12:00:00.123456789Z" });
    let uri = format!("/api/roster/{}", rep.id);

    let first = put_json_auth(common::build_test_app(pool.clone()), &uri, &token, body.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let after_first = events_json(&pool, &token, rep.id).await;
    assert_eq!(after_first[0]["changes"][0]["field"], "nextKeyDate");

    let second = put_json_auth(common::build_test_app(pool.clone()), &uri, &token, body).await;
    assert_eq!(second.status(), StatusCode::OK);
    let after_second = events_json(&pool, &token, rep.id).await;

    assert_eq!(after_first.as_array().unwrap().len(), after_second.as_array().unwrap().len());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_commission_returns_400(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let rep = active_representation(&pool, &agent, &client).await;
    let token = common::token_for(&agent);

    let response = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/roster/{}", rep.id),
        &token,
        serde_json::json!({
            "terms": { "commission": 140, "exclusivity": false, "territories": [], "mediaTypes": [] }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn archiving_twice_emits_one_archived_event(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let rep = active_representation(&pool, &agent, &client).await;
    let token = common::token_for(&agent);
    let uri = format!("/api/roster/{}", rep.id);

    let first = delete_auth(common::build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    let second = delete_auth(common::build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(second.status(), StatusCode::NO_CONTENT);

    let archived = RepresentationService::get(&pool, rep.id).await.unwrap();
    assert_eq!(archived.status().unwrap(), RepresentationStatus::Inactive);
    assert!(archived.end_date.is_some());

    let events = events_json(&pool, &token, rep.id).await;
    let archived_events: Vec<_> = events
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["type"] == "archived")
        .collect();
    assert_eq!(archived_events.len(), 1);
    let fields: Vec<_> = archived_events[0]["changes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["status", "endDate"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn archived_representation_cannot_be_reactivated(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let rep = active_representation(&pool, &agent, &client).await;
    RepresentationService::archive(&pool, rep.id, agent.id).await.unwrap();
    let token = common::token_for(&agent);

    let response = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/roster/{}", rep.id),
        &token,
        serde_json::json!({ "status": "active" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_agents_cannot_touch_a_representation(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let rival = common::create_agent(&pool, "rival@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let rep = active_representation(&pool, &agent, &client).await;
    let token = common::token_for(&rival);
    let uri = format!("/api/roster/{}", rep.id);

    let update = put_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        &token,
        serde_json::json!({ "status": "away" }),
    )
    .await;
    assert_eq!(update.status(), StatusCode::FORBIDDEN);

    let archive = delete_auth(common::build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(archive.status(), StatusCode::FORBIDDEN);

    let events = get_auth(
        common::build_test_app(pool.clone()),
        &format!("{uri}/events"),
        &token,
    )
    .await;
    assert_eq!(events.status(), StatusCode::FORBIDDEN);

    let unchanged = RepresentationService::get(&pool, rep.id).await.unwrap();
    assert_eq!(unchanged.status().unwrap(), RepresentationStatus::Active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_representation_returns_404(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let token = common::token_for(&agent);

    let response = put_json_auth(
        common::build_test_app(pool),
        "/api/roster/999999",
        &token,
        serde_json::json!({ "status": "away" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manual_activity_can_be_logged(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let rep = active_representation(&pool, &agent, &client).await;
    let token = common::token_for(&agent);
    let uri = format!("/api/roster/{}/events", rep.id);

    let logged = post_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        &token,
        serde_json::json!({
            "type": "meeting",
            "title": "Quarterly check-in",
            "description": "Reviewed pilot season plans",
            "date": "2024-01-15T17:00:00Z"
        }),
    )
    .await;
    assert_eq!(logged.status(), StatusCode::CREATED);
    let json = body_json(logged).await;
    assert_eq!(json["type"], "meeting");
    assert_eq!(json["date"], "2024-01-15T17:00:00Z");

    let rejected = post_json_auth(
        common::build_test_app(pool),
        &uri,
        &token,
        serde_json::json!({ "type": "archived", "title": "Sneaky" }),
    )
    .await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn connected_users_follow_active_representations(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let pending = common::create_client(&pool, "sam@x.com", "Sam Roe").await;
    active_representation(&pool, &agent, &client).await;
    RepresentationService::create(&pool, agent.id, pending.id, None, None, agent.id)
        .await
        .unwrap();

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/agent/clients",
        &common::token_for(&agent),
    )
    .await;
    let clients = body_json(response).await;
    assert_eq!(clients, serde_json::json!([{ "id": client.id, "name": "Jane Doe" }]));

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/client/agents",
        &common::token_for(&client),
    )
    .await;
    let agents = body_json(response).await;
    assert_eq!(agents, serde_json::json!([{ "id": agent.id, "name": "Ari Gold" }]));

    let response = get_auth(
        common::build_test_app(pool),
        "/api/client/agents",
        &common::token_for(&pending),
    )
    .await;
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

fn sample_terms() -> RepresentationTerms {
    RepresentationTerms {
        commission: 12.5,
        exclusivity: true,
        territories: vec!["US".into()],
        media_types: vec!["Theatrical".into()],
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn clearing_terms_is_rejected(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let rep = active_representation(&pool, &agent, &client).await;

    let result = RepresentationService::update_terms(&pool, rep.id, None, agent.id).await;

    assert_matches!(
        result,
        Err(AppError::Core(CoreError::Validation(msg))) if msg == "terms cannot be empty"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn setting_the_same_terms_twice_emits_one_event(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let rep = active_representation(&pool, &agent, &client).await;

    RepresentationService::update_terms(&pool, rep.id, Some(sample_terms()), agent.id)
        .await
        .unwrap();
    let before = RepresentationService::events(&pool, rep.id).await.unwrap();
    assert_eq!(before[0].event_type, "updated");

    let unchanged = RepresentationService::update_terms(&pool, rep.id, Some(sample_terms()), agent.id)
        .await
        .unwrap();
    let after = RepresentationService::events(&pool, rep.id).await.unwrap();

    assert_eq!(before.len(), after.len());
    assert_eq!(unchanged.terms.map(|t| t.0), Some(sample_terms()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ending_a_representation_twice_emits_one_archived_event(pool: PgPool) {
    let agent = common::create_agent(&pool, "agent@agency.com").await;
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let rep = active_representation(&pool, &agent, &client).await;

    let ended = RepresentationService::end_representation(&pool, rep.id, agent.id)
        .await
        .unwrap();
    let again = RepresentationService::end_representation(&pool, rep.id, agent.id)
        .await
        .unwrap();

    assert_eq!(ended.status().unwrap(), RepresentationStatus::Inactive);
    assert_eq!(again.end_date, ended.end_date);
    let events = RepresentationService::events(&pool, rep.id).await.unwrap();
    let archived = events.iter().filter(|e| e.event_type == "archived").count();
    assert_eq!(archived, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_listing_includes_every_status_newest_first(pool: PgPool) {
    let client = common::create_client(&pool, "jane@x.com", "Jane Doe").await;
    let first = common::create_agent(&pool, "first@agency.com").await;
    let second = common::create_agent(&pool, "second@agency.com").await;
    let third = common::create_agent(&pool, "third@agency.com").await;

    let archived = active_representation(&pool, &first, &client).await;
    RepresentationService::archive(&pool, archived.id, first.id).await.unwrap();
    let active = active_representation(&pool, &second, &client).await;
    let pending = RepresentationService::create(&pool, third.id, client.id, None, None, third.id)
        .await
        .unwrap();

    let listed = RepresentationService::list_for_client(&pool, client.id).await.unwrap();

    let ids: Vec<_> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![pending.id, active.id, archived.id]);
    let statuses: Vec<_> = listed.iter().map(|r| r.status().unwrap()).collect();
    assert_eq!(
        statuses,
        vec![
            RepresentationStatus::Pending,
            RepresentationStatus::Active,
            RepresentationStatus::Inactive,
        ]
    );
}
