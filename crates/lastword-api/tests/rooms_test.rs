//! Integration tests for the room lifecycle routes.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_create_room_returns_the_room_with_a_join_code() {
    let (app, _store) = common::build_test_app().await;
    let creator = Uuid::new_v4();

    let (status, room) = common::post_json_as(
        app,
        creator,
        "/api/v1/rooms",
        &json!({ "name": "friday night", "capacity": 4, "time_limit_secs": 60 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(room["status"], "waiting");
    assert_eq!(room["capacity"], 4);
    assert_eq!(room["code"].as_str().unwrap().len(), 6);
    assert_eq!(room["creator"], creator.to_string());
}

#[tokio::test]
async fn test_create_room_rejects_bad_capacity() {
    let (app, _store) = common::build_test_app().await;

    let (status, body) = common::post_json_as(
        app,
        Uuid::new_v4(),
        "/api/v1/rooms",
        &json!({ "name": "too big", "capacity": 9, "time_limit_secs": 60 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_requests_without_identity_are_unauthorized() {
    let (app, _store) = common::build_test_app().await;

    let (status, body) = common::get_json_anonymous(app, "/api/v1/rooms/expired").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_expired_listing_requires_the_admin_role() {
    let (app, _store) = common::build_test_app().await;
    let user = Uuid::new_v4();

    let (status, body) = common::get_json_as(app.clone(), user, "/api/v1/rooms/expired").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "authorization_error");

    let (status, rooms) =
        common::get_json_with_role(app, user, "admin", "/api/v1/rooms/expired").await;
    assert_eq!(status, StatusCode::OK);
    assert!(rooms.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_room_reads_as_not_found() {
    let (app, _store) = common::build_test_app().await;

    let (status, body) = common::get_json_as(
        app,
        Uuid::new_v4(),
        &format!("/api/v1/rooms/{}", Uuid::new_v4()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_join_and_start_moves_the_room_in_progress() {
    let (app, _store) = common::build_test_app().await;
    let creator = Uuid::new_v4();
    let guest = Uuid::new_v4();

    let (_, room) = common::post_json_as(
        app.clone(),
        creator,
        "/api/v1/rooms",
        &json!({ "name": "lunch game", "capacity": 4, "time_limit_secs": 60 }),
    )
    .await;
    let room_id = room["id"].as_str().unwrap().to_owned();

    let (status, player) = common::post_json_as(
        app.clone(),
        guest,
        &format!("/api/v1/rooms/{room_id}/join"),
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(player["join_status"], "joined");

    let (status, _) = common::post_json_as(
        app.clone(),
        creator,
        &format!("/api/v1/rooms/{room_id}/start"),
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, view) = common::get_json_as(
        app.clone(),
        creator,
        &format!("/api/v1/rooms/{room_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "in_progress");
    assert_eq!(view["round"], 1);
    // The roster never leaks targets or words.
    for entry in view["players"].as_array().unwrap() {
        assert!(entry.get("target").is_none());
        assert!(entry.get("words").is_none());
    }

    // Each player sees their own assignment.
    let (status, me) = common::get_json_as(
        app,
        creator,
        &format!("/api/v1/rooms/{room_id}/me"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(me["target"].is_string());
    assert_eq!(me["words"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_start_by_a_guest_is_forbidden() {
    let (app, _store) = common::build_test_app().await;
    let creator = Uuid::new_v4();
    let guest = Uuid::new_v4();

    let (_, room) = common::post_json_as(
        app.clone(),
        creator,
        "/api/v1/rooms",
        &json!({ "name": "mine", "capacity": 2, "time_limit_secs": 60 }),
    )
    .await;
    let room_id = room["id"].as_str().unwrap().to_owned();
    common::post_json_as(
        app.clone(),
        guest,
        &format!("/api/v1/rooms/{room_id}/join"),
        &json!({}),
    )
    .await;

    let (status, body) = common::post_json_as(
        app,
        guest,
        &format!("/api/v1/rooms/{room_id}/start"),
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "authorization_error");
}

#[tokio::test]
async fn test_solo_start_conflicts_on_player_count() {
    let (app, _store) = common::build_test_app().await;
    let creator = Uuid::new_v4();

    let (_, room) = common::post_json_as(
        app.clone(),
        creator,
        "/api/v1/rooms",
        &json!({ "name": "lonely", "capacity": 4, "time_limit_secs": 60 }),
    )
    .await;
    let room_id = room["id"].as_str().unwrap().to_owned();

    let (status, body) = common::post_json_as(
        app,
        creator,
        &format!("/api/v1/rooms/{room_id}/start"),
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "insufficient_players");
}

#[tokio::test]
async fn test_room_resolves_by_join_code() {
    let (app, _store) = common::build_test_app().await;
    let creator = Uuid::new_v4();

    let (_, room) = common::post_json_as(
        app.clone(),
        creator,
        "/api/v1/rooms",
        &json!({ "name": "by code", "capacity": 3, "time_limit_secs": 90 }),
    )
    .await;
    let code = room["code"].as_str().unwrap().to_owned();

    let (status, view) = common::get_json_as(
        app,
        Uuid::new_v4(),
        &format!("/api/v1/rooms/code/{code}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["id"], room["id"]);
}

#[tokio::test]
async fn test_room_log_records_the_lifecycle() {
    let (app, _store) = common::build_test_app().await;
    let creator = Uuid::new_v4();
    let guest = Uuid::new_v4();

    let (_, room) = common::post_json_as(
        app.clone(),
        creator,
        "/api/v1/rooms",
        &json!({ "name": "audited", "capacity": 2, "time_limit_secs": 60 }),
    )
    .await;
    let room_id = room["id"].as_str().unwrap().to_owned();
    common::post_json_as(
        app.clone(),
        guest,
        &format!("/api/v1/rooms/{room_id}/join"),
        &json!({}),
    )
    .await;
    common::post_json_as(
        app.clone(),
        creator,
        &format!("/api/v1/rooms/{room_id}/start"),
        &json!({}),
    )
    .await;

    let (status, logs) = common::get_json_as(
        app,
        creator,
        &format!("/api/v1/rooms/{room_id}/logs"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["room_created", "player_joined", "game_started"]);
}
