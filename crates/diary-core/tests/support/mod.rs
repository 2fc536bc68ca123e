//! Shared mock-server helpers for integration tests.

#![allow(dead_code)]

use diary_core::api::DiaryApiClient;
use diary_core::controller::{Command, Controller, Response};
use diary_core::session::MemoryStorage;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "tok123";

/// Server-shaped entry JSON with already percent-encoded text.
pub fn entry_json(id: i64, title: &str, content: &str, entry_date: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": content,
        "entry_date": entry_date,
        "created_at": "2024-01-01 08:00:00",
    })
}

pub fn entries_response(entries: &[Value]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/json")
        .set_body_json(Value::Array(entries.to_vec()))
}

pub async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Session-Token", token)
                .set_body_string("LOGIN_SUCCESS"),
        )
        .mount(server)
        .await;
}

/// List response used exactly once, for the load that follows login.
pub async fn mount_initial_list(server: &MockServer, entries: &[Value]) {
    Mock::given(method("GET"))
        .and(path("/entry/view"))
        .and(header("Session-Token", TOKEN))
        .respond_with(entries_response(entries))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

pub fn controller_for(server: &MockServer) -> (Controller<MemoryStorage>, MemoryStorage) {
    let storage = MemoryStorage::default();
    let api = DiaryApiClient::new(server.uri()).unwrap();
    (Controller::new(api, storage.clone()), storage)
}

/// Controller logged in as `alice` with `entries` loaded into the cache.
pub async fn logged_in_controller(
    server: &MockServer,
    entries: &[Value],
) -> (Controller<MemoryStorage>, MemoryStorage) {
    mount_login(server, TOKEN).await;
    mount_initial_list(server, entries).await;

    let (mut controller, storage) = controller_for(server);
    let response = controller
        .dispatch(Command::Login {
            username: "alice".to_string(),
            password: "correct".to_string(),
        })
        .await
        .unwrap();
    assert!(matches!(response, Response::LoggedIn { .. }));
    (controller, storage)
}

pub async fn requests_to(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}
