#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use khutba_roster::http_api::{AppState, router};
use khutba_roster::persistence::{PersistenceResult, RosterStore};
use khutba_roster::{Roster, RosterConfig, RosterEntry, UNBOOKED};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

#[derive(Default)]
struct MemoryStore {
    document: Mutex<Option<Vec<RosterEntry>>>,
}

impl MemoryStore {
    fn entries(&self) -> Option<Vec<RosterEntry>> {
        self.document.lock().unwrap().clone()
    }
}

impl RosterStore for MemoryStore {
    fn save_roster(&self, roster: &Roster) -> PersistenceResult<()> {
        let entries = roster.entries()?;
        *self.document.lock().unwrap() = Some(entries);
        Ok(())
    }

    fn load_roster(&self) -> PersistenceResult<Option<Roster>> {
        match self.entries() {
            Some(entries) => Ok(Some(Roster::from_entries(entries)?)),
            None => Ok(None),
        }
    }
}

fn new_app() -> (axum::Router, Arc<MemoryStore>) {
    let config = RosterConfig::new(
        [
            "Ahmed".to_string(),
            "Bilal".to_string(),
            "Chafik".to_string(),
        ],
        "4321",
    )
    .unwrap();
    let store = Arc::new(MemoryStore::default());
    let state = AppState::new(store.clone(), config);
    (router(state), store)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn put_json(app: &axum::Router, uri: &str, payload: &Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _store) = new_app();
    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn first_schedule_fetch_extends_and_persists() {
    let (app, store) = new_app();

    let (status, view) = get_json(&app, "/schedule").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["extended"].as_array().unwrap().len(), 52);

    let persisted = store.entries().expect("extension must be persisted");
    assert_eq!(persisted.len(), 52);
    assert!(persisted.iter().all(|entry| entry.khatib == UNBOOKED));

    let rows = view["rows"].as_array().unwrap();
    assert!(!rows.is_empty());
    let dates: Vec<&str> = rows
        .iter()
        .map(|row| row["date"].as_str().unwrap())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort_unstable();
    assert_eq!(dates, sorted, "rows must be sorted ascending by date");
    for row in rows {
        assert_eq!(row["kind"], json!("unbooked"));
    }

    // Second cycle finds nothing missing
    let (_, view) = get_json(&app, "/schedule").await;
    assert!(view["extended"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_pin_is_unauthorized_and_not_persisted() {
    let (app, store) = new_app();
    let (_, view) = get_json(&app, "/schedule").await;
    let date = view["rows"][0]["date"].as_str().unwrap().to_string();

    let payload = json!({ "pin": "0000", "edit": { "kind": "guest", "name": "Guest X" } });
    let (status, body) = put_json(&app, &format!("/schedule/{date}"), &payload).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("unauthorized"));

    let persisted = store.entries().unwrap();
    assert!(persisted.iter().all(|entry| entry.khatib == UNBOOKED));
}

#[tokio::test]
async fn guest_edit_round_trips_through_the_store() {
    let (app, store) = new_app();
    let (_, view) = get_json(&app, "/schedule").await;
    let date = view["rows"][0]["date"].as_str().unwrap().to_string();

    let payload = json!({ "pin": "4321", "edit": { "kind": "guest", "name": "Visiting Imam" } });
    let (status, ack) = put_json(&app, &format!("/schedule/{date}"), &payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["khatib"], json!("Visiting Imam"));
    assert_eq!(ack["kind"], json!("guest"));

    let persisted = store.entries().unwrap();
    let booked: Vec<&RosterEntry> = persisted
        .iter()
        .filter(|entry| entry.khatib != UNBOOKED)
        .collect();
    assert_eq!(booked.len(), 1);
    assert_eq!(booked[0].khatib, "Visiting Imam");

    // The next render cycle reproduces the edit
    let (_, view) = get_json(&app, "/schedule").await;
    let row = view["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["date"].as_str() == Some(date.as_str()))
        .unwrap();
    assert_eq!(row["khatib"], json!("Visiting Imam"));
}

#[tokio::test]
async fn clearing_a_slot_uses_the_sentinel() {
    let (app, _store) = new_app();
    let (_, view) = get_json(&app, "/schedule").await;
    let date = view["rows"][1]["date"].as_str().unwrap().to_string();

    let book = json!({ "pin": "4321", "edit": { "kind": "regular", "name": "Bilal" } });
    let (status, ack) = put_json(&app, &format!("/schedule/{date}"), &book).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["kind"], json!("regular2"));

    let clear = json!({ "pin": "4321", "edit": { "kind": "clear" } });
    let (status, ack) = put_json(&app, &format!("/schedule/{date}"), &clear).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["khatib"], json!(UNBOOKED));
    assert_eq!(ack["kind"], json!("unbooked"));
}

#[tokio::test]
async fn malformed_dates_are_invalid_requests() {
    let (app, _store) = new_app();
    let payload = json!({ "pin": "4321", "edit": { "kind": "clear" } });
    let (status, body) = put_json(&app, "/schedule/not-a-date", &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid_request"));
}
