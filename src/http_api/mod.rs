use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::admin::{self, EDIT_HORIZON_DAYS, EditChoice, EditError};
use crate::classify::SpeakerKind;
use crate::config::RosterConfig;
use crate::persistence::{PersistenceError, RosterStore};
use crate::roster::{ReconcileSummary, Roster};
use crate::window::DEFAULT_WINDOW_WEEKS;

#[derive(Clone)]
pub struct AppState {
    roster: Arc<RwLock<Roster>>,
    store: Arc<dyn RosterStore + Send + Sync>,
    config: Arc<RosterConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn RosterStore + Send + Sync>, config: RosterConfig) -> Self {
        Self {
            roster: Arc::new(RwLock::new(Roster::new())),
            store,
            config: Arc::new(config),
        }
    }

    fn config(&self) -> &RosterConfig {
        &self.config
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Unauthorized(String),
    Invalid(String),
    Unavailable(String),
    Internal(String),
}

impl From<EditError> for ApiError {
    fn from(value: EditError) -> Self {
        match value {
            EditError::WrongPin => ApiError::Unauthorized("wrong PIN".to_string()),
            EditError::UnknownDate(_) => ApiError::NotFound(value.to_string()),
            EditError::OutsideEditWindow(_)
            | EditError::NotARegular(_)
            | EditError::EmptyGuestName => ApiError::Invalid(value.to_string()),
            EditError::Persistence(PersistenceError::Unavailable(msg)) => {
                ApiError::Unavailable(msg)
            }
            EditError::Persistence(err) => ApiError::Internal(err.to_string()),
            EditError::Roster(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::Unavailable(msg) => ApiError::Unavailable(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<polars::prelude::PolarsError> for ApiError {
    fn from(value: polars::prelude::PolarsError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, "unauthorized", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Unavailable(message) => {
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", message)
            }
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        let body = Json(ErrorBody { error, message });
        (status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ScheduleRow {
    date: NaiveDate,
    friday: String,
    khatib: String,
    kind: SpeakerKind,
    accent: &'static str,
}

#[derive(Debug, Serialize)]
struct ScheduleView {
    today: NaiveDate,
    extended: Vec<NaiveDate>,
    rows: Vec<ScheduleRow>,
}

#[derive(Debug, Deserialize)]
struct EditPayload {
    pin: String,
    edit: EditChoice,
}

#[derive(Debug, Serialize)]
struct EditAck {
    date: NaiveDate,
    khatib: String,
    kind: SpeakerKind,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schedule", get(get_schedule))
        .route("/roster", get(get_roster))
        .route("/schedule/:date", put(edit_schedule))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// One render cycle: reload the collection from the store, fill any window
/// gaps, and persist the extension before anything is displayed. A store
/// outage aborts the cycle instead of masquerading as an empty schedule.
fn run_cycle(state: &AppState, today: NaiveDate) -> Result<ReconcileSummary, ApiError> {
    let loaded = state.store.load_roster()?.unwrap_or_default();
    let mut guard = state.roster.write();
    *guard = loaded;
    let summary = guard.reconcile(today, DEFAULT_WINDOW_WEEKS)?;
    if summary.extended() {
        state.store.save_roster(&guard)?;
    }
    Ok(summary)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_schedule(State(state): State<AppState>) -> Result<Json<ScheduleView>, ApiError> {
    let today = today();
    let summary = run_cycle(&state, today)?;
    let entries = {
        let guard = state.roster.read();
        guard.upcoming(today, EDIT_HORIZON_DAYS)?
    };
    let rows = entries
        .into_iter()
        .map(|entry| {
            let kind = SpeakerKind::classify(&entry.khatib, state.config());
            ScheduleRow {
                date: entry.date,
                friday: entry.date.format("%d %b").to_string(),
                khatib: entry.khatib,
                kind,
                accent: kind.accent(),
            }
        })
        .collect();
    Ok(Json(ScheduleView {
        today,
        extended: summary.appended,
        rows,
    }))
}

async fn get_roster(
    State(state): State<AppState>,
) -> Result<Json<Vec<crate::entry::RosterEntry>>, ApiError> {
    run_cycle(&state, today())?;
    let mut entries = {
        let guard = state.roster.read();
        guard.entries()?
    };
    entries.sort_by_key(|entry| entry.date);
    Ok(Json(entries))
}

async fn edit_schedule(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<EditPayload>,
) -> Result<Json<EditAck>, ApiError> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| ApiError::Invalid(format!("invalid date '{date}': {e}")))?;
    let today = today();
    // Edit against the freshly loaded full collection, never a display subset.
    run_cycle(&state, today)?;

    let updated = {
        let mut guard = state.roster.write();
        admin::apply_edit(
            &mut guard,
            state.store.as_ref(),
            state.config(),
            today,
            &payload.pin,
            date,
            &payload.edit,
        )?
    };
    let kind = SpeakerKind::classify(&updated.khatib, state.config());
    Ok(Json(EditAck {
        date: updated.date,
        khatib: updated.khatib,
        kind,
    }))
}
