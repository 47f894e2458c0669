//! Read-only HTTP layer over the cached snapshot and the event log.

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::{Query, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::cross::Direction;
use crate::format::iso_utc;
use crate::history::EVENT_LOG_CAPACITY;
use crate::metrics::Metrics;
use crate::snapshot::QueryView;

const DEFAULT_EVENTS_LIMIT: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub view: QueryView,
}

/// Build the router. `metrics` adds `/metrics`; an empty `allowed_origins`
/// means permissive CORS.
pub fn router(state: AppState, allowed_origins: &[String], metrics: Option<&Metrics>) -> Router {
    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(|| async { "ok" }))
        .route("/gas", get(gas))
        .route("/events", get(events));

    if let Some(m) = metrics {
        app = app.merge(m.router());
    }

    app.layer(cors(allowed_origins)).with_state(state)
}

fn cors(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::very_permissive();
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[derive(Serialize)]
struct RootResp {
    msg: &'static str,
}

async fn root() -> Json<RootResp> {
    Json(RootResp {
        msg: "ethfee backend is alive",
    })
}

#[derive(Serialize)]
struct NotReady {
    error: &'static str,
}

async fn gas(State(state): State<AppState>) -> Response {
    match state.view.snapshot() {
        Some(snap) => Json(snap).into_response(),
        None => Json(NotReady {
            error: "Gas data not available yet",
        })
        .into_response(),
    }
}

#[derive(Deserialize)]
struct EventsQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct EventOut {
    threshold: f64,
    state: Direction,
    timestamp: String,
}

#[derive(Serialize)]
struct EventsResp {
    events: Vec<EventOut>,
}

async fn events(State(state): State<AppState>, Query(q): Query<EventsQuery>) -> Json<EventsResp> {
    let limit = q
        .limit
        .unwrap_or(DEFAULT_EVENTS_LIMIT)
        .min(EVENT_LOG_CAPACITY);
    let events = state
        .view
        .recent_events(limit)
        .into_iter()
        .map(|e| EventOut {
            threshold: e.threshold,
            state: e.direction,
            timestamp: iso_utc(e.logged_at),
        })
        .collect();
    Json(EventsResp { events })
}
