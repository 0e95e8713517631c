use std::sync::Arc;
use std::time::Instant;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query as QueryString, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use serde::Serialize;
use tracing::{info, warn};
use crate::engine::Engine;
use crate::error::{Result, SolarError};
use crate::query::Query;
use crate::record::RecordId;
use crate::settings::Limits;
use crate::store::RecordStore;

pub type SharedStore = Arc<dyn RecordStore + Send + Sync>;

/// What every request handler needs: the injected store and the limits.
pub struct AppState {
    pub store: SharedStore,
    pub limits: Limits,
}

impl AppState {
    pub fn new(store: SharedStore, limits: Limits) -> Self {
        Self { store, limits }
    }
}

type Shared = Arc<AppState>;
type Params = QueryString<Vec<(String, String)>>;
type IdParam = std::result::Result<Path<RecordId>, PathRejection>;

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for SolarError {
    fn into_response(self) -> Response {
        let status = match &self {
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            SolarError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let msg = self.to_string();
        warn!(%msg, code = %status.as_u16(), "query error");
        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

pub fn router(state: Shared) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);
    Router::new()
        .route("/locations", get(list))
        .route("/locations/nearest", get(nearest))
        .route("/locations/radius", get(radius))
        .route("/locations/search", get(search))
        .route("/locations/:id", get(record))
        .route("/locations/:id/similar", get(similar))
        .layer(cors)
        .with_state(state)
}

// path rejections become InvalidParameter
fn record_id(id: IdParam) -> Result<RecordId> {
    id.map(|Path(id)| id)
        .map_err(|rejection| SolarError::InvalidParameter(rejection.body_text()))
}

fn parse(params: &[(String, String)]) -> Query {
    Query::from_params(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

async fn list(State(state): State<Shared>, QueryString(params): Params) -> Response {
    let query = parse(&params);
    run(state, "list", move |engine| engine.list(&query)).await
}

async fn nearest(State(state): State<Shared>, QueryString(params): Params) -> Response {
    let query = parse(&params);
    run(state, "nearest", move |engine| engine.nearest(&query)).await
}

async fn radius(State(state): State<Shared>, QueryString(params): Params) -> Response {
    let query = parse(&params);
    run(state, "radius", move |engine| engine.radius(&query)).await
}

async fn search(State(state): State<Shared>, QueryString(params): Params) -> Response {
    let query = parse(&params);
    let text = query.text.unwrap_or_default();
    run(state, "search", move |engine| engine.search(&text, query.limit)).await
}

async fn record(State(state): State<Shared>, id: IdParam) -> Response {
    let id = match record_id(id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    run(state, "record", move |engine| engine.get(id)).await
}

async fn similar(
    State(state): State<Shared>,
    id: IdParam,
    QueryString(params): Params,
) -> Response {
    let id = match record_id(id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let k = params
        .iter()
        .find(|(name, _)| name == "k")
        .and_then(|(_, value)| value.trim().parse::<i64>().ok());
    run(state, "similar", move |engine| engine.similar(id, k)).await
}

/// Runs engine work on a blocking thread, since the store is synchronous,
/// and turns the outcome into a JSON response.
async fn run<T, F>(state: Shared, route: &'static str, work: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce(&Engine<'_, dyn RecordStore + Send + Sync>) -> Result<T> + Send + 'static,
{
    let started = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || {
        let engine = Engine::new(state.store.as_ref(), &state.limits);
        work(&engine)
    })
    .await
    .unwrap_or_else(|e| {
        warn!(error = %e, "Join error");
        Err(SolarError::Internal(e.to_string()))
    });
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    match outcome {
        Ok(body) => {
            info!(route, ms = elapsed_ms, "query complete");
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
