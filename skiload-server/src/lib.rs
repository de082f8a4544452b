use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use skiload_common::{ErrorResponse, LiftRide, SeasonVertical, SkierVertical};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub mod config;
use config::{SEASON_ID, VERTICAL_PER_LIFT};

/// Identifies one skier's rides at one resort on one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RideKey {
    pub resort_id: String,
    pub day_id: u32,
    pub skier_id: u32,
}

#[derive(Debug, Default)]
pub struct RideState {
    /// Accumulated vertical per (resort, day, skier).
    pub verticals: HashMap<RideKey, u64>,
    pub rides_recorded: u64,
}

pub type Db = Arc<RwLock<RideState>>;

#[derive(Clone, Default)]
pub struct AppState {
    pub db: Db,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: SocketAddr,
}

/// Stub ski resort API server
pub struct Server {
    config: ServerConfig,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Create the application router with the given state
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/skiers/liftrides", post(handle_write_ride))
            .route(
                "/skiers/:resort_id/days/:day_id/skiers/:skier_id",
                get(handle_day_vertical),
            )
            .route("/skiers/:skier_id/vertical", get(handle_resort_totals))
            .with_state(state)
    }

    /// Run the server, signalling `ready_tx` with the bound address once accepting connections
    pub async fn run(
        self,
        ready_tx: tokio::sync::oneshot::Sender<SocketAddr>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = Self::create_router(AppState::new());
        let listener = tokio::net::TcpListener::bind(self.config.address).await?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "ski api stub listening");
        ready_tx.send(local_addr).ok();
        axum::serve(listener, app).await?;
        Ok(())
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { message: message.into() })).into_response()
}

fn parse_id(name: &str, raw: &str) -> Result<u32, Response> {
    raw.parse::<u32>()
        .map_err(|_| {
            error_response(StatusCode::BAD_REQUEST, format!("{name} must be a non-negative integer"))
        })
}

/// Handler for POST /skiers/liftrides: records one ride and answers 201.
pub async fn handle_write_ride(State(state): State<AppState>, body: Bytes) -> Response {
    let ride: LiftRide = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("Invalid lift ride: {e}")),
    };

    let key = match (parse_id("dayID", &ride.day_id), parse_id("skierID", &ride.skier_id)) {
        (Ok(day_id), Ok(skier_id)) => RideKey { resort_id: ride.resort_id, day_id, skier_id },
        (Err(r), _) | (_, Err(r)) => return r,
    };
    let lift_id = match parse_id("liftID", &ride.lift_id) {
        Ok(id) => u64::from(id),
        Err(r) => return r,
    };
    if ride.time.parse::<f64>().is_err() {
        return error_response(StatusCode::BAD_REQUEST, "time must be a number");
    }

    let mut db_guard = state.db.write().await;
    *db_guard.verticals.entry(key).or_default() += lift_id * VERTICAL_PER_LIFT;
    db_guard.rides_recorded += 1;

    StatusCode::CREATED.into_response()
}

/// Handler for GET /skiers/:resort_id/days/:day_id/skiers/:skier_id: 200 with the
/// day's vertical, or 204 if the skier has no rides that day.
pub async fn handle_day_vertical(
    State(state): State<AppState>,
    Path((resort_id, day_id, skier_id)): Path<(String, String, String)>,
) -> Response {
    let key = match (parse_id("dayID", &day_id), parse_id("skierID", &skier_id)) {
        (Ok(day_id), Ok(skier_id)) => RideKey { resort_id, day_id, skier_id },
        (Err(r), _) | (_, Err(r)) => return r,
    };

    let db_guard = state.db.read().await;
    match db_guard.verticals.get(&key) {
        None => StatusCode::NO_CONTENT.into_response(),
        Some(&total_vert) => {
            let body = SkierVertical {
                resorts: vec![SeasonVertical { season_id: SEASON_ID.to_string(), total_vert }],
            };
            (StatusCode::OK, Json(body)).into_response()
        }
    }
}

/// Handler for GET /skiers/:skier_id/vertical?resort=…: season totals for each
/// requested resort the skier has rides at; 204 if there are none.
pub async fn handle_resort_totals(
    State(state): State<AppState>,
    Path(skier_id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let skier_id = match parse_id("skierID", &skier_id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let resorts: Vec<&str> = params
        .iter()
        .filter(|(k, _)| k == "resort")
        .map(|(_, v)| v.as_str())
        .collect();
    if resorts.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "at least one resort parameter is required");
    }

    let db_guard = state.db.read().await;
    let totals: Vec<SeasonVertical> = resorts
        .iter()
        .filter_map(|resort| {
            let total: u64 = db_guard
                .verticals
                .iter()
                .filter(|(k, _)| k.skier_id == skier_id && k.resort_id == *resort)
                .map(|(_, v)| *v)
                .sum();
            (total > 0).then(|| SeasonVertical { season_id: SEASON_ID.to_string(), total_vert: total })
        })
        .collect();

    if totals.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    (StatusCode::OK, Json(SkierVertical { resorts: totals })).into_response()
}
