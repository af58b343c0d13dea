use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use bramble_core::{AnalysisRecord, LoginTelemetry};
use bramble_detect::ScoringEngine;
use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// In-memory state for the risk API: the engine plus a bounded map of
/// recent analysis records. Nothing is persisted.
pub struct ApiState {
    pub engine: ScoringEngine,
    pub records: DashMap<String, AnalysisRecord>,
    pub max_records: usize,
}

pub fn api_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/api/results", get(results_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "bramble-api"
    }))
}

async fn analyze_handler(
    State(state): State<Arc<ApiState>>,
    Json(telemetry): Json<LoginTelemetry>,
) -> Json<AnalysisRecord> {
    let result = state.engine.analyze(&telemetry);

    let record = AnalysisRecord {
        id: uuid::Uuid::new_v4().to_string(),
        analyzed_at: Utc::now(),
        result,
    };

    info!(
        id = %record.id,
        is_bot = record.result.is_bot,
        confidence = record.result.confidence,
        "analyzed login telemetry"
    );

    if state.records.len() >= state.max_records {
        // drop the oldest half rather than tracking insertion order
        let mut entries: Vec<(String, chrono::DateTime<Utc>)> = state
            .records
            .iter()
            .map(|e| (e.key().clone(), e.value().analyzed_at))
            .collect();
        entries.sort_by_key(|(_, at)| *at);
        for (key, _) in entries.into_iter().take(state.max_records / 2) {
            state.records.remove(&key);
        }
    }
    state.records.insert(record.id.clone(), record.clone());

    Json(record)
}

#[derive(Deserialize)]
struct ResultsParams {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    100
}

async fn results_handler(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<ResultsParams>,
) -> Json<Vec<AnalysisRecord>> {
    let mut records: Vec<AnalysisRecord> =
        state.records.iter().map(|e| e.value().clone()).collect();
    records.sort_by(|a, b| b.analyzed_at.cmp(&a.analyzed_at));
    records.truncate(params.limit);
    Json(records)
}

pub async fn run_api(
    bind: &str,
    port: u16,
    engine: ScoringEngine,
    max_records: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(ApiState {
        engine,
        records: DashMap::new(),
        max_records,
    });
    let router = api_router(state);

    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("risk API listening on {}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}
