use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::services::{ServeDir, ServeFile};

use crate::api::{
    ApiAnalysisResponse, ApiFanoutRequest, ApiFanoutResponse, ApiPairRequest,
    ApiRegenerateRequest, ApiScoreResponse, ApiStatusResponse,
};
use pairmatch::{FanoutEvent, MatchEngine, MatchError};

#[derive(Clone)]
struct AppState {
    engine: MatchEngine,
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<FanoutEvent>>>>,
}

#[derive(serde::Deserialize)]
struct UserQuery {
    user_id: String,
}

#[derive(serde::Deserialize)]
struct StreamQuery {
    request_id: String,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub async fn serve(engine: MatchEngine, args: crate::ServeArgs) -> Result<(), String> {
    let state = AppState {
        engine,
        channels: Arc::new(Mutex::new(HashMap::new())),
    };

    let web_root = args.web_root;
    let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
    let static_service = ServeDir::new(web_root).not_found_service(ServeFile::new(index_path));

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/score", post(score_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/matches", get(matches_handler))
        .route("/api/matches/generate", post(fanout_handler))
        .route("/api/matches/stream", get(stream_handler))
        .route("/api/status", get(status_handler))
        .route("/api/regenerate", post(regenerate_handler))
        .nest_service("/", static_service)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| format!("failed to bind server: {}", err))?,
        app,
    )
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn score_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiPairRequest>,
) -> Result<Json<ApiScoreResponse>, (StatusCode, String)> {
    let score = state
        .engine
        .score_pair(&request.user_a, &request.user_b)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiScoreResponse::from_score(score)))
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiPairRequest>,
) -> Result<Json<ApiAnalysisResponse>, (StatusCode, String)> {
    let analysis = state
        .engine
        .analyze(&request.user_a, &request.user_b)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiAnalysisResponse::from_analysis(analysis)))
}

async fn matches_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<ApiAnalysisResponse>>, (StatusCode, String)> {
    let matches = state
        .engine
        .matches_for_user(&query.user_id)
        .await
        .map_err(error_response)?;
    Ok(Json(
        matches
            .into_iter()
            .map(ApiAnalysisResponse::from_analysis)
            .collect(),
    ))
}

async fn fanout_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiFanoutRequest>,
) -> Result<Json<ApiFanoutResponse>, (StatusCode, String)> {
    let request_id = request.request_id.unwrap_or_else(generate_request_id);
    let channel = get_or_create_channel(&state, &request_id).await;

    let report = state
        .engine
        .analyze_all_for_user(&request.user_id, None, Some(channel))
        .await
        .map_err(error_response)?;

    schedule_cleanup(state.channels.clone(), request_id.clone());
    Ok(Json(ApiFanoutResponse::from_report(report, request_id)))
}

async fn status_handler(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiStatusResponse>, (StatusCode, String)> {
    let status = state
        .engine
        .generation_status(&query.user_id)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiStatusResponse::from_status(status)))
}

async fn regenerate_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiRegenerateRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .engine
        .try_begin_regeneration(&request.user_id, Utc::now())
        .await
        .map_err(error_response)?;
    Ok(StatusCode::OK)
}

async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>, StatusCode>
{
    let sender = get_or_create_channel(&state, &query.request_id).await;
    let receiver = sender.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|event| match event {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data)))
        }
        Err(_) => None,
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(8))))
}

fn error_response(err: MatchError) -> (StatusCode, String) {
    let status = match &err {
        MatchError::MissingUser(_) | MatchError::MissingProfile(_) => StatusCode::NOT_FOUND,
        MatchError::Cooldown { .. } => StatusCode::TOO_MANY_REQUESTS,
        MatchError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        MatchError::Llm(_) => StatusCode::BAD_GATEWAY,
        MatchError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

async fn get_or_create_channel(
    state: &AppState,
    request_id: &str,
) -> broadcast::Sender<FanoutEvent> {
    let mut guard = state.channels.lock().await;
    if let Some(sender) = guard.get(request_id) {
        return sender.clone();
    }
    let (sender, _) = broadcast::channel(64);
    guard.insert(request_id.to_string(), sender.clone());
    sender
}

fn schedule_cleanup(
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<FanoutEvent>>>>,
    request_id: String,
) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        let mut guard = channels.lock().await;
        guard.remove(&request_id);
    });
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}
