//! HTTP surface: application state, error responses, and the view routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::config::get_config;
use crate::festival::{FestivalData, PerformanceIdentity};
use crate::likes::LikeStore;
use crate::time::{TimeOfDay, Weekday};
use crate::views::{
    FullScheduleView, LikedView, NowPlayingView, TimelineView, full_schedule_view, liked_view,
    now_playing_view, timeline_view,
};

/// Shared state: the loaded document (`None` until the startup load finishes,
/// forever if it fails) and the like store.
#[derive(Clone)]
pub struct AppState {
    festival: Arc<RwLock<Option<FestivalData>>>,
    likes: Arc<Mutex<LikeStore>>,
}

impl AppState {
    pub fn new(likes: LikeStore) -> Self {
        Self {
            festival: Arc::new(RwLock::new(None)),
            likes: Arc::new(Mutex::new(likes)),
        }
    }

    pub async fn install(&self, data: FestivalData) {
        *self.festival.write().await = Some(data);
    }

    async fn festival(&self) -> Result<FestivalData, AppError> {
        self.festival.read().await.clone().ok_or(AppError::Loading)
    }
}

/// One-shot startup load of the festival document. A failure is logged and
/// leaves the viewer answering "loading"; there is no retry.
pub async fn load_festival(state: AppState, path: String) {
    let data = match tokio::fs::read_to_string(&path).await {
        Ok(src) => FestivalData::from_json(&src),
        Err(err) => {
            error!(%path, %err, "failed to read festival document, staying in loading state");
            return;
        }
    };
    match data {
        Ok(data) => {
            info!(%path, festival = %data.festival_name, stages = data.stages.len(), "festival document loaded");
            state.install(data).await;
        }
        Err(err) => {
            error!(%path, %err, "festival document rejected, staying in loading state");
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub enum AppError {
    /// The festival document has not been loaded (yet).
    Loading,
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Loading => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError {
                    code: "LOADING",
                    message: "festival document is not loaded".to_string(),
                },
            ),
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    code: "BAD_REQUEST",
                    message,
                },
            ),
        };
        (status, Json(error)).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/festival", get(get_festival))
        .route("/views/now", get(get_now))
        .route("/views/liked", get(get_liked))
        .route("/views/schedule", get(get_schedule))
        .route("/views/timeline", get(get_timeline))
        .route("/likes", get(list_likes))
        .route("/likes/toggle", post(toggle_like))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub festival_loaded: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        festival_loaded: state.festival.read().await.is_some(),
    })
}

async fn get_festival(State(state): State<AppState>) -> Result<Json<FestivalData>, AppError> {
    Ok(Json(state.festival().await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct NowQuery {
    /// Override the current day, e.g. `FRIDAY`.
    pub day: Option<String>,
    /// Override the current wall-clock time, e.g. `19:30`.
    pub at: Option<String>,
}

impl NowQuery {
    fn resolve(&self) -> Result<(Weekday, u32), AppError> {
        let now = jiff::Zoned::now();
        let day = match &self.day {
            Some(day) => day
                .parse::<Weekday>()
                .map_err(|err| AppError::BadRequest(err.to_string()))?,
            None => Weekday::today(&now),
        };
        let minutes = match &self.at {
            Some(at) => TimeOfDay::parse(at)
                .map_err(|err| AppError::BadRequest(err.to_string()))?
                .minutes(),
            None => now.hour() as u32 * 60 + now.minute() as u32,
        };
        Ok((day, minutes))
    }
}

async fn get_now(
    State(state): State<AppState>,
    Query(query): Query<NowQuery>,
) -> Result<Json<NowPlayingView>, AppError> {
    let data = state.festival().await?;
    let (day, minutes) = query.resolve()?;
    let likes = state.likes.lock().await;
    Ok(Json(now_playing_view(
        &data,
        &likes,
        day,
        minutes,
        get_config().default_set_length_minutes,
    )))
}

async fn get_liked(State(state): State<AppState>) -> Result<Json<LikedView>, AppError> {
    let data = state.festival().await?;
    let likes = state.likes.lock().await;
    Ok(Json(liked_view(&data, &likes)))
}

async fn get_schedule(State(state): State<AppState>) -> Result<Json<FullScheduleView>, AppError> {
    let data = state.festival().await?;
    let likes = state.likes.lock().await;
    Ok(Json(full_schedule_view(&data, &likes, &get_config().week())))
}

#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    pub zoom: Option<f64>,
}

async fn get_timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<TimelineView>, AppError> {
    let data = state.festival().await?;
    let config = get_config();
    let zoom = match query.zoom {
        Some(factor) => config.zoom().with_factor(factor),
        None => config.zoom(),
    };
    let likes = state.likes.lock().await;
    Ok(Json(timeline_view(
        &data,
        &likes,
        &config.week(),
        config.default_set_length_minutes,
        zoom,
    )))
}

async fn list_likes(State(state): State<AppState>) -> Json<Vec<PerformanceIdentity>> {
    Json(state.likes.lock().await.snapshot())
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub id: PerformanceIdentity,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub id: PerformanceIdentity,
    pub liked: bool,
    pub total: usize,
}

async fn toggle_like(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> Json<ToggleResponse> {
    let mut likes = state.likes.lock().await;
    let liked = likes.toggle(&request.id);
    Json(ToggleResponse {
        id: request.id,
        liked,
        total: likes.len(),
    })
}
