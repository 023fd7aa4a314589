//! HTTP surface: `/update`, `/progress`, `/quit`.
//!
//! Handlers never touch graphics state directly. They read the dataset
//! cell, submit render jobs through the engine handle, and await the typed
//! result slot. The aggregator's blocking fan-out runs on the tokio
//! blocking pool.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::Notify;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use clanpanel_core::{Aggregator, BOSS_SLOTS, DatasetCell, Region, RegionData};
use clanpanel_render::{DispatchError, EngineHandle, PngError, RenderError, encode_png};

use crate::render_data::{StatusQuery, prepare_render_inputs};

#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    pub dataset: Arc<DatasetCell>,
    pub aggregator: Arc<Aggregator>,
    pub region: Region,
    /// Serializes `/update` handlers; readers are unaffected.
    pub refresh_guard: Arc<tokio::sync::Mutex<()>>,
    /// Signals graceful server shutdown after `/quit`.
    pub shutdown: Arc<Notify>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("malformed status payload: {0}")]
    MalformedRequest(#[from] serde_json::Error),

    #[error("no event data available for region {0}")]
    NoData(Region),

    #[error("render engine unavailable")]
    EngineGone,

    #[error("background refresh task failed")]
    RefreshFailed,

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Png(#[from] PngError),
}

impl From<DispatchError> for AppError {
    fn from(_: DispatchError) -> Self {
        AppError::EngineGone
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NoData(_) | AppError::EngineGone => StatusCode::SERVICE_UNAVAILABLE,
            AppError::RefreshFailed | AppError::Render(_) | AppError::Png(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        warn!(error = %self, "request failed");
        (status, self.to_string()).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/update", get(update))
        .route("/progress", get(progress))
        .route("/quit", get(quit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Pad or truncate a roster's boss ids to the five panel slots. An absent
/// or short roster leaves zero ids, which draw as the fallback icon.
pub fn slot_ids(data: Option<&RegionData>) -> [u64; BOSS_SLOTS] {
    let mut ids = [0u64; BOSS_SLOTS];
    if let Some(data) = data {
        for (slot, id) in ids.iter_mut().zip(data.roster.ids.iter()) {
            *slot = *id;
        }
    }
    ids
}

/// Exclusive dataset refresh followed by a panel recomposite.
async fn update(State(state): State<AppState>) -> Result<&'static str, AppError> {
    let _guard = state.refresh_guard.lock().await;

    let aggregator = Arc::clone(&state.aggregator);
    let dataset = tokio::task::spawn_blocking(move || aggregator.refresh())
        .await
        .map_err(|_| AppError::RefreshFailed)?;

    let ids = slot_ids(dataset.region(state.region));
    info!(region = %state.region, ?ids, "dataset refreshed");
    state.dataset.publish(dataset);

    let slot = state.engine.submit(move |engine| {
        engine.prepare(&ids);
        Ok(())
    })?;
    slot.await.map_err(|_| AppError::EngineGone)??;
    Ok("ok")
}

#[derive(Deserialize)]
struct ProgressParams {
    /// JSON-encoded [`StatusQuery`].
    data: String,
}

/// Render the panel for the caller's battle status and return it as PNG.
async fn progress(
    State(state): State<AppState>,
    Query(params): Query<ProgressParams>,
) -> Result<Response, AppError> {
    let status: StatusQuery = serde_json::from_str(&params.data)?;

    let dataset = state.dataset.read();
    let data = dataset
        .region(state.region)
        .filter(|d| !d.is_empty())
        .ok_or(AppError::NoData(state.region))?;
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let inputs =
        prepare_render_inputs(&status, data, now).map_err(|_| AppError::NoData(state.region))?;

    let slot = state.engine.submit(move |engine| {
        engine.refresh_background(inputs.phase)?;
        engine.refresh_total_progress(inputs.phase, &inputs.totals)?;
        engine.refresh_boss_progress(inputs.lap, &inputs.lap_flags, &inputs.bosses)
    })?;
    let snapshot = slot.await.map_err(|_| AppError::EngineGone)??;

    // PNG encoding stays on the handler task, off the engine thread.
    let bytes = encode_png(&snapshot)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}

/// Stop the engine thread and shut the server down gracefully.
async fn quit(State(state): State<AppState>) -> &'static str {
    info!("quit requested");
    if state.engine.post_quit().is_err() {
        warn!("engine already stopped");
    }
    state.shutdown.notify_one();
    "bye"
}

#[cfg(test)]
mod tests {
    use clanpanel_core::BossRoster;

    use super::*;

    #[test]
    fn slot_ids_pads_and_truncates() {
        assert_eq!(slot_ids(None), [0; 5]);

        let mut data = RegionData::default();
        data.roster = BossRoster {
            ids: vec![7, 8],
            names: vec!["a".into(), "b".into()],
            phase_hp: vec![],
        };
        assert_eq!(slot_ids(Some(&data)), [7, 8, 0, 0, 0]);

        data.roster.ids = (1..=9).collect();
        assert_eq!(slot_ids(Some(&data)), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn error_statuses() {
        let bad: serde_json::Error = serde_json::from_str::<StatusQuery>("{").unwrap_err();
        assert_eq!(
            AppError::MalformedRequest(bad).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NoData(Region::Jp).into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::EngineGone.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Render(RenderError::PanelNotPrepared)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
