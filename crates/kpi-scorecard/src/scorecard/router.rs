use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;

use super::catalog::RuleBook;
use super::domain::Timeframe;
use super::editor::EditCommand;
use super::service::{ScorecardService, ScorecardServiceError};
use super::store::{SnapshotStore, StoreError};

/// Router exposing the snapshot blob, the editor, and the read-only score views.
pub fn scorecard_router<S, R>(service: Arc<ScorecardService<S, R>>) -> Router
where
    S: SnapshotStore + 'static,
    R: RuleBook + 'static,
{
    Router::new()
        .route(
            "/api/v1/kpi/snapshot",
            get(snapshot_handler::<S, R>).post(replace_snapshot_handler::<S, R>),
        )
        .route("/api/v1/kpi/edits", post(edit_handler::<S, R>))
        .route("/api/v1/kpi/ranking", get(ranking_handler::<S, R>))
        .route("/api/v1/kpi/radar", get(radar_handler::<S, R>))
        .route("/api/v1/kpi/trend", get(trend_handler::<S, R>))
        .route(
            "/api/v1/kpi/managers/:manager_id/scorecard",
            get(scorecard_handler::<S, R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TimeframeQuery {
    #[serde(default)]
    pub(crate) timeframe: Option<String>,
}

impl TimeframeQuery {
    fn parse(&self) -> Result<Timeframe, AppError> {
        match self.timeframe.as_deref() {
            None | Some("") => Ok(Timeframe::YearToDate),
            Some(raw) => Ok(raw.parse::<Timeframe>()?),
        }
    }
}

pub(crate) async fn snapshot_handler<S, R>(
    State(service): State<Arc<ScorecardService<S, R>>>,
) -> Response
where
    S: SnapshotStore + 'static,
    R: RuleBook + 'static,
{
    match service.raw_snapshot() {
        Ok(payload) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            payload,
        )
            .into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn replace_snapshot_handler<S, R>(
    State(service): State<Arc<ScorecardService<S, R>>>,
    body: String,
) -> Response
where
    S: SnapshotStore + 'static,
    R: RuleBook + 'static,
{
    match service.replace_raw(body) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "status": "success" }))).into_response(),
        Err(ScorecardServiceError::Store(StoreError::Malformed(message))) => {
            let payload = json!({
                "status": "error",
                "message": message,
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn edit_handler<S, R>(
    State(service): State<Arc<ScorecardService<S, R>>>,
    axum::Json(command): axum::Json<EditCommand>,
) -> Response
where
    S: SnapshotStore + 'static,
    R: RuleBook + 'static,
{
    match service.apply(&command) {
        Ok(_) => (StatusCode::OK, axum::Json(json!({ "status": "success" }))).into_response(),
        Err(ScorecardServiceError::Edit(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn ranking_handler<S, R>(
    State(service): State<Arc<ScorecardService<S, R>>>,
    Query(query): Query<TimeframeQuery>,
) -> Response
where
    S: SnapshotStore + 'static,
    R: RuleBook + 'static,
{
    let timeframe = match query.parse() {
        Ok(timeframe) => timeframe,
        Err(err) => return err.into_response(),
    };
    let ranking = service.with_view(|view| view.rank(timeframe));
    let payload = json!({
        "timeframe": timeframe,
        "timeframe_label": timeframe.label(),
        "ranking": ranking,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn radar_handler<S, R>(
    State(service): State<Arc<ScorecardService<S, R>>>,
    Query(query): Query<TimeframeQuery>,
) -> Response
where
    S: SnapshotStore + 'static,
    R: RuleBook + 'static,
{
    let timeframe = match query.parse() {
        Ok(timeframe) => timeframe,
        Err(err) => return err.into_response(),
    };
    let axes = service.with_view(|view| view.radar(timeframe));
    let payload = json!({
        "timeframe": timeframe,
        "axes": axes,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn trend_handler<S, R>(
    State(service): State<Arc<ScorecardService<S, R>>>,
) -> Response
where
    S: SnapshotStore + 'static,
    R: RuleBook + 'static,
{
    let series = service.with_view(|view| view.trends());
    (StatusCode::OK, axum::Json(json!({ "series": series }))).into_response()
}

pub(crate) async fn scorecard_handler<S, R>(
    State(service): State<Arc<ScorecardService<S, R>>>,
    Path(manager_id): Path<String>,
    Query(query): Query<TimeframeQuery>,
) -> Response
where
    S: SnapshotStore + 'static,
    R: RuleBook + 'static,
{
    let timeframe = match query.parse() {
        Ok(timeframe) => timeframe,
        Err(err) => return err.into_response(),
    };
    match service.with_view(|view| view.scorecard(&manager_id, timeframe)) {
        Some(scorecard) => (StatusCode::OK, axum::Json(scorecard)).into_response(),
        None => {
            let payload = json!({
                "error": format!("unknown manager '{manager_id}'"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

fn internal_error(error: ScorecardServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
