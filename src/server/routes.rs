//! HTTP route handlers for the palette API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::color::analysis::{ColorblindReport, ContrastReport};
use crate::color::science::HexColor;
use crate::engine::{Notice, Orchestrator, Route, SessionView, Transition};
use crate::session::errors::{ActionError, ActionResult};
use crate::session::ids::SessionId;
use crate::session::model::SessionSummary;

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/status", get(status))
        .route("/api/state", get(current_state))
        .route("/api/prompt", post(send_prompt))
        .route("/api/actions/contrast", post(contrast_check))
        .route("/api/actions/colorblind", post(colorblind_check))
        .route("/api/actions/regenerate", post(regenerate))
        .route("/api/actions/select", post(select_color))
        .route("/api/actions/clear-selection", post(clear_selection))
        .route("/api/actions/single-color", post(single_color))
        .route("/api/actions/manual-edit", post(manual_edit))
        .route("/api/actions/pick/{index}", get(pick_color))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/new", post(start_new))
        .route("/api/sessions/restore", post(restore_latest))
        .route(
            "/api/sessions/{id}",
            get(load_session).delete(delete_session),
        )
        .route("/api/route/{id}", post(route_change))
        .with_state(state)
}

/// Outcome of an action plus the state it left behind.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse<T> {
    /// Action return value on success.
    pub result: Option<T>,
    /// Error message on failure.
    pub error: Option<String>,
    /// Notices raised by the action.
    pub notices: Vec<Notice>,
    /// State after the action.
    pub view: SessionView,
}

type ApiResult<T> = Result<Json<ActionResponse<T>>, (StatusCode, Json<ActionResponse<()>>)>;

const fn status_for(error: &ActionError) -> StatusCode {
    match error {
        ActionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ActionError::Service(_) => StatusCode::BAD_GATEWAY,
        ActionError::NotFound(_) => StatusCode::NOT_FOUND,
    }
}

fn respond<T>(orchestrator: &mut Orchestrator, result: ActionResult<T>) -> ApiResult<T> {
    let notices = orchestrator.take_notices();
    let view = orchestrator.snapshot();
    match result {
        Ok(value) => Ok(Json(ActionResponse {
            result: Some(value),
            error: None,
            notices,
            view,
        })),
        Err(e) => {
            tracing::warn!("Action failed: {e}");
            Err((
                status_for(&e),
                Json(ActionResponse {
                    result: None,
                    error: Some(e.to_string()),
                    notices,
                    view,
                }),
            ))
        }
    }
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "paletteflow",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// In-flight indicators.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Palette-level generation in flight.
    pub loading: bool,
    /// Single-color regeneration in flight.
    pub loading_single: bool,
}

/// Read the in-flight flags without waiting for the running action.
async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        loading: state.inflight.palette_busy(),
        loading_single: state.inflight.single_busy(),
    })
}

async fn current_state(State(state): State<Arc<AppState>>) -> ApiResult<()> {
    let mut orchestrator = state.orchestrator.lock().await;
    respond(&mut orchestrator, Ok(()))
}

/// Free-text prompt.
#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    /// What the user typed.
    pub text: String,
}

async fn send_prompt(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PromptRequest>,
) -> ApiResult<Route> {
    let mut orchestrator = state.orchestrator.lock().await;
    let result = orchestrator.send_prompt(&request.text).await;
    respond(&mut orchestrator, result)
}

async fn contrast_check(State(state): State<Arc<AppState>>) -> ApiResult<ContrastReport> {
    let mut orchestrator = state.orchestrator.lock().await;
    let result = orchestrator.contrast_check().await;
    respond(&mut orchestrator, result)
}

async fn colorblind_check(State(state): State<Arc<AppState>>) -> ApiResult<ColorblindReport> {
    let mut orchestrator = state.orchestrator.lock().await;
    let result = orchestrator.colorblind_check().await;
    respond(&mut orchestrator, result)
}

async fn regenerate(State(state): State<Arc<AppState>>) -> ApiResult<Transition> {
    let mut orchestrator = state.orchestrator.lock().await;
    let result = orchestrator.regenerate().await;
    respond(&mut orchestrator, result)
}

/// Swatch index in the active palette.
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    /// Zero-based index.
    pub index: usize,
}

async fn select_color(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectRequest>,
) -> ApiResult<HexColor> {
    let mut orchestrator = state.orchestrator.lock().await;
    let result = orchestrator.select_color_for_edit(request.index);
    respond(&mut orchestrator, result)
}

async fn clear_selection(State(state): State<Arc<AppState>>) -> ApiResult<()> {
    let mut orchestrator = state.orchestrator.lock().await;
    orchestrator.clear_single_color_mode();
    respond(&mut orchestrator, Ok(()))
}

async fn single_color(State(state): State<Arc<AppState>>) -> ApiResult<SessionId> {
    let mut orchestrator = state.orchestrator.lock().await;
    let result = orchestrator.regenerate_single_color().await;
    respond(&mut orchestrator, result)
}

/// Manual swatch replacement.
#[derive(Debug, Deserialize)]
pub struct ManualEditRequest {
    /// Zero-based index.
    pub index: usize,
    /// New color.
    pub color: HexColor,
}

async fn manual_edit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ManualEditRequest>,
) -> ApiResult<bool> {
    let mut orchestrator = state.orchestrator.lock().await;
    let applied = orchestrator.manual_edit(request.index, request.color).await;
    respond(&mut orchestrator, Ok(applied))
}

async fn pick_color(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> ApiResult<Option<HexColor>> {
    let mut orchestrator = state.orchestrator.lock().await;
    let color = orchestrator.pick_color(index).cloned();
    respond(&mut orchestrator, Ok(color))
}

async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummary>> {
    let orchestrator = state.orchestrator.lock().await;
    Json(orchestrator.session_summaries())
}

async fn start_new(State(state): State<Arc<AppState>>) -> ApiResult<()> {
    let mut orchestrator = state.orchestrator.lock().await;
    orchestrator.start_new().await;
    respond(&mut orchestrator, Ok(()))
}

async fn restore_latest(State(state): State<Arc<AppState>>) -> ApiResult<Option<SessionId>> {
    let mut orchestrator = state.orchestrator.lock().await;
    let restored = orchestrator.restore_latest_or_prompt().await;
    respond(&mut orchestrator, Ok(restored))
}

async fn load_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<SessionId> {
    let mut orchestrator = state.orchestrator.lock().await;
    let result = orchestrator.load_session(&id).await;
    respond(&mut orchestrator, result)
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<bool> {
    let mut orchestrator = state.orchestrator.lock().await;
    let removed = orchestrator.delete_session(&id).await;
    respond(&mut orchestrator, Ok(removed))
}

async fn route_change(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<SessionId> {
    let mut orchestrator = state.orchestrator.lock().await;
    let result = orchestrator.on_route_change(&id).await;
    respond(&mut orchestrator, result)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use super::*;
    use crate::service::fake::{ScriptedService, WARM, palette};
    use crate::session::config::PaletteConfig;
    use crate::store::records::MemoryRecordStore;

    fn app() -> (Arc<ScriptedService>, Router) {
        let service = Arc::new(ScriptedService::new());
        let orchestrator = Orchestrator::new(
            service.clone(),
            Arc::new(MemoryRecordStore::new()),
            &PaletteConfig::default(),
        );
        (service, create_router(AppState::new(orchestrator)))
    }

    async fn call<T: DeserializeOwned>(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, T) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (_, router) = app();
        let (status, body): (_, serde_json::Value) =
            call(&router, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "paletteflow");
    }

    #[tokio::test]
    async fn test_prompt_generates_palette() {
        let (service, router) = app();
        service.push_palette(&WARM, 1_700_000_000, "use sparingly");

        let (status, body): (_, ActionResponse<Route>) = call(
            &router,
            Method::POST,
            "/api/prompt",
            Some(serde_json::json!({ "text": "sunset" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.result, Some(Route::Generate));
        assert_eq!(body.view.palette, palette(&WARM));
        assert_eq!(body.view.advice, "use sparingly");
        assert!(body.view.route.starts_with("/feature/"));

        let (_, sessions): (_, Vec<SessionSummary>) =
            call(&router, Method::GET, "/api/sessions", None).await;
        assert_eq!(sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_validation_maps_to_unprocessable() {
        let (_, router) = app();
        let (status, body): (_, ActionResponse<()>) = call(
            &router,
            Method::POST,
            "/api/actions/select",
            Some(serde_json::json!({ "index": 9 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.error.is_some());
        assert_eq!(body.notices.len(), 1);
    }

    #[tokio::test]
    async fn test_service_failure_maps_to_bad_gateway() {
        let (service, router) = app();
        service.push_failure("down");
        let (status, body): (_, ActionResponse<()>) = call(
            &router,
            Method::POST,
            "/api/prompt",
            Some(serde_json::json!({ "text": "sunset" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.view.session_id.is_none());
        assert_eq!(body.view.transcript.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (_, router) = app();
        let (status, _): (_, ActionResponse<()>) =
            call(&router, Method::GET, "/api/sessions/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_manual_edit_and_pick() {
        let (_, router) = app();
        let (status, body): (_, ActionResponse<bool>) = call(
            &router,
            Method::POST,
            "/api/actions/manual-edit",
            Some(serde_json::json!({ "index": 0, "color": "#abc" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.result, Some(true));

        let (_, picked): (_, ActionResponse<Option<HexColor>>) =
            call(&router, Method::GET, "/api/actions/pick/0", None).await;
        assert_eq!(
            picked.result.flatten().map(String::from).as_deref(),
            Some("#AABBCC")
        );
    }

    #[tokio::test]
    async fn test_status_is_idle() {
        let (_, router) = app();
        let (_, body): (_, StatusResponse) =
            call(&router, Method::GET, "/api/status", None).await;
        assert!(!body.loading);
        assert!(!body.loading_single);
    }
}
