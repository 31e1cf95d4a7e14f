//! Hub API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<HubState>`; errors
//! are rendered as `{ "error": "..." }` with a status derived from
//! `HubError`.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};
use uuid::Uuid;

use super::clients::{ClientMap, Viewer};
use crate::auth::{
    self, AdminLoginForm, Credentials, LoginForm, PasswordStrength, Session, SessionManager,
    SignupForm,
};
use crate::builder::{step_types, BuilderStep, StepKind, StepType, WorkflowBuilder};
use crate::carousel::{Breakpoint, Carousel, CarouselHandle, CarouselSnapshot, CarouselTiming};
use crate::catalog::{FeaturedSlide, IntegrationDirectory, Workflow, WorkflowCatalog, WorkflowFilter};
use crate::catalog::integrations::Integration;
use crate::chat::{CannedResponder, ChatMessage, ChatSession, ResponseStrategy};
use crate::config::AppConfig;
use crate::requests::{
    CustomRequest, CustomRequestForm, ModificationForm, ModificationRequest, RequestDesk,
    RequestOverview,
};
use crate::roi::input::coerce_value;
use crate::roi::{RoiCalculator, RoiField, RoiInputs, RoiResults, RoiSummary};
use crate::simulator::{builtin_demos, Demo, DemoPlayerHandle, DemoShowcase, DemoSnapshot, StepPlayer};
use crate::storage::LocalStore;
use crate::types::{Complexity, HubError, RequestStatus, Role};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct HubState {
    pub name: String,
    pub catalog: WorkflowCatalog,
    pub integrations: IntegrationDirectory,
    pub demos: Vec<Demo>,
    pub featured: Vec<FeaturedSlide>,
    pub credentials: Credentials,
    pub sessions: RwLock<SessionManager>,
    pub requests: RwLock<RequestDesk>,
    pub viewers: RwLock<ClientMap<Viewer>>,
    pub chats: RwLock<ClientMap<Mutex<ChatSession>>>,
    pub chat_strategy: Arc<dyn ResponseStrategy>,
    pub typing_delay: Duration,
    pub visible_count: usize,
    pub carousel_timing: CarouselTiming,
    pub demo_step_interval: Duration,
}

impl HubState {
    /// Build the shared state. Per-visitor drivers are spawned lazily, so
    /// any handler that touches them must run inside a tokio runtime.
    pub fn new(config: &AppConfig, catalog: WorkflowCatalog, store: LocalStore) -> Result<Self> {
        config.validate()?;
        let featured = catalog.featured();
        let idle_ttl = config.hub.client_idle_ttl();
        Ok(Self {
            name: config.hub.name.clone(),
            integrations: IntegrationDirectory::builtin()?,
            demos: builtin_demos()?,
            featured,
            catalog,
            credentials: Credentials::from_config(&config.auth),
            sessions: RwLock::new(SessionManager::new(config.auth.session_ttl())),
            requests: RwLock::new(RequestDesk::new(store)),
            viewers: RwLock::new(ClientMap::new(idle_ttl, config.hub.max_clients)),
            chats: RwLock::new(ClientMap::new(idle_ttl, config.hub.max_clients)),
            chat_strategy: Arc::new(CannedResponder::new()),
            typing_delay: config.chat.typing_delay(),
            visible_count: config.carousel.visible_count,
            carousel_timing: config.carousel.timing()?,
            demo_step_interval: config.simulator.step_interval(),
        })
    }

    /// Start the drivers for a freshly opened page.
    fn spawn_viewer(&self) -> Result<Viewer> {
        let carousel = Carousel::new(self.featured.clone(), self.visible_count)?;
        let showcase = DemoShowcase::new(self.demos.clone(), self.demo_step_interval)?;
        Ok(Viewer::new(
            CarouselHandle::spawn(carousel, self.carousel_timing),
            DemoPlayerHandle::spawn(showcase),
        ))
    }

    /// The page state for `id`, or a new page if the id is absent or
    /// unknown.
    pub async fn viewer(&self, id: Option<Uuid>) -> Result<(Uuid, Arc<Viewer>)> {
        self.viewers
            .write()
            .await
            .get_or_insert_with(id, || self.spawn_viewer())
    }

    /// Drop idle pages and chats. Returns `(viewers, chats)` removed.
    pub async fn purge_idle_clients(&self) -> (usize, usize) {
        let viewers = self.viewers.write().await.purge_idle();
        let chats = self.chats.write().await.purge_idle();
        (viewers, chats)
    }

    /// Stop every page driver and forget all chats.
    pub async fn shutdown_clients(&self) {
        let viewers = self.viewers.write().await.drain();
        for viewer in viewers {
            if let Ok(viewer) = Arc::try_unwrap(viewer) {
                viewer.shutdown().await;
            }
        }
        self.chats.write().await.drain();
    }

    async fn session(&self, headers: &HeaderMap) -> Result<Session, HubError> {
        let token = bearer_token(headers)?;
        let sessions = self.sessions.read().await;
        sessions.validate(token).cloned()
    }

    async fn admin_session(&self, headers: &HeaderMap) -> Result<Session, HubError> {
        let token = bearer_token(headers)?;
        let sessions = self.sessions.read().await;
        sessions.require_role(token, Role::Admin).cloned()
    }
}

pub type AppState = Arc<HubState>;

fn bearer_token(headers: &HeaderMap) -> Result<&str, HubError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| HubError::Unauthorized("Missing bearer token".into()))
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Handler error: any `anyhow` error, rendered by its `HubError` cause.
pub struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

pub fn status_for(err: &HubError) -> StatusCode {
    match err {
        HubError::EmptyCarousel
        | HubError::InvalidVisibleCount(_)
        | HubError::SlideOutOfRange { .. }
        | HubError::Validation(_) => StatusCode::BAD_REQUEST,
        HubError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        HubError::NotFound { .. } => StatusCode::NOT_FOUND,
        HubError::Config(_) | HubError::Storage(_) | HubError::Stopped(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0.downcast_ref::<HubError>() {
            Some(hub) => (status_for(hub), hub.to_string()),
            None => {
                error!(error = %self.0, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: String,
    pub workflows: usize,
}

#[derive(Debug, Serialize)]
pub struct FacetsResponse {
    pub categories: Vec<String>,
    pub complexities: Vec<Complexity>,
}

#[derive(Debug, Serialize)]
pub struct WorkflowListResponse {
    pub workflows: Vec<Workflow>,
    pub total: usize,
    pub active_filters: usize,
}

#[derive(Debug, Deserialize)]
pub struct IntegrationQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct IntegrationListResponse {
    pub integrations: Vec<Integration>,
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompatibilityRequest {
    #[serde(default)]
    pub ids: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct CompatibilityResponse {
    pub selected: usize,
    pub score: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiResponse {
    pub inputs: RoiInputs,
    pub results: RoiResults,
    pub summary: RoiSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoResponse {
    pub demo: Demo,
    pub estimated_total_secs: u64,
    /// Playback tick for the step player.
    pub step_interval_ms: u64,
}

/// Client-held page id, echoed back on every per-page call.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerQuery {
    #[serde(default)]
    pub viewer_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CarouselResponse {
    #[serde(rename = "viewerId")]
    pub viewer_id: Uuid,
    pub state: CarouselSnapshot,
    pub slides: Vec<FeaturedSlide>,
}

#[derive(Debug, Deserialize)]
pub struct ViewportRequest {
    pub width: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoPlayerResponse {
    pub viewer_id: Uuid,
    pub state: DemoSnapshot,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedRequest {
    pub speed_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderResponse {
    pub viewer_id: Uuid,
    pub builder: WorkflowBuilder,
    pub step_types: Vec<StepType>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddStepRequest {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStepResponse {
    pub viewer_id: Uuid,
    pub step: BuilderStep,
    pub builder: WorkflowBuilder,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<Uuid>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Absent when nothing was said yet; no transcript is kept then.
    pub session_id: Option<Uuid>,
    pub reply: Option<ChatMessage>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordCheck {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    /// Omit to advance one step along the admin cycle.
    #[serde(default)]
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: state.name.clone(),
        workflows: state.catalog.len(),
    })
}

/// GET /api/workflows
pub async fn list_workflows(
    State(state): State<AppState>,
    Query(filter): Query<WorkflowFilter>,
) -> Json<WorkflowListResponse> {
    let workflows: Vec<Workflow> = state.catalog.search(&filter).into_iter().cloned().collect();
    Json(WorkflowListResponse {
        total: workflows.len(),
        active_filters: filter.active_filter_count(),
        workflows,
    })
}

/// GET /api/workflows/facets
pub async fn workflow_facets(State(state): State<AppState>) -> Json<FacetsResponse> {
    Json(FacetsResponse {
        categories: state.catalog.categories(),
        complexities: state.catalog.complexities(),
    })
}

/// GET /api/workflows/:id
pub async fn get_workflow(State(state): State<AppState>, Path(id): Path<u32>) -> ApiResult<Workflow> {
    Ok(Json(state.catalog.get(id)?.clone()))
}

/// GET /api/integrations
pub async fn list_integrations(
    State(state): State<AppState>,
    Query(q): Query<IntegrationQuery>,
) -> Json<IntegrationListResponse> {
    Json(IntegrationListResponse {
        integrations: state
            .integrations
            .filter(&q.search, &q.category)
            .into_iter()
            .cloned()
            .collect(),
        categories: state.integrations.categories(),
    })
}

/// POST /api/integrations/compatibility
pub async fn integration_compatibility(
    State(state): State<AppState>,
    Json(mut req): Json<CompatibilityRequest>,
) -> Json<CompatibilityResponse> {
    req.ids.sort_unstable();
    req.ids.dedup();
    Json(CompatibilityResponse {
        selected: req.ids.len(),
        score: state.integrations.compatibility_score(&req.ids),
    })
}

/// GET /api/demos
pub async fn list_demos(State(state): State<AppState>) -> ApiResult<Vec<DemoResponse>> {
    let mut out = Vec::with_capacity(state.demos.len());
    for demo in &state.demos {
        let player = StepPlayer::new(demo.steps.clone(), state.demo_step_interval)?;
        out.push(DemoResponse {
            demo: demo.clone(),
            estimated_total_secs: player.estimated_total_secs(),
            step_interval_ms: player.speed().as_millis() as u64,
        });
    }
    Ok(Json(out))
}

// ---------------------------------------------------------------------------
// ROI
// ---------------------------------------------------------------------------

/// POST /api/roi
///
/// Accepts any subset of the five fields as numbers or raw strings;
/// missing fields keep their defaults.
pub async fn compute_roi(Json(body): Json<HashMap<String, Value>>) -> Json<RoiResponse> {
    let mut inputs = RoiInputs::default();
    for (key, value) in &body {
        if let Ok(field) = RoiField::from_str(key) {
            inputs.set(field, coerce_value(value));
        }
    }
    let calc = RoiCalculator::new(inputs);
    Json(RoiResponse {
        inputs: *calc.inputs(),
        results: *calc.results(),
        summary: RoiSummary::from_results(calc.results()),
    })
}

// ---------------------------------------------------------------------------
// Carousel
// ---------------------------------------------------------------------------

fn carousel_response(
    state: &HubState,
    viewer_id: Uuid,
    snapshot: CarouselSnapshot,
) -> Json<CarouselResponse> {
    Json(CarouselResponse {
        viewer_id,
        state: snapshot,
        slides: state.featured.clone(),
    })
}

/// GET /api/carousel
pub async fn get_carousel(
    State(state): State<AppState>,
    Query(q): Query<ViewerQuery>,
) -> ApiResult<CarouselResponse> {
    let (id, viewer) = state.viewer(q.viewer_id).await?;
    let snapshot = viewer.carousel.snapshot();
    Ok(carousel_response(&state, id, snapshot))
}

/// POST /api/carousel/next
pub async fn carousel_next(
    State(state): State<AppState>,
    Query(q): Query<ViewerQuery>,
) -> ApiResult<CarouselResponse> {
    let (id, viewer) = state.viewer(q.viewer_id).await?;
    let snapshot = viewer.carousel.next().await?;
    Ok(carousel_response(&state, id, snapshot))
}

/// POST /api/carousel/prev
pub async fn carousel_prev(
    State(state): State<AppState>,
    Query(q): Query<ViewerQuery>,
) -> ApiResult<CarouselResponse> {
    let (id, viewer) = state.viewer(q.viewer_id).await?;
    let snapshot = viewer.carousel.prev().await?;
    Ok(carousel_response(&state, id, snapshot))
}

/// POST /api/carousel/goto/:slide
pub async fn carousel_go_to(
    State(state): State<AppState>,
    Path(slide): Path<usize>,
    Query(q): Query<ViewerQuery>,
) -> ApiResult<CarouselResponse> {
    let (id, viewer) = state.viewer(q.viewer_id).await?;
    let snapshot = viewer.carousel.go_to(slide).await?;
    Ok(carousel_response(&state, id, snapshot))
}

/// POST /api/carousel/viewport
pub async fn carousel_viewport(
    State(state): State<AppState>,
    Query(q): Query<ViewerQuery>,
    Json(req): Json<ViewportRequest>,
) -> ApiResult<CarouselResponse> {
    let (id, viewer) = state.viewer(q.viewer_id).await?;
    let visible = Breakpoint::from_width(req.width).visible_count();
    let snapshot = viewer.carousel.set_visible_count(visible).await?;
    Ok(carousel_response(&state, id, snapshot))
}

// ---------------------------------------------------------------------------
// Demo player
// ---------------------------------------------------------------------------

/// GET /api/demo-player
pub async fn get_demo_player(
    State(state): State<AppState>,
    Query(q): Query<ViewerQuery>,
) -> ApiResult<DemoPlayerResponse> {
    let (viewer_id, viewer) = state.viewer(q.viewer_id).await?;
    Ok(Json(DemoPlayerResponse {
        viewer_id,
        state: viewer.demos.snapshot(),
    }))
}

/// POST /api/demos/:index/play
pub async fn demo_play(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Query(q): Query<ViewerQuery>,
) -> ApiResult<DemoPlayerResponse> {
    let (viewer_id, viewer) = state.viewer(q.viewer_id).await?;
    let snapshot = viewer.demos.play(index).await?;
    Ok(Json(DemoPlayerResponse {
        viewer_id,
        state: snapshot,
    }))
}

/// POST /api/demos/:index/pause
pub async fn demo_pause(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Query(q): Query<ViewerQuery>,
) -> ApiResult<DemoPlayerResponse> {
    let (viewer_id, viewer) = state.viewer(q.viewer_id).await?;
    let snapshot = viewer.demos.pause(index).await?;
    Ok(Json(DemoPlayerResponse {
        viewer_id,
        state: snapshot,
    }))
}

/// POST /api/demos/:index/reset
pub async fn demo_reset(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Query(q): Query<ViewerQuery>,
) -> ApiResult<DemoPlayerResponse> {
    let (viewer_id, viewer) = state.viewer(q.viewer_id).await?;
    let snapshot = viewer.demos.reset(index).await?;
    Ok(Json(DemoPlayerResponse {
        viewer_id,
        state: snapshot,
    }))
}

/// POST /api/demo-player/speed
pub async fn demo_speed(
    State(state): State<AppState>,
    Query(q): Query<ViewerQuery>,
    Json(req): Json<SpeedRequest>,
) -> ApiResult<DemoPlayerResponse> {
    if req.speed_ms == 0 {
        return Err(HubError::Validation("Speed must be greater than zero".into()).into());
    }
    let (viewer_id, viewer) = state.viewer(q.viewer_id).await?;
    let snapshot = viewer.demos.set_speed(Duration::from_millis(req.speed_ms)).await?;
    Ok(Json(DemoPlayerResponse {
        viewer_id,
        state: snapshot,
    }))
}

// ---------------------------------------------------------------------------
// Workflow builder
// ---------------------------------------------------------------------------

fn builder_response(viewer_id: Uuid, builder: &WorkflowBuilder) -> Json<BuilderResponse> {
    Json(BuilderResponse {
        viewer_id,
        builder: builder.clone(),
        step_types: step_types(),
    })
}

/// GET /api/builder
pub async fn get_builder(
    State(state): State<AppState>,
    Query(q): Query<ViewerQuery>,
) -> ApiResult<BuilderResponse> {
    let (viewer_id, viewer) = state.viewer(q.viewer_id).await?;
    let builder = viewer.builder.lock().await;
    Ok(builder_response(viewer_id, &builder))
}

/// PUT /api/builder/name
pub async fn rename_builder(
    State(state): State<AppState>,
    Query(q): Query<ViewerQuery>,
    Json(req): Json<RenameRequest>,
) -> ApiResult<BuilderResponse> {
    let (viewer_id, viewer) = state.viewer(q.viewer_id).await?;
    let mut builder = viewer.builder.lock().await;
    builder.rename(req.name);
    Ok(builder_response(viewer_id, &builder))
}

/// POST /api/builder/steps
pub async fn add_builder_step(
    State(state): State<AppState>,
    Query(q): Query<ViewerQuery>,
    Json(req): Json<AddStepRequest>,
) -> std::result::Result<(StatusCode, Json<AddStepResponse>), ApiError> {
    let kind = StepKind::from_str(&req.kind)?;
    let (viewer_id, viewer) = state.viewer(q.viewer_id).await?;
    let mut builder = viewer.builder.lock().await;
    let step = builder.add_step(kind).clone();
    Ok((
        StatusCode::CREATED,
        Json(AddStepResponse {
            viewer_id,
            step,
            builder: builder.clone(),
        }),
    ))
}

/// DELETE /api/builder/steps/:id
pub async fn remove_builder_step(
    State(state): State<AppState>,
    Path(step_id): Path<u64>,
    Query(q): Query<ViewerQuery>,
) -> ApiResult<BuilderResponse> {
    let (viewer_id, viewer) = state.viewer(q.viewer_id).await?;
    let mut builder = viewer.builder.lock().await;
    builder.remove_step(step_id)?;
    Ok(builder_response(viewer_id, &builder))
}

/// POST /api/builder/save
pub async fn save_builder(
    State(state): State<AppState>,
    Query(q): Query<ViewerQuery>,
) -> ApiResult<Value> {
    let (viewer_id, viewer) = state.viewer(q.viewer_id).await?;
    let message = viewer.builder.lock().await.save();
    Ok(Json(json!({ "viewerId": viewer_id, "message": message })))
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// POST /api/chat
///
/// A transcript is only kept once the visitor has said something; unknown
/// session ids start a new transcript under a fresh id.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    let existing = match req.session_id {
        Some(id) => state.chats.write().await.get(id).map(|s| (id, s)),
        None => None,
    };
    let (session_id, session) = match existing {
        Some(found) => found,
        None if req.message.trim().is_empty() => {
            let fresh = ChatSession::new(state.chat_strategy.clone(), state.typing_delay);
            return Ok(Json(ChatResponse {
                session_id: None,
                reply: None,
                messages: fresh.messages().to_vec(),
            }));
        }
        None => state.chats.write().await.insert(Mutex::new(ChatSession::new(
            state.chat_strategy.clone(),
            state.typing_delay,
        ))),
    };

    let mut session = session.lock().await;
    let reply = session.send(&req.message).await?;
    Ok(Json(ChatResponse {
        session_id: Some(session_id),
        reply,
        messages: session.messages().to_vec(),
    }))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, Json(form): Json<LoginForm>) -> ApiResult<Session> {
    let user = state.credentials.login_user(&form)?;
    Ok(Json(state.sessions.write().await.issue(user)))
}

/// POST /api/admin/login
pub async fn admin_login(
    State(state): State<AppState>,
    Json(form): Json<AdminLoginForm>,
) -> ApiResult<Session> {
    let admin = state.credentials.login_admin(&form)?;
    Ok(Json(state.sessions.write().await.issue(admin)))
}

/// POST /api/auth/signup
pub async fn signup(State(state): State<AppState>, Json(form): Json<SignupForm>) -> ApiResult<Session> {
    let user = auth::register(&form)?;
    Ok(Json(state.sessions.write().await.issue(user)))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Value> {
    let token = bearer_token(&headers)?;
    let revoked = state.sessions.write().await.revoke(token);
    Ok(Json(json!({ "loggedOut": revoked })))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Session> {
    Ok(Json(state.session(&headers).await?))
}

/// POST /api/auth/password-strength
pub async fn password_strength(Json(req): Json<PasswordCheck>) -> Json<PasswordStrength> {
    Json(auth::password_strength(&req.password))
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// POST /api/requests/custom
pub async fn submit_custom_request(
    State(state): State<AppState>,
    Json(form): Json<CustomRequestForm>,
) -> std::result::Result<(StatusCode, Json<CustomRequest>), ApiError> {
    let request = state.requests.write().await.submit_custom(form)?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationSubmission {
    pub workflow_id: u32,
    #[serde(flatten)]
    pub form: ModificationForm,
}

/// POST /api/requests/modification
pub async fn submit_modification_request(
    State(state): State<AppState>,
    Json(sub): Json<ModificationSubmission>,
) -> std::result::Result<(StatusCode, Json<ModificationRequest>), ApiError> {
    let request = state
        .requests
        .write()
        .await
        .submit_modification(&state.catalog, sub.workflow_id, sub.form)?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/admin/requests
pub async fn admin_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<RequestOverview> {
    state.admin_session(&headers).await?;
    Ok(Json(state.requests.read().await.overview()?))
}

/// PUT /api/admin/requests/:id/status
pub async fn update_request_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<Value> {
    let admin = state.admin_session(&headers).await?;
    let status = update
        .status
        .as_deref()
        .map(RequestStatus::from_str)
        .transpose()?;
    let new_status = state.requests.write().await.update_status(id, status)?;
    info!(%id, admin = %admin.user.name, status = %new_status, "Admin updated request");
    Ok(Json(json!({
        "id": id,
        "status": new_status,
        "label": new_status.to_string(),
    })))
}

/// DELETE /api/admin/requests/:id
pub async fn delete_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let admin = state.admin_session(&headers).await?;
    state.requests.write().await.delete(id)?;
    info!(%id, admin = %admin.user.name, "Admin deleted request");
    Ok(Json(json!({ "id": id, "deleted": true })))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&HubError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&HubError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&HubError::not_found("Workflow", 9)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&HubError::SlideOutOfRange { slide: 9, len: 4 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&HubError::Stopped("Carousel")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_state_rejects_zero_timings() {
        let mut config = AppConfig::default();
        config.carousel.autoplay_interval_ms = 0;
        let catalog = WorkflowCatalog::builtin().unwrap();
        let err = HubState::new(&config, catalog, LocalStore::in_memory())
            .err()
            .unwrap();
        assert!(matches!(err.downcast_ref::<HubError>(), Some(HubError::Config(_))));
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc");
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_err());
    }

    #[tokio::test]
    async fn test_compute_roi_handler() {
        let mut body = HashMap::new();
        body.insert("hoursPerWeek".to_string(), json!("10"));
        body.insert("hourlyRate".to_string(), json!(25));
        let Json(resp) = compute_roi(Json(body)).await;
        assert!((resp.results.weekly_savings - 1250.0).abs() < 1e-9);
        assert_eq!(resp.summary.weekly_time_saved, "50.0 hours");
    }

    #[tokio::test]
    async fn test_compute_roi_lenient_garbage() {
        let mut body = HashMap::new();
        body.insert("numberOfEmployees".to_string(), json!("lots"));
        body.insert("unknown".to_string(), json!(3));
        let Json(resp) = compute_roi(Json(body)).await;
        assert_eq!(resp.inputs.number_of_employees, 0.0);
        assert_eq!(resp.summary.payback_period, "∞ weeks");
    }

    #[tokio::test]
    async fn test_password_strength_handler() {
        let Json(s) = password_strength(Json(PasswordCheck {
            password: "Abcdefg1".into(),
        }))
        .await;
        assert_eq!(s.score, 4);
    }
}
