//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use inventory_core::config::IdentityConfig;
use inventory_core::{
    DecrementOutcome, FormEdit, InventoryController, InventoryError, InventoryItem, StoreError,
    UpsertOutcome, ViewPhase, ViewState,
};

use crate::AppState;

/// Error half of every handler result
pub type ApiError = (StatusCode, String);

/// Status code for an inventory error
pub fn status_for(err: &InventoryError) -> StatusCode {
    match err {
        InventoryError::NotSignedIn => StatusCode::UNAUTHORIZED,
        InventoryError::NotFound(_) => StatusCode::NOT_FOUND,
        InventoryError::InvalidName(_) => StatusCode::BAD_REQUEST,
        InventoryError::InvalidTransition { .. } => StatusCode::CONFLICT,
        InventoryError::QuantityOverflow(_) => StatusCode::CONFLICT,
        InventoryError::NotMounted => StatusCode::SERVICE_UNAVAILABLE,
        InventoryError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        InventoryError::Store(StoreError::PermissionDenied(_)) => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(err: InventoryError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::debug!("Request rejected: {}", err);
    }
    (status, err.to_string())
}

/// Current view of the session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub phase: ViewPhase,
    pub description: &'static str,
    pub view: ViewState,
}

impl SessionResponse {
    fn of(controller: &InventoryController) -> Self {
        let phase = controller.phase();
        Self {
            phase,
            description: phase.description(),
            view: controller.state().clone(),
        }
    }
}

/// Result of a store action plus the view after it
#[derive(Debug, Serialize)]
pub struct ActionResponse<T> {
    pub result: T,
    pub session: SessionResponse,
}

type SessionResult = Result<Json<SessionResponse>, ApiError>;

/// Get the session view
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let controller = state.controller.lock().await;
    Json(SessionResponse::of(&controller))
}

/// Sign in the configured account
pub async fn sign_in(State(state): State<Arc<AppState>>) -> SessionResult {
    let mut controller = state.controller.lock().await;
    controller.sign_in().map_err(api_error)?;
    Ok(Json(SessionResponse::of(&controller)))
}

/// Sign in as the account described in the body
pub async fn sign_in_as(
    State(state): State<Arc<AppState>>,
    Json(account): Json<IdentityConfig>,
) -> SessionResult {
    let mut controller = state.controller.lock().await;
    state
        .identity
        .sign_in_as(account.to_identity())
        .map_err(|e| api_error(e.into()))?;
    controller.sync_identity().map_err(api_error)?;
    Ok(Json(SessionResponse::of(&controller)))
}

pub async fn sign_out(State(state): State<Arc<AppState>>) -> SessionResult {
    let mut controller = state.controller.lock().await;
    controller.sign_out().map_err(api_error)?;
    Ok(Json(SessionResponse::of(&controller)))
}

/// Re-list the inventory
pub async fn refresh(State(state): State<Arc<AppState>>) -> SessionResult {
    let mut controller = state.controller.lock().await;
    controller.refresh().map_err(api_error)?;
    Ok(Json(SessionResponse::of(&controller)))
}

/// Request to change the search text
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

pub async fn set_search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> SessionResult {
    let mut controller = state.controller.lock().await;
    controller.set_search(&request.query).map_err(api_error)?;
    Ok(Json(SessionResponse::of(&controller)))
}

/// Open the add-item form
pub async fn open_add(State(state): State<Arc<AppState>>) -> SessionResult {
    let mut controller = state.controller.lock().await;
    controller.open_add().map_err(api_error)?;
    Ok(Json(SessionResponse::of(&controller)))
}

/// Open the detail view of an item
pub async fn view_item(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> SessionResult {
    let mut controller = state.controller.lock().await;
    controller.view_item(&name).map_err(api_error)?;
    Ok(Json(SessionResponse::of(&controller)))
}

pub async fn close_modal(State(state): State<Arc<AppState>>) -> SessionResult {
    let mut controller = state.controller.lock().await;
    controller.close_modal().map_err(api_error)?;
    Ok(Json(SessionResponse::of(&controller)))
}

/// Edit fields of the open add-item form
pub async fn update_form(
    State(state): State<Arc<AppState>>,
    Json(edit): Json<FormEdit>,
) -> SessionResult {
    let mut controller = state.controller.lock().await;
    controller.update_form(edit).map_err(api_error)?;
    Ok(Json(SessionResponse::of(&controller)))
}

/// Submit the add-item form
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActionResponse<UpsertOutcome>>, ApiError> {
    let mut controller = state.controller.lock().await;
    let result = controller.submit_add().map_err(api_error)?;
    Ok(Json(ActionResponse {
        result,
        session: SessionResponse::of(&controller),
    }))
}

/// Take one unit of an item
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ActionResponse<DecrementOutcome>>, ApiError> {
    let mut controller = state.controller.lock().await;
    let result = controller.remove_item(&name).map_err(api_error)?;
    Ok(Json(ActionResponse {
        result,
        session: SessionResponse::of(&controller),
    }))
}

/// List the collection straight from the store
pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    let store = state.controller.lock().await.store().clone();
    store.list_all().map(Json).map_err(api_error)
}

/// Get one item straight from the store
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<InventoryItem>, ApiError> {
    let store = state.controller.lock().await.store().clone();
    match store.get_by_name(&name).map_err(api_error)? {
        Some(item) => Ok(Json(item)),
        None => Err(api_error(InventoryError::NotFound(name))),
    }
}

/// Get system status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let controller = state.controller.lock().await;
    let phase = controller.phase();
    let items = controller
        .state()
        .session()
        .map(|s| s.inventory().len());

    Json(serde_json::json!({
        "phase": phase,
        "mounted": controller.is_mounted(),
        "collection": controller.store().collection(),
        "backend": state.config.store.backend,
        "items": items
    }))
}
