//! Session gate for direct item reads

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::AppState;

/// Reject requests unless the session has a signed-in identity.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let signed_in = state.controller.lock().await.phase().is_authenticated();
    if signed_in {
        Ok(next.run(request).await)
    } else {
        tracing::debug!(uri = %request.uri(), "rejecting unauthenticated read");
        Err(StatusCode::UNAUTHORIZED)
    }
}
