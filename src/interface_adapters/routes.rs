use crate::interface_adapters::handlers::issue_tokens;
use crate::interface_adapters::state::AppState;
use axum::{Router, routing::post};
use std::sync::Arc;

pub fn app(state: Arc<AppState>) -> Router {
    // Single-endpoint surface: the token exchange itself.
    Router::new().route("/", post(issue_tokens)).with_state(state)
}
