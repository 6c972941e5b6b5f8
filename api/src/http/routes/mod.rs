use crate::http::AppState;

use axum::{Router, routing::get};

mod google_auth;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/GoogleAuth", get(google_auth::route))
        .with_state(app_state)
}
