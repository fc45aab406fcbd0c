use axum::{Router, routing::get};

use crate::api::handlers::{
    authorize::authorize,
    health::health,
    logout::logout,
    metadata::{jwks, openid_configuration},
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/authorize", get(authorize))
        .route("/logout", get(logout).post(logout))
        .route("/jwks", get(jwks))
        .route("/.well-known/openid-configuration", get(openid_configuration))
}
