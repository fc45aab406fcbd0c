use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::{Value, json};

use crate::services::provider::PublicJwk;
use crate::state::AppState;

#[derive(Serialize)]
pub struct JwksResponse {
    keys: Vec<PublicJwk>,
}

/// Public half of the authority's keychain, for token verifiers.
pub async fn jwks(State(state): State<AppState>) -> Json<JwksResponse> {
    let keys = state
        .provider
        .keys
        .as_ref()
        .map(|keychain| keychain.public_jwks())
        .unwrap_or_default();

    Json(JwksResponse { keys })
}

pub async fn openid_configuration(State(state): State<AppState>) -> Json<Value> {
    let base = state.provider.issuer.trim_end_matches('/');

    Json(json!({
        "issuer": state.provider.issuer,
        "authorization_endpoint": format!("{base}/authorize"),
        "end_session_endpoint": format!("{base}/logout"),
        "jwks_uri": format!("{base}/jwks"),
        "id_token_signing_alg_values_supported": ["EdDSA"],
        "subject_types_supported": ["public"],
    }))
}
