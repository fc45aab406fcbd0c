use axum::{
    extract::{RawQuery, State},
    response::Redirect,
};

use crate::error::AppError;
use crate::services::host::{AuthorizeRequest, SessionCtx};
use crate::state::AppState;

pub async fn logout(
    State(state): State<AppState>,
    session: SessionCtx,
    RawQuery(query): RawQuery,
) -> Result<Redirect, AppError> {
    let request = AuthorizeRequest::new(query.unwrap_or_default(), session);
    state.host.logout(&request).await;

    Ok(Redirect::to(state.host.post_logout_redirect_uri()))
}
