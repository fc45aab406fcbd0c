use axum::{
    extract::{RawQuery, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::error::AppError;
use crate::services::host::{AuthorizeRequest, Handled, SessionCtx};
use crate::state::AppState;

pub async fn authorize(
    State(state): State<AppState>,
    session: SessionCtx,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let mut request = AuthorizeRequest::new(query.unwrap_or_default(), session);

    // A redirect outcome means the response is decided; nothing below may
    // touch the request again.
    match state.host.authenticate(&mut request) {
        Handled::Redirected { location } => return Ok(Redirect::to(&location).into_response()),
        Handled::Continue => {}
    }

    state.host.obtain_consent(&request).await;

    state.flow.authorize(request).await
}
