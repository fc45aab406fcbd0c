//! Session extractor: the session middleware (outside this crate) verifies
//! the cookie and stores a `SessionCtx` in request extensions; handlers
//! receive it as an argument. A request without one is unauthenticated.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::services::host::SessionCtx;

impl<S> FromRequestParts<S> for SessionCtx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SessionCtx>()
            .cloned()
            .unwrap_or_default())
    }
}
