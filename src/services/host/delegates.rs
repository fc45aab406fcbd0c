use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::services::host::request::AuthorizeRequest;
use crate::services::host::session::SessionCtx;

/// Delegate-layer errors. The bridge logs and absorbs these; they never
/// reach the request caller.
#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("delegate unavailable: {0}")]
    Unavailable(String),
    #[error("delegate failed: {0}")]
    Failed(String),
}

/// External consent flow. `skip_consent` asks the collaborator to grant
/// without explicit user confirmation.
#[async_trait]
pub trait ConsentHandler: Send + Sync + 'static {
    async fn handle(
        &self,
        request: &AuthorizeRequest,
        skip_consent: bool,
    ) -> Result<(), DelegateError>;
}

/// External logout flow, given the session being ended.
#[async_trait]
pub trait LogoutHandler: Send + Sync + 'static {
    async fn handle(&self, session: &SessionCtx) -> Result<(), DelegateError>;
}

/// Default consent collaborator: grants unconditionally.
pub struct AutoConsent;

#[async_trait]
impl ConsentHandler for AutoConsent {
    async fn handle(
        &self,
        _request: &AuthorizeRequest,
        skip_consent: bool,
    ) -> Result<(), DelegateError> {
        debug!(skip_consent, "consent auto-granted");
        Ok(())
    }
}

/// Default logout collaborator: nothing beyond the session teardown the
/// host middleware already performs.
pub struct NoopLogout;

#[async_trait]
impl LogoutHandler for NoopLogout {
    async fn handle(&self, _session: &SessionCtx) -> Result<(), DelegateError> {
        Ok(())
    }
}
