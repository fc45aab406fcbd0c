use async_trait::async_trait;
use axum::response::Response;
use tracing::debug;

use crate::error::AppError;
use crate::services::host::AuthorizeRequest;

/// The token-issuance collaborator. Once the bridge has resolved a
/// subject, the authorize handler hands the request here; the mounted
/// engine reads the subject and drives the rest of the protocol.
#[async_trait]
pub trait IssuanceFlow: Send + Sync + 'static {
    async fn authorize(&self, request: AuthorizeRequest) -> Result<Response, AppError>;
}

/// Default mount: no engine. Deployments replace this in `AppState`.
pub struct UnmountedFlow;

#[async_trait]
impl IssuanceFlow for UnmountedFlow {
    async fn authorize(&self, request: AuthorizeRequest) -> Result<Response, AppError> {
        debug!(subject = ?request.subject(), "authorization reached unmounted issuance flow");
        Err(AppError::FlowUnavailable)
    }
}
