use std::sync::Arc;

use crate::api::flow::IssuanceFlow;
use crate::services::discovery::HttpDiscovery;
use crate::services::host::Host;
use crate::services::provider::AuthorityConfig;
use crate::services::trust::TrustVerifier;

#[derive(Clone)]
pub struct AppState {
    pub host: Arc<Host>,
    /// Used by the mounted issuance engine to check presented tokens.
    pub verifier: Arc<TrustVerifier<HttpDiscovery>>,
    pub provider: Arc<AuthorityConfig>,
    pub flow: Arc<dyn IssuanceFlow>,
}

impl AppState {
    pub fn new(
        host: Arc<Host>,
        verifier: Arc<TrustVerifier<HttpDiscovery>>,
        provider: Arc<AuthorityConfig>,
        flow: Arc<dyn IssuanceFlow>,
    ) -> Self {
        Self {
            host,
            verifier,
            provider,
            flow,
        }
    }
}
