//! Provider discovery: asks an identity's profile document which authority
//! it has declared as authoritative for it.

mod http;

pub use http::HttpDiscovery;

use async_trait::async_trait;
use thiserror::Error;

/// Discovery errors. Every variant means the enclosing verification must
/// fail closed; none of them may be treated as "no preference declared,
/// accept anyway".
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("identity uri is not fetchable: {0}")]
    InvalidIdentity(String),
    #[error("http request failed: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("response size limit exceeded")]
    ResponseTooLarge,
    #[error("malformed profile document: {0}")]
    MalformedDocument(String),
    #[error("no preferred authority declared")]
    NoDeclaration,
}

/// Network-backed lookup of an identity's self-declared preferred issuing
/// authority. Assumed slow and fallible; callers bound it with a timeout.
#[async_trait]
pub trait ProviderDiscovery: Send + Sync + 'static {
    async fn discover_preferred_authority(
        &self,
        identity_uri: &str,
    ) -> Result<String, DiscoveryError>;
}
