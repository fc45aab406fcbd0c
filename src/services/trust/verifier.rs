use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::services::discovery::{DiscoveryError, ProviderDiscovery};
use crate::services::trust::origin;

#[derive(Debug, Error)]
pub enum TrustError {
    #[error("malformed claims: {0}")]
    MalformedClaims(&'static str),

    #[error("subject claim is not a valid identity uri: {0}")]
    InvalidIdentityUri(String),

    #[error("provider discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// The identity declared a different preferred authority than the
    /// token's issuer. The token must be rejected.
    #[error("issuer {issuer} is not authorized for this identity (preferred: {preferred})")]
    IssuerMismatch { issuer: String, preferred: String },
}

/// Audience claim: a single value or a list, per the token format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            Audience::One(aud) => std::slice::from_ref(aud),
            Audience::Many(auds) => auds.as_slice(),
        };
        slice.iter().map(String::as_str)
    }
}

/// Decoded payload of a signed identity token. Produced externally by the
/// token layer; immutable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn is_empty(&self) -> bool {
        self.iss.is_none()
            && self.sub.is_none()
            && self.webid.is_none()
            && self.aud.is_none()
            && self.extra.is_empty()
    }
}

/// Decides whether a token's issuer may speak for the identity it names.
///
/// The fast path is a local origin/subdomain comparison; only when that
/// fails does the verifier ask the discovery collaborator for the
/// identity's own declaration. No result is cached: every call re-derives
/// trust from the presented claims.
pub struct TrustVerifier<D: ProviderDiscovery> {
    issuer: String,
    discovery: D,
}

impl<D: ProviderDiscovery> TrustVerifier<D> {
    /// `issuer` is this authority's own URI, used by the audience check.
    pub fn new(issuer: String, discovery: D) -> Self {
        Self { issuer, discovery }
    }

    /// Extract and verify the identity a token speaks for.
    ///
    /// Returns `Ok(None)` when there are no claims to verify, `Ok(Some)`
    /// with the identity URI once the issuer is confirmed to be authorized
    /// for it, and an error in every case where the token must be rejected.
    pub async fn verify_web_id(
        &self,
        claims: Option<&Claims>,
    ) -> Result<Option<String>, TrustError> {
        let Some(claims) = claims else {
            return Ok(None);
        };
        if claims.is_empty() {
            return Ok(None);
        }

        let issuer = claims
            .iss
            .as_deref()
            .ok_or(TrustError::MalformedClaims("missing iss claim"))?;

        let web_id = match (claims.webid.as_deref(), claims.sub.as_deref()) {
            // An explicit identity claim is a direct assertion; taken verbatim.
            (Some(webid), _) => webid.to_string(),
            (None, Some(sub)) => {
                Url::parse(sub).map_err(|_| TrustError::InvalidIdentityUri(sub.to_string()))?;
                sub.to_string()
            }
            (None, None) => {
                return Err(TrustError::MalformedClaims(
                    "neither webid nor sub claim present",
                ));
            }
        };

        if origin::domain_matches(issuer, &web_id) {
            return Ok(Some(web_id));
        }

        // The issuer does not serve the identity's own domain; the identity
        // itself must have declared it as preferred.
        debug!(web_id = %web_id, issuer = %issuer, "issuer origin differs, discovering preferred authority");
        let preferred = self.discovery.discover_preferred_authority(&web_id).await?;

        if preferred != issuer {
            return Err(TrustError::IssuerMismatch {
                issuer: issuer.to_string(),
                preferred,
            });
        }

        Ok(Some(web_id))
    }

    /// True when at least one audience entry names this authority (same
    /// origin or one-label subdomain). Tokens that fail this were never
    /// meant for us.
    pub fn matches_audience(&self, claims: &Claims) -> bool {
        match &claims.aud {
            Some(aud) => aud
                .iter()
                .any(|entry| origin::domain_matches(&self.issuer, entry)),
            None => false,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct StubDiscovery {
        preferred: Option<String>,
        calls: Arc<AtomicUsize>,
    }

    impl StubDiscovery {
        fn declaring(preferred: &str) -> Self {
            Self {
                preferred: Some(preferred.to_string()),
                calls: Arc::default(),
            }
        }

        fn failing() -> Self {
            Self::default()
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProviderDiscovery for StubDiscovery {
        async fn discover_preferred_authority(
            &self,
            _identity_uri: &str,
        ) -> Result<String, DiscoveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.preferred.clone().ok_or(DiscoveryError::NoDeclaration)
        }
    }

    fn verifier(discovery: StubDiscovery) -> TrustVerifier<StubDiscovery> {
        TrustVerifier::new("https://op.example".to_string(), discovery)
    }

    fn claims(iss: &str, webid: Option<&str>, sub: Option<&str>) -> Claims {
        Claims {
            iss: Some(iss.to_string()),
            webid: webid.map(str::to_string),
            sub: sub.map(str::to_string),
            ..Claims::default()
        }
    }

    #[tokio::test]
    async fn absent_claims_verify_to_none() {
        let v = verifier(StubDiscovery::failing());
        assert_eq!(v.verify_web_id(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_claims_verify_to_none() {
        let v = verifier(StubDiscovery::failing());
        assert_eq!(v.verify_web_id(Some(&Claims::default())).await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_issuer_is_malformed() {
        let v = verifier(StubDiscovery::failing());
        let claims = Claims {
            webid: Some("https://alice.example/#me".to_string()),
            ..Claims::default()
        };

        assert!(matches!(
            v.verify_web_id(Some(&claims)).await,
            Err(TrustError::MalformedClaims(_))
        ));
    }

    #[tokio::test]
    async fn missing_identity_and_subject_is_malformed() {
        let v = verifier(StubDiscovery::failing());
        let claims = claims("https://op.example", None, None);

        assert!(matches!(
            v.verify_web_id(Some(&claims)).await,
            Err(TrustError::MalformedClaims(_))
        ));
    }

    #[tokio::test]
    async fn non_uri_subject_is_invalid() {
        let v = verifier(StubDiscovery::failing());
        let claims = claims("https://op.example", None, Some("alice"));

        assert!(matches!(
            v.verify_web_id(Some(&claims)).await,
            Err(TrustError::InvalidIdentityUri(_))
        ));
    }

    #[tokio::test]
    async fn same_origin_succeeds_without_discovery() {
        let discovery = StubDiscovery::failing();
        let v = verifier(discovery.clone());
        let claims = claims(
            "https://op.example",
            Some("https://op.example/profile/card#me"),
            None,
        );

        let web_id = v.verify_web_id(Some(&claims)).await.unwrap();
        assert_eq!(web_id.as_deref(), Some("https://op.example/profile/card#me"));
        assert_eq!(discovery.call_count(), 0);
    }

    #[tokio::test]
    async fn one_label_subdomain_succeeds_without_discovery() {
        let discovery = StubDiscovery::failing();
        let v = verifier(discovery.clone());
        let claims = claims(
            "https://example.com",
            Some("https://alice.example.com/profile#me"),
            None,
        );

        assert!(v.verify_web_id(Some(&claims)).await.unwrap().is_some());
        assert_eq!(discovery.call_count(), 0);
    }

    #[tokio::test]
    async fn subject_uri_is_used_when_no_explicit_identity() {
        let discovery = StubDiscovery::failing();
        let v = verifier(discovery.clone());
        let claims = claims("https://op.example", None, Some("https://op.example/alice#me"));

        let web_id = v.verify_web_id(Some(&claims)).await.unwrap();
        assert_eq!(web_id.as_deref(), Some("https://op.example/alice#me"));
        assert_eq!(discovery.call_count(), 0);
    }

    #[tokio::test]
    async fn foreign_identity_with_matching_declaration_succeeds() {
        let discovery = StubDiscovery::declaring("https://op.example");
        let v = verifier(discovery.clone());
        let claims = claims(
            "https://op.example",
            Some("https://alice.provider.net/profile#me"),
            None,
        );

        let web_id = v.verify_web_id(Some(&claims)).await.unwrap();
        assert_eq!(
            web_id.as_deref(),
            Some("https://alice.provider.net/profile#me")
        );
        assert_eq!(discovery.call_count(), 1);
    }

    #[tokio::test]
    async fn foreign_identity_with_other_declaration_is_rejected() {
        let discovery = StubDiscovery::declaring("https://other-op.example");
        let v = verifier(discovery.clone());
        let claims = claims(
            "https://op.example",
            Some("https://alice.provider.net/profile#me"),
            None,
        );

        let err = v.verify_web_id(Some(&claims)).await.unwrap_err();
        assert!(matches!(err, TrustError::IssuerMismatch { .. }));
        assert_eq!(discovery.call_count(), 1);
    }

    #[tokio::test]
    async fn discovery_failure_fails_closed() {
        let discovery = StubDiscovery::failing();
        let v = verifier(discovery.clone());
        let claims = claims(
            "https://op.example",
            Some("https://alice.provider.net/profile#me"),
            None,
        );

        assert!(matches!(
            v.verify_web_id(Some(&claims)).await,
            Err(TrustError::Discovery(_))
        ));
        assert_eq!(discovery.call_count(), 1);
    }

    #[tokio::test]
    async fn explicit_identity_is_taken_verbatim() {
        // A URN has no host, so the direct match fails and the claim goes
        // to discovery untouched.
        let discovery = StubDiscovery::declaring("https://op.example");
        let v = verifier(discovery.clone());
        let claims = claims("https://op.example", Some("urn:example:alice"), None);

        let web_id = v.verify_web_id(Some(&claims)).await.unwrap();
        assert_eq!(web_id.as_deref(), Some("urn:example:alice"));
        assert_eq!(discovery.call_count(), 1);
    }

    #[tokio::test]
    async fn audience_accepts_single_matching_entry() {
        let v = verifier(StubDiscovery::failing());
        let claims = Claims {
            aud: Some(Audience::One("https://op.example".to_string())),
            ..Claims::default()
        };

        assert!(v.matches_audience(&claims));
    }

    #[tokio::test]
    async fn audience_accepts_subdomain_entry_in_list() {
        let v = verifier(StubDiscovery::failing());
        let claims = Claims {
            aud: Some(Audience::Many(vec![
                "https://unrelated.example".to_string(),
                "https://tenant.op.example".to_string(),
            ])),
            ..Claims::default()
        };

        assert!(v.matches_audience(&claims));
    }

    #[tokio::test]
    async fn audience_rejects_foreign_entries_or_absence() {
        let v = verifier(StubDiscovery::failing());

        let foreign = Claims {
            aud: Some(Audience::One("https://unrelated.example".to_string())),
            ..Claims::default()
        };
        assert!(!v.matches_audience(&foreign));
        assert!(!v.matches_audience(&Claims::default()));
    }
}
