use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, LINK};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::services::discovery::{DiscoveryError, ProviderDiscovery};

// Standard relation used to announce an identity's issuer in a Link header.
const ISSUER_REL: &str = "http://openid.net/specs/connect/1.0/issuer";

// Body keys an identity profile may declare its issuer under.
const ISSUER_TERMS: &[&str] = &[
    "solid:oidcIssuer",
    "http://www.w3.org/ns/solid/terms#oidcIssuer",
    "issuer",
];

const MAX_RESPONSE_SIZE: usize = 64 * 1024;

/// HTTP implementation of [`ProviderDiscovery`]: fetches the identity's
/// profile document and reads its declared issuing authority from a Link
/// header or from the JSON body.
#[derive(Clone, Debug)]
pub struct HttpDiscovery {
    client: reqwest::Client,
    max_response_size: usize,
}

impl HttpDiscovery {
    pub fn new(timeout: Duration) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("webid-op/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DiscoveryError::Http(e.to_string()))?;

        Ok(Self {
            client,
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }
}

#[async_trait]
impl ProviderDiscovery for HttpDiscovery {
    async fn discover_preferred_authority(
        &self,
        identity_uri: &str,
    ) -> Result<String, DiscoveryError> {
        let url = Url::parse(identity_uri)
            .map_err(|_| DiscoveryError::InvalidIdentity(identity_uri.to_string()))?;

        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/ld+json, application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DiscoveryError::Timeout
                } else {
                    DiscoveryError::Http(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            return Err(DiscoveryError::Http(format!(
                "profile fetch returned {}",
                resp.status()
            )));
        }

        if let Some(issuer) = issuer_from_link_headers(resp.headers()) {
            debug!(issuer = %issuer, "preferred authority found in link header");
            return Ok(issuer);
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| DiscoveryError::Http(e.to_string()))?;
        if body.len() > self.max_response_size {
            return Err(DiscoveryError::ResponseTooLarge);
        }

        let doc: Value = serde_json::from_slice(&body)
            .map_err(|e| DiscoveryError::MalformedDocument(e.to_string()))?;

        issuer_from_document(&doc).ok_or(DiscoveryError::NoDeclaration)
    }
}

fn issuer_from_link_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(issuer_from_link_value)
}

// `<https://op.example>; rel="http://openid.net/specs/connect/1.0/issuer"`
// A single header value may carry several comma-separated links.
fn issuer_from_link_value(value: &str) -> Option<String> {
    for link in value.split(',') {
        let mut parts = link.split(';');
        let Some(target) = parts
            .next()
            .map(str::trim)
            .and_then(|t| t.strip_prefix('<'))
            .and_then(|t| t.strip_suffix('>'))
        else {
            continue;
        };

        let is_issuer = parts.any(|param| {
            let param = param.trim();
            param
                .strip_prefix("rel=")
                .map(|rel| {
                    rel.trim_matches('"')
                        .split_ascii_whitespace()
                        .any(|r| r == ISSUER_REL)
                })
                .unwrap_or(false)
        });

        if is_issuer {
            return Some(target.to_string());
        }
    }
    None
}

fn issuer_from_document(doc: &Value) -> Option<String> {
    if let Some(obj) = doc.as_object() {
        for term in ISSUER_TERMS {
            if let Some(issuer) = obj.get(*term).and_then(declared_value) {
                return Some(issuer);
            }
        }
        // JSON-LD profiles often keep the subject node inside @graph.
        if let Some(graph) = obj.get("@graph").and_then(Value::as_array) {
            return graph.iter().find_map(issuer_from_document);
        }
    }
    None
}

// An issuer declaration may be a plain string, a node reference
// (`{"@id": ...}`), or a list of either.
fn declared_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("@id").and_then(Value::as_str).map(str::to_string),
        Value::Array(items) => items.iter().find_map(declared_value),
        _ => None,
    }
}
