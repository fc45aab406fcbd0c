use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::provider::keychain::KeyChain;

/// Storage namespaces under the configured root. Independent of each other;
/// each is created on demand before first use.
pub const NS_RP: &str = "rp";
pub const NS_USERS: &str = "users";
pub const NS_OP: &str = "op";

/// Where the authority's own durable record lives.
pub const PROVIDER_CONFIG_PATH: &str = "op/provider.json";

/// Registration of this authority's own relying-party client, kept warm so
/// consent/display metadata needs no extra round trip.
pub const LOCAL_RP_PATH: &str = "rp/local.json";

/// Durable record of an issuing authority. Written back on every startup;
/// the keychain, once present, is never regenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityConfig {
    pub issuer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<KeyChain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AuthorityConfig {
    /// The pre-keychain shape used when nothing has been persisted yet.
    pub fn minimal(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            keys: None,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpRegistration {
    pub client_id: String,
    pub client_name: String,
    pub redirect_uris: Vec<String>,
    pub post_logout_redirect_uris: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_omits_absent_fields() {
        let json = serde_json::to_value(AuthorityConfig::minimal("https://op.example")).unwrap();

        assert_eq!(json["issuer"], "https://op.example");
        assert!(json.get("keys").is_none());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn config_with_keys_round_trips() {
        let config = AuthorityConfig {
            issuer: "https://op.example".to_string(),
            keys: Some(KeyChain::generate().unwrap()),
            created_at: Some(Utc::now()),
        };

        let bytes = serde_json::to_vec(&config).unwrap();
        let loaded: AuthorityConfig = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(loaded, config);
    }
}
