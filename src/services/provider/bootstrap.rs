use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::services::provider::authority::{
    AuthorityConfig, LOCAL_RP_PATH, NS_OP, NS_RP, NS_USERS, PROVIDER_CONFIG_PATH, RpRegistration,
};
use crate::services::provider::keychain::{KeyChain, KeychainError};
use crate::services::store::{ConfigStore, StoreError};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config store error: {0}")]
    Store(#[from] StoreError),

    #[error("malformed authority configuration: {0}")]
    MalformedConfig(String),

    #[error(transparent)]
    Keychain(#[from] KeychainError),

    #[error("authority configuration encode error: {0}")]
    Encode(String),
}

/// One-shot startup bootstrap for the issuing authority.
///
/// Idempotent: a keychain found in the store is reused as-is so the signing
/// identity survives restarts; only a missing keychain is generated. The
/// full configuration is written back on every run.
pub struct Bootstrapper<S: ConfigStore> {
    store: S,
    issuer: String,
    callback_uri: String,
    post_logout_redirect_uri: String,
}

impl<S: ConfigStore> Bootstrapper<S> {
    pub fn new(
        store: S,
        issuer: String,
        callback_uri: String,
        post_logout_redirect_uri: String,
    ) -> Self {
        Self {
            store,
            issuer,
            callback_uri,
            post_logout_redirect_uri,
        }
    }

    pub async fn bootstrap(&self) -> Result<AuthorityConfig, BootstrapError> {
        // Storage first: everything below assumes the namespaces exist.
        for namespace in [NS_RP, NS_USERS, NS_OP] {
            self.store.ensure_namespace(namespace).await?;
        }

        let config = self.load_or_minimal().await?;

        let config = match config.keys {
            Some(_) => {
                debug!(issuer = %config.issuer, "reusing persisted keychain");
                config
            }
            None => {
                info!(issuer = %config.issuer, "no keychain persisted, generating");
                AuthorityConfig {
                    keys: Some(KeyChain::generate()?),
                    created_at: Some(chrono::Utc::now()),
                    ..config
                }
            }
        };

        // Re-affirm durable state on every startup, generated or not.
        let bytes = serde_json::to_vec_pretty(&config)
            .map_err(|e| BootstrapError::Encode(e.to_string()))?;
        self.store.put(PROVIDER_CONFIG_PATH, &bytes).await?;

        info!(
            backend = self.store.backend_name(),
            issuer = %config.issuer,
            "authority configuration persisted"
        );

        // Best effort: the provider works without the warm registration, it
        // just pays an extra round trip on the first real request.
        if let Err(e) = self.warm_local_rp().await {
            warn!(error = %e, "relying-party warm-up failed");
        }

        Ok(config)
    }

    async fn load_or_minimal(&self) -> Result<AuthorityConfig, BootstrapError> {
        match self.store.get(PROVIDER_CONFIG_PATH).await? {
            Some(bytes) => {
                let config: AuthorityConfig = serde_json::from_slice(&bytes)
                    .map_err(|e| BootstrapError::MalformedConfig(e.to_string()))?;
                // A keychain that no longer decodes cannot sign anything;
                // refusing to start beats silently minting a new identity.
                if let Some(keys) = &config.keys {
                    keys.validate()?;
                }
                Ok(config)
            }
            None => Ok(AuthorityConfig::minimal(&self.issuer)),
        }
    }

    async fn warm_local_rp(&self) -> Result<(), BootstrapError> {
        if self.store.get(LOCAL_RP_PATH).await?.is_some() {
            debug!("local relying-party registration already present");
            return Ok(());
        }

        let client_name = Url::parse(&self.issuer)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.issuer.clone());

        let registration = RpRegistration {
            client_id: Uuid::new_v4().to_string(),
            client_name,
            redirect_uris: vec![self.callback_uri.clone()],
            post_logout_redirect_uris: vec![self.post_logout_redirect_uri.clone()],
        };

        let bytes = serde_json::to_vec_pretty(&registration)
            .map_err(|e| BootstrapError::Encode(e.to_string()))?;
        self.store.put(LOCAL_RP_PATH, &bytes).await?;

        info!(client_id = %registration.client_id, "local relying-party registration created");
        Ok(())
    }
}
