use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeychainError {
    #[error("entropy source failed: {0}")]
    Rng(String),
    #[error("malformed keychain material: {0}")]
    Malformed(String),
}

/// An Ed25519 signing key in JWK form, private part included. `kid` is the
/// RFC 7638 thumbprint of the public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub d: String,
    pub kid: String,
    pub alg: String,
    #[serde(rename = "use")]
    pub key_use: String,
}

impl SigningJwk {
    fn from_secret(secret: [u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&secret);
        let x = URL_SAFE_NO_PAD.encode(signing_key.verifying_key().as_bytes());

        Self {
            kid: thumbprint(&x),
            kty: "OKP".to_string(),
            crv: "Ed25519".to_string(),
            d: URL_SAFE_NO_PAD.encode(secret),
            x,
            alg: "EdDSA".to_string(),
            key_use: "sig".to_string(),
        }
    }

    /// Rebuild the signing key from the stored material. Fails when the
    /// private part does not decode or does not produce the stored public
    /// part; such a key must never be used to sign.
    pub fn signing_key(&self) -> Result<ed25519_dalek::SigningKey, KeychainError> {
        let d = URL_SAFE_NO_PAD
            .decode(&self.d)
            .map_err(|e| KeychainError::Malformed(format!("d: {e}")))?;
        let secret: [u8; 32] = d
            .try_into()
            .map_err(|_| KeychainError::Malformed("d: wrong length".to_string()))?;

        let signing_key = ed25519_dalek::SigningKey::from_bytes(&secret);
        let x = URL_SAFE_NO_PAD.encode(signing_key.verifying_key().as_bytes());
        if x != self.x {
            return Err(KeychainError::Malformed(
                "public key does not match private key".to_string(),
            ));
        }

        Ok(signing_key)
    }

    pub fn to_public(&self) -> PublicJwk {
        PublicJwk {
            kty: self.kty.clone(),
            crv: self.crv.clone(),
            x: self.x.clone(),
            kid: self.kid.clone(),
            alg: self.alg.clone(),
            key_use: self.key_use.clone(),
        }
    }
}

/// The publishable half of a [`SigningJwk`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub kid: String,
    pub alg: String,
    #[serde(rename = "use")]
    pub key_use: String,
}

/// The authority's signing key set. Generated once, then reused verbatim
/// across restarts so issued tokens stay verifiable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChain {
    pub keys: Vec<SigningJwk>,
}

impl KeyChain {
    pub fn generate() -> Result<Self, KeychainError> {
        let mut secret = [0u8; 32];
        getrandom::fill(&mut secret).map_err(|e| KeychainError::Rng(e.to_string()))?;

        Ok(Self {
            keys: vec![SigningJwk::from_secret(secret)],
        })
    }

    pub fn signing_jwk(&self) -> Option<&SigningJwk> {
        self.keys.first()
    }

    /// Shape-check every stored key without using any of them.
    pub fn validate(&self) -> Result<(), KeychainError> {
        if self.keys.is_empty() {
            return Err(KeychainError::Malformed("empty key set".to_string()));
        }
        for key in &self.keys {
            key.signing_key()?;
        }
        Ok(())
    }

    pub fn public_jwks(&self) -> Vec<PublicJwk> {
        self.keys.iter().map(SigningJwk::to_public).collect()
    }
}

// RFC 7638 thumbprint for an OKP key: SHA-256 over the canonical
// `{"crv","kty","x"}` JSON with lexicographically ordered keys and no
// whitespace, base64url without padding.
fn thumbprint(x: &str) -> String {
    let canonical = format!("{{\"crv\":\"Ed25519\",\"kty\":\"OKP\",\"x\":\"{}\"}}", x);

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
