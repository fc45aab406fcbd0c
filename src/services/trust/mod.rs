//! Issuer-trust verification: decides whether a token's issuer is
//! authorized to speak for the identity the token claims.

pub mod origin;
mod verifier;

pub use verifier::{Audience, Claims, TrustError, TrustVerifier};
