//! Durable identity of the issuing authority: signing keychain, persisted
//! configuration, and the startup bootstrap that ties them together.

mod authority;
mod bootstrap;
mod keychain;

pub use authority::{
    AuthorityConfig, LOCAL_RP_PATH, NS_OP, NS_RP, NS_USERS, PROVIDER_CONFIG_PATH, RpRegistration,
};
pub use bootstrap::{BootstrapError, Bootstrapper};
pub use keychain::{KeyChain, KeychainError, PublicJwk, SigningJwk};
