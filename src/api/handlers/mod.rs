pub mod authorize;
pub mod health;
pub mod logout;
pub mod metadata;
