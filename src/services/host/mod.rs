//! Host-side behavior around an authorization request: session-to-claim
//! bridging, consent and logout delegation.

mod bridge;
mod delegates;
mod request;
mod session;

pub use bridge::{Handled, Host, HostOptions};
pub use delegates::{AutoConsent, ConsentHandler, DelegateError, LogoutHandler, NoopLogout};
pub use request::{AuthorizeRequest, Subject, SubjectClaims};
pub use session::SessionCtx;
