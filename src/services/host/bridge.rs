use tracing::{debug, warn};

use crate::services::host::delegates::{AutoConsent, ConsentHandler, LogoutHandler, NoopLogout};
use crate::services::host::request::{AuthorizeRequest, Subject, SubjectClaims};

/// Outcome of the authentication step. `Redirected` means a response has
/// effectively been decided; the caller must stop normal handling and
/// issue the redirect, nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Continue,
    Redirected { location: String },
}

/// Host behavior overrides. Defaults: `/login` as the login target,
/// auto-granted consent, no-op logout.
pub struct HostOptions {
    pub login_path: String,
    pub skip_consent: bool,
    pub consent: Box<dyn ConsentHandler>,
    pub logout: Box<dyn LogoutHandler>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            skip_consent: true,
            consent: Box::new(AutoConsent),
            logout: Box::new(NoopLogout),
        }
    }
}

/// Bridges the caller's session to the token subject. Built once at
/// startup; all behavior is injected through [`HostOptions`].
pub struct Host {
    login_path: String,
    skip_consent: bool,
    post_logout_redirect_uri: String,
    consent: Box<dyn ConsentHandler>,
    logout: Box<dyn LogoutHandler>,
}

impl Host {
    pub fn new(post_logout_redirect_uri: String, options: HostOptions) -> Self {
        Self {
            login_path: options.login_path,
            skip_consent: options.skip_consent,
            post_logout_redirect_uri,
            consent: options.consent,
            logout: options.logout,
        }
    }

    /// Resolve the request's subject from its session, or hand the caller
    /// off to the login flow.
    ///
    /// An identified session sets a concrete subject and lets handling
    /// continue. Anything else clears the subject and redirects to the
    /// login path with the original query string attached unchanged.
    pub fn authenticate(&self, request: &mut AuthorizeRequest) -> Handled {
        match request.session().identity() {
            Some(web_id) => {
                debug!(web_id = %web_id, "session identity attached as subject");
                request.set_subject(Subject::WebId(SubjectClaims {
                    web_id: web_id.to_string(),
                }));
                Handled::Continue
            }
            None => {
                request.set_subject(Subject::Anonymous);
                let location = match request.query() {
                    "" => self.login_path.clone(),
                    query => format!("{}?{}", self.login_path, query),
                };
                Handled::Redirected { location }
            }
        }
    }

    /// Run the consent collaborator. Failures are logged and absorbed:
    /// consent is best-effort in this deployment mode.
    pub async fn obtain_consent(&self, request: &AuthorizeRequest) {
        if let Err(e) = self.consent.handle(request, self.skip_consent).await {
            warn!(error = %e, "consent delegation failed");
        }
    }

    /// Run the logout collaborator. Failures are logged and absorbed.
    pub async fn logout(&self, request: &AuthorizeRequest) {
        if let Err(e) = self.logout.handle(request.session()).await {
            warn!(error = %e, "logout delegation failed");
        }
    }

    pub fn post_logout_redirect_uri(&self) -> &str {
        &self.post_logout_redirect_uri
    }
}
