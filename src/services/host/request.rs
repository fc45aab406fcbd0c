use serde::Serialize;

use crate::services::host::session::SessionCtx;

/// Claims wrapper handed to the token-issuance collaborator as the
/// resolved subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectClaims {
    #[serde(rename = "_id")]
    pub web_id: String,
}

/// The subject slot of an authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Subject {
    /// Nothing decided yet.
    #[default]
    Unresolved,
    /// Explicitly cleared: no authenticated caller.
    Anonymous,
    /// A concrete, session-backed identity.
    WebId(SubjectClaims),
}

/// Request-scoped state for one authorization call. Owned by the handler
/// processing it; never shared between requests.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    query: String,
    session: SessionCtx,
    subject: Subject,
}

impl AuthorizeRequest {
    /// `query` is the original query string, kept verbatim so a login
    /// redirect can replay it unchanged.
    pub fn new(query: impl Into<String>, session: SessionCtx) -> Self {
        Self {
            query: query.into(),
            session,
            subject: Subject::Unresolved,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn session(&self) -> &SessionCtx {
        &self.session
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Set the subject slot. A concrete identity is never downgraded back
    /// to anonymous within the same request.
    pub fn set_subject(&mut self, subject: Subject) {
        if matches!(self.subject, Subject::WebId(_)) && matches!(subject, Subject::Anonymous) {
            return;
        }
        self.subject = subject;
    }
}
