/// Read-only view of the caller's session, injected per request by the
/// session middleware outside this crate. Absence means unauthenticated.
#[derive(Debug, Clone, Default)]
pub struct SessionCtx {
    pub identified: bool,
    pub user_id: Option<String>,
}

impl SessionCtx {
    pub fn identified(user_id: impl Into<String>) -> Self {
        Self {
            identified: true,
            user_id: Some(user_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The stored identity, present only when the caller is identified.
    pub fn identity(&self) -> Option<&str> {
        if self.identified {
            self.user_id.as_deref()
        } else {
            None
        }
    }
}
