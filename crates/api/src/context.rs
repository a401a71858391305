use tours_auth::Principal;

/// Session context for a request.
///
/// Inserted by the session middleware on every request; anonymous requests
/// carry an empty context rather than none at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    principal: Option<Principal>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}
