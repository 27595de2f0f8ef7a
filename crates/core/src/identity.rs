use std::fmt;

use crate::model::UserId;

/// Who is driving the interview.
///
/// The surrounding application always resolves one of these before routing to
/// the interview flow; a missing or rejected credential resolves to `Guest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated {
        user_id: UserId,
        email: String,
        display_name: Option<String>,
    },
    Guest,
}

impl Identity {
    pub const GUEST_NAME: &'static str = "Guest User";

    #[must_use]
    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest)
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::Authenticated { user_id, .. } => Some(user_id),
            Identity::Guest => None,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Identity::Authenticated {
                display_name: Some(name),
                ..
            } if !name.trim().is_empty() => name.as_str(),
            Identity::Authenticated { email, .. } => email.as_str(),
            Identity::Guest => Self::GUEST_NAME,
        }
    }
}

/// Identity plus the credential used to talk to the interview service.
///
/// Created once at application start and passed to whatever needs it; there is
/// no process-wide instance. Signing out consumes the context.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityContext {
    identity: Identity,
    token: Option<String>,
}

impl IdentityContext {
    #[must_use]
    pub fn guest() -> Self {
        Self {
            identity: Identity::Guest,
            token: None,
        }
    }

    #[must_use]
    pub fn authenticated(
        user_id: UserId,
        email: impl Into<String>,
        display_name: Option<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            identity: Identity::Authenticated {
                user_id,
                email: email.into(),
                display_name,
            },
            token: Some(token.into()),
        }
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Drop the credential and fall back to a guest context.
    #[must_use]
    pub fn sign_out(self) -> Self {
        Self::guest()
    }
}

impl Default for IdentityContext {
    fn default() -> Self {
        Self::guest()
    }
}

impl fmt::Debug for IdentityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityContext")
            .field("identity", &self.identity)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
