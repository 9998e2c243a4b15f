use crate::{RequestFailure, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: Option<String>,
    pub created_at: Option<String>,
}

/// Token and identity issued by a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Login,
    Register,
}

impl AuthKind {
    pub(crate) fn failure_fallback(self) -> &'static str {
        match self {
            AuthKind::Login => "Login failed",
            AuthKind::Register => "Registration failed",
        }
    }

    pub(crate) fn success_text(self) -> &'static str {
        match self {
            AuthKind::Login => "Logged in successfully",
            AuthKind::Register => "Account created successfully",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Anonymous,
    PendingVerification,
    Authenticated,
}

/// The client's authentication state.
///
/// `user` is only ever set together with a token that the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

pub(crate) enum VerifyOutcome {
    Ignored,
    Accepted,
    Rejected(RequestFailure),
}

pub(crate) enum AuthOutcome {
    Stale,
    Established { kind: AuthKind, token: String },
    Failed { kind: AuthKind, failure: RequestFailure },
}

/// Single owner of the session. Every mutation of the token goes through here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionManager {
    session: Session,
    phase: SessionPhase,
    pending_auth: Option<(RequestId, AuthKind)>,
}

impl SessionManager {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn auth_in_flight(&self) -> bool {
        self.pending_auth.is_some()
    }

    /// The token other components may use: only a verified one.
    pub fn authenticated_token(&self) -> Option<&str> {
        match self.phase {
            SessionPhase::Authenticated => self.session.token(),
            SessionPhase::Anonymous | SessionPhase::PendingVerification => None,
        }
    }

    /// Adopts a persisted token pending verification. Returns the token to
    /// verify, or `None` when there is nothing to restore.
    pub(crate) fn restore(&mut self, persisted: Option<String>) -> Option<String> {
        if self.phase != SessionPhase::Anonymous {
            return None;
        }
        let token = persisted.filter(|token| !token.trim().is_empty())?;
        self.session = Session {
            token: Some(token.clone()),
            user: None,
        };
        self.phase = SessionPhase::PendingVerification;
        Some(token)
    }

    pub(crate) fn apply_verification(
        &mut self,
        token: &str,
        result: Result<User, RequestFailure>,
    ) -> VerifyOutcome {
        if self.phase != SessionPhase::PendingVerification || self.session.token() != Some(token)
        {
            return VerifyOutcome::Ignored;
        }
        match result {
            Ok(user) => {
                self.session.user = Some(user);
                self.phase = SessionPhase::Authenticated;
                VerifyOutcome::Accepted
            }
            Err(failure) => {
                self.clear();
                VerifyOutcome::Rejected(failure)
            }
        }
    }

    /// Records a login/registration attempt. Returns false if one is
    /// already running or the session is authenticated.
    pub(crate) fn begin_auth(&mut self, request: RequestId, kind: AuthKind) -> bool {
        if self.pending_auth.is_some() || self.phase == SessionPhase::Authenticated {
            return false;
        }
        self.pending_auth = Some((request, kind));
        true
    }

    /// Applies a login/registration result. Failures leave the session as is.
    pub(crate) fn apply_auth(
        &mut self,
        request: RequestId,
        result: Result<AuthGrant, RequestFailure>,
    ) -> AuthOutcome {
        let kind = match self.pending_auth {
            Some((pending, kind)) if pending == request => kind,
            _ => return AuthOutcome::Stale,
        };
        self.pending_auth = None;
        match result {
            Ok(grant) => {
                self.session = Session {
                    token: Some(grant.token.clone()),
                    user: Some(grant.user),
                };
                self.phase = SessionPhase::Authenticated;
                AuthOutcome::Established {
                    kind,
                    token: grant.token,
                }
            }
            Err(failure) => AuthOutcome::Failed { kind, failure },
        }
    }

    pub(crate) fn logout(&mut self) {
        self.clear();
        self.pending_auth = None;
    }

    fn clear(&mut self) {
        self.session = Session::default();
        self.phase = SessionPhase::Anonymous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 1,
            username: "ana".to_string(),
            email: None,
            created_at: None,
        }
    }

    #[test]
    fn blank_persisted_token_is_not_restored() {
        let mut manager = SessionManager::default();
        assert_eq!(manager.restore(Some("  ".to_string())), None);
        assert_eq!(manager.phase(), SessionPhase::Anonymous);
    }

    #[test]
    fn pending_token_is_not_handed_out() {
        let mut manager = SessionManager::default();
        manager.restore(Some("tok".to_string()));
        assert_eq!(manager.phase(), SessionPhase::PendingVerification);
        assert_eq!(manager.session().token(), Some("tok"));
        assert_eq!(manager.authenticated_token(), None);

        manager.apply_verification("tok", Ok(user()));
        assert_eq!(manager.authenticated_token(), Some("tok"));
    }

    #[test]
    fn verification_for_other_token_is_ignored() {
        let mut manager = SessionManager::default();
        manager.restore(Some("new".to_string()));
        let outcome = manager.apply_verification("old", Ok(user()));
        assert!(matches!(outcome, VerifyOutcome::Ignored));
        assert_eq!(manager.phase(), SessionPhase::PendingVerification);
    }
}
