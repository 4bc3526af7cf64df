//! Link session state machine.
//!
//! Tracks the connection to the external compute backend. The session is
//! process-lifetime state: it is created once in `Disconnected` and mutated
//! only through the transition methods below, so illegal transitions surface
//! as errors instead of silent writes.

use serde::{Deserialize, Serialize};

use crate::error::{QlensError, Result};

/// Connection state of the link to the compute backend.
///
/// Exactly one value holds at any time. `Authenticating` and `Busy` mark the
/// two suspending operations (credential validation and a dispatched job);
/// while either holds, no second suspending operation may be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LinkStatus {
    /// No established session with the backend.
    Disconnected,
    /// A credential validation call is in flight.
    Authenticating,
    /// A session is established and jobs may be dispatched.
    Ready,
    /// A remote job is outstanding.
    Busy,
}

/// An opaque backend credential.
///
/// The raw token is only reachable through [`ApiToken::expose`]; `Debug` and
/// the log-facing [`ApiToken::preview`] both redact it, so the credential
/// never ends up in log output or error messages by accident.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps a raw credential string.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` if the string is empty or whitespace-only.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(QlensError::MissingCredential);
        }
        Ok(Self(raw))
    }

    /// Returns the raw token for use in a request body.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns a short, non-sensitive preview suitable for logging.
    pub fn preview(&self) -> String {
        let head: String = self.0.chars().take(4).collect();
        format!("{head}…")
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiToken(****)")
    }
}

/// Process-lifetime state of the backend link.
///
/// Created at startup in `Disconnected` with no credential. Mutated only by
/// the authentication and job-execution operations; display and logging code
/// read it through the accessors.
#[derive(Debug)]
pub struct LinkSession {
    status: LinkStatus,
    credential: Option<ApiToken>,
    session_id: Option<String>,
}

impl LinkSession {
    /// Creates a fresh, disconnected session.
    pub fn new() -> Self {
        Self {
            status: LinkStatus::Disconnected,
            credential: None,
            session_id: None,
        }
    }

    /// Current status of the link.
    pub fn status(&self) -> LinkStatus {
        self.status
    }

    /// The backend session identifier, if a session is established.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// The credential used for the current or most recent authentication.
    pub fn credential(&self) -> Option<&ApiToken> {
        self.credential.as_ref()
    }

    /// Enters `Authenticating` and stores the credential under validation.
    ///
    /// # Errors
    ///
    /// Returns `OperationPending` if an authentication or job is already in
    /// flight; the caller must not start a second suspending operation.
    pub fn begin_authentication(&mut self, credential: ApiToken) -> Result<()> {
        match self.status {
            LinkStatus::Disconnected | LinkStatus::Ready => {
                self.status = LinkStatus::Authenticating;
                self.credential = Some(credential);
                Ok(())
            }
            LinkStatus::Authenticating => Err(QlensError::operation_pending("authenticate")),
            LinkStatus::Busy => Err(QlensError::operation_pending("job")),
        }
    }

    /// Stores the backend session identifier and enters `Ready`.
    ///
    /// # Errors
    ///
    /// Returns an internal error if no authentication is in flight.
    pub fn complete_authentication(&mut self, session_id: String) -> Result<()> {
        if self.status != LinkStatus::Authenticating {
            return Err(QlensError::internal(format!(
                "authentication completed while status was {}",
                self.status
            )));
        }
        self.session_id = Some(session_id);
        self.status = LinkStatus::Ready;
        Ok(())
    }

    /// Resolves a failed authentication back to `Disconnected`.
    ///
    /// Discards any partial session identifier and the rejected credential.
    /// Infallible: every failure path must be able to reach a terminal
    /// status.
    pub fn fail_authentication(&mut self) {
        self.status = LinkStatus::Disconnected;
        self.session_id = None;
        self.credential = None;
    }

    /// Enters `Busy` for a remote job dispatch.
    ///
    /// # Errors
    ///
    /// Returns `OperationPending` when a suspending operation is in flight,
    /// or an internal error when no session is established — callers decide
    /// between remote and local execution before dispatching.
    pub fn begin_job(&mut self) -> Result<()> {
        match self.status {
            LinkStatus::Ready => {
                self.status = LinkStatus::Busy;
                Ok(())
            }
            LinkStatus::Busy => Err(QlensError::operation_pending("job")),
            LinkStatus::Authenticating => Err(QlensError::operation_pending("authenticate")),
            LinkStatus::Disconnected => Err(QlensError::internal(
                "remote job dispatched without an established link",
            )),
        }
    }

    /// Returns from `Busy` to `Ready`.
    ///
    /// Called unconditionally when a remote job completes, whether it
    /// succeeded or failed; status must never be left stuck at `Busy`.
    pub fn finish_job(&mut self) {
        if self.status == LinkStatus::Busy {
            self.status = LinkStatus::Ready;
        }
    }
}

impl Default for LinkSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(raw: &str) -> ApiToken {
        ApiToken::new(raw).unwrap()
    }

    #[test]
    fn test_new_session_is_disconnected() {
        let session = LinkSession::new();
        assert_eq!(session.status(), LinkStatus::Disconnected);
        assert!(session.credential().is_none());
        assert!(session.session_id().is_none());
    }

    #[test]
    fn test_empty_token_is_missing_credential() {
        assert!(ApiToken::new("").unwrap_err().is_missing_credential());
        assert!(ApiToken::new("   ").unwrap_err().is_missing_credential());
    }

    #[test]
    fn test_token_preview_redacts() {
        let t = token("super-secret-token");
        assert_eq!(t.preview(), "supe…");
        assert_eq!(format!("{:?}", t), "ApiToken(****)");
    }

    #[test]
    fn test_successful_authentication_flow() {
        let mut session = LinkSession::new();
        session.begin_authentication(token("abc")).unwrap();
        assert_eq!(session.status(), LinkStatus::Authenticating);

        session
            .complete_authentication("sess-1234".to_string())
            .unwrap();
        assert_eq!(session.status(), LinkStatus::Ready);
        assert_eq!(session.session_id(), Some("sess-1234"));
    }

    #[test]
    fn test_failed_authentication_resolves_disconnected() {
        let mut session = LinkSession::new();
        session.begin_authentication(token("abc")).unwrap();
        session.fail_authentication();

        assert_eq!(session.status(), LinkStatus::Disconnected);
        assert!(session.session_id().is_none());
        assert!(session.credential().is_none());
    }

    #[test]
    fn test_reentrant_authentication_is_rejected() {
        let mut session = LinkSession::new();
        session.begin_authentication(token("abc")).unwrap();

        let err = session.begin_authentication(token("def")).unwrap_err();
        assert!(err.is_operation_pending());
        assert_eq!(session.status(), LinkStatus::Authenticating);
    }

    #[test]
    fn test_job_lifecycle() {
        let mut session = LinkSession::new();
        session.begin_authentication(token("abc")).unwrap();
        session.complete_authentication("sess-1".to_string()).unwrap();

        session.begin_job().unwrap();
        assert_eq!(session.status(), LinkStatus::Busy);

        // Busy -> Busy is unrepresentable
        assert!(session.begin_job().unwrap_err().is_operation_pending());

        session.finish_job();
        assert_eq!(session.status(), LinkStatus::Ready);
    }

    #[test]
    fn test_job_requires_established_link() {
        let mut session = LinkSession::new();
        let err = session.begin_job().unwrap_err();
        assert!(matches!(err, QlensError::Internal(_)));
        assert_eq!(session.status(), LinkStatus::Disconnected);
    }
}
