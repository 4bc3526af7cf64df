//! Authentication use case for the backend link.

use std::sync::Arc;

use tokio::sync::RwLock;

use qlens_core::event_log::{EventLogHandle, LogCategory};
use qlens_core::link::{ApiToken, LinkSession, LinkStatus};
use qlens_core::{QlensError, Result};
use qlens_link::LinkAuthenticator;

/// Owns the authentication flow against the compute backend.
///
/// `LinkService` is one of the two components allowed to mutate the link
/// session (the other is [`crate::JobService`]); display and logging code
/// only read it through [`LinkService::status`].
pub struct LinkService {
    session: Arc<RwLock<LinkSession>>,
    authenticator: Arc<dyn LinkAuthenticator>,
    log: EventLogHandle,
}

impl LinkService {
    pub fn new(
        session: Arc<RwLock<LinkSession>>,
        authenticator: Arc<dyn LinkAuthenticator>,
        log: EventLogHandle,
    ) -> Self {
        Self {
            session,
            authenticator,
            log,
        }
    }

    /// Validates a credential against the backend and establishes a session.
    ///
    /// The session passes through `Authenticating` for the duration of the
    /// external call and always resolves to `Ready` (success) or
    /// `Disconnected` (rejection or transport failure). The credential never
    /// appears in the event log; the stored session identifier is logged as
    /// a truncated preview only.
    ///
    /// # Errors
    ///
    /// - `MissingCredential` if the credential is empty; no state change.
    /// - `OperationPending` if an authentication or job is already in
    ///   flight; no state change.
    /// - `CredentialRejected` / `LinkUnreachable` from the external call;
    ///   the session resolves to `Disconnected`.
    pub async fn authenticate(&self, credential: &str) -> Result<LinkStatus> {
        let token = match ApiToken::new(credential) {
            Ok(token) => token,
            Err(err) => {
                self.log.record(
                    LogCategory::Link,
                    "Authentication failed",
                    Some("missing credential".to_string()),
                );
                return Err(err);
            }
        };

        {
            let mut session = self.session.write().await;
            session.begin_authentication(token.clone())?;
        }

        self.log.record(
            LogCategory::Link,
            "Authenticating with compute backend",
            None,
        );

        // The one suspension point of this flow; status `Authenticating`
        // guards against re-entry while the lock is released.
        let result = self.authenticator.authenticate(&token).await;

        let mut session = self.session.write().await;
        match result {
            Ok(session_id) => {
                let preview = id_preview(&session_id);
                session.complete_authentication(session_id)?;
                tracing::info!(session = %preview, "link established");
                self.log.record(
                    LogCategory::Link,
                    format!("Link established (session {preview})"),
                    None,
                );
                Ok(LinkStatus::Ready)
            }
            Err(err) => {
                session.fail_authentication();
                self.report_failure(&err);
                Err(err)
            }
        }
    }

    /// Current status of the link.
    pub async fn status(&self) -> LinkStatus {
        self.session.read().await.status()
    }

    /// The established backend session identifier, if any.
    pub async fn session_id(&self) -> Option<String> {
        self.session.read().await.session_id().map(str::to_string)
    }

    fn report_failure(&self, err: &QlensError) {
        match err {
            QlensError::CredentialRejected { detail } => {
                tracing::warn!(%detail, "credential rejected");
                self.log.record(
                    LogCategory::Link,
                    "Credential rejected by backend",
                    Some(detail.clone()),
                );
            }
            QlensError::LinkUnreachable { message } => {
                tracing::warn!(%message, "link unreachable");
                self.log.record(
                    LogCategory::Link,
                    "Link unreachable",
                    Some(message.clone()),
                );
            }
            other => {
                self.log.record(
                    LogCategory::Link,
                    "Authentication failed",
                    Some(other.to_string()),
                );
            }
        }
    }
}

fn id_preview(id: &str) -> String {
    let head: String = id.chars().take(8).collect();
    format!("{head}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticAuthenticator {
        outcome: std::result::Result<String, QlensError>,
    }

    #[async_trait]
    impl LinkAuthenticator for StaticAuthenticator {
        async fn authenticate(&self, _token: &ApiToken) -> Result<String> {
            self.outcome.clone()
        }
    }

    fn service(outcome: std::result::Result<String, QlensError>) -> LinkService {
        LinkService::new(
            Arc::new(RwLock::new(LinkSession::new())),
            Arc::new(StaticAuthenticator { outcome }),
            EventLogHandle::new(),
        )
    }

    #[tokio::test]
    async fn test_empty_credential_leaves_status_unchanged() {
        let service = service(Ok("sess-1".to_string()));

        let err = service.authenticate("").await.unwrap_err();
        assert!(err.is_missing_credential());
        assert_eq!(service.status().await, LinkStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_successful_authentication_stores_session() {
        let service = service(Ok("sess-abcdef-123".to_string()));

        let status = service.authenticate("token").await.unwrap();
        assert_eq!(status, LinkStatus::Ready);
        assert_eq!(service.session_id().await.as_deref(), Some("sess-abcdef-123"));
    }

    #[tokio::test]
    async fn test_rejection_resolves_disconnected() {
        let service = service(Err(QlensError::credential_rejected("401: bad token")));

        let err = service.authenticate("token").await.unwrap_err();
        assert!(err.is_credential_rejected());
        assert_eq!(service.status().await, LinkStatus::Disconnected);
        assert!(service.session_id().await.is_none());
    }

    #[tokio::test]
    async fn test_log_never_contains_the_credential() {
        let log = EventLogHandle::new();
        let service = LinkService::new(
            Arc::new(RwLock::new(LinkSession::new())),
            Arc::new(StaticAuthenticator {
                outcome: Ok("sess-1".to_string()),
            }),
            log.clone(),
        );

        service.authenticate("very-secret-token").await.unwrap();

        for entry in log.snapshot() {
            assert!(!entry.message.contains("very-secret-token"));
            assert!(!entry.detail.unwrap_or_default().contains("very-secret-token"));
        }
    }
}
