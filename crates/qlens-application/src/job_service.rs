//! Job execution over the backend link.
//!
//! One call = one job = one fresh bit register. The remote and local paths
//! are two bearers of the same capability interface, selected at a single
//! call site from the current link status; the `Busy` window opens and
//! closes within the same call on every path, including failure.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use qlens_core::event_log::{EventLogHandle, LogCategory};
use qlens_core::link::{LinkSession, LinkStatus};
use qlens_core::register::{BitRegister, derive_weight};
use qlens_core::{QlensError, Result};
use qlens_link::JobBackend;

/// Executes jobs and publishes the current register.
pub struct JobService {
    session: Arc<RwLock<LinkSession>>,
    remote: Arc<dyn JobBackend>,
    local: Arc<dyn JobBackend>,
    log: EventLogHandle,
    current: Arc<RwLock<BitRegister>>,
    job_timeout: Duration,
}

enum JobPath {
    Remote { session_id: String },
    Local { degraded: bool },
}

impl JobService {
    /// Creates a job service.
    ///
    /// The published register starts as all zeros, so capture is total from
    /// process start.
    pub fn new(
        session: Arc<RwLock<LinkSession>>,
        remote: Arc<dyn JobBackend>,
        local: Arc<dyn JobBackend>,
        log: EventLogHandle,
        job_timeout: Duration,
    ) -> Self {
        Self {
            session,
            remote,
            local,
            log,
            current: Arc::new(RwLock::new(BitRegister::zeros())),
            job_timeout,
        }
    }

    /// Shared handle to the published register, for capture and display.
    pub fn register_feed(&self) -> Arc<RwLock<BitRegister>> {
        self.current.clone()
    }

    /// The most recently published register.
    pub async fn current_register(&self) -> BitRegister {
        *self.current.read().await
    }

    /// Weight of the most recently published register.
    pub async fn current_weight(&self) -> f64 {
        derive_weight(&*self.current.read().await)
    }

    /// Runs one job and publishes its register on success.
    ///
    /// Remote execution requires `requested_remote` and a `Ready` link;
    /// otherwise the local path runs without touching the session, with a
    /// degradation warning when remote was wanted. On failure of the remote
    /// step the previously published register is left unchanged.
    ///
    /// # Errors
    ///
    /// - `OperationPending` when a job or authentication is already in
    ///   flight (requests are rejected, not queued).
    /// - `JobPipelineInterrupted` when the remote step fails or exceeds its
    ///   deadline; the session still resolves to `Ready`.
    pub async fn run_job(&self, requested_remote: bool) -> Result<BitRegister> {
        match self.select_path(requested_remote).await? {
            JobPath::Remote { session_id } => self.run_remote(&session_id).await,
            JobPath::Local { degraded } => self.run_local(degraded).await,
        }
    }

    async fn select_path(&self, requested_remote: bool) -> Result<JobPath> {
        if !requested_remote {
            return Ok(JobPath::Local { degraded: false });
        }

        let mut session = self.session.write().await;
        match session.status() {
            LinkStatus::Ready => {
                session.begin_job()?;
                match session.session_id().map(str::to_string) {
                    Some(session_id) => Ok(JobPath::Remote { session_id }),
                    None => {
                        session.finish_job();
                        Err(QlensError::internal("ready link carries no session id"))
                    }
                }
            }
            LinkStatus::Busy => Err(QlensError::operation_pending("job")),
            LinkStatus::Authenticating => Err(QlensError::operation_pending("authenticate")),
            LinkStatus::Disconnected => Ok(JobPath::Local { degraded: true }),
        }
    }

    async fn run_remote(&self, session_id: &str) -> Result<BitRegister> {
        let result = match tokio::time::timeout(
            self.job_timeout,
            self.remote.execute(Some(session_id)),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(QlensError::job_interrupted(format!(
                "remote job exceeded the {}s deadline",
                self.job_timeout.as_secs()
            ))),
        };

        // Busy is exited in the same call on every path.
        self.session.write().await.finish_job();

        match result {
            Ok(register) => {
                self.publish(register).await;
                tracing::info!(register = %register, "remote job complete");
                self.log.record(
                    LogCategory::Job,
                    "Remote job complete",
                    Some(format!("register {register}")),
                );
                Ok(register)
            }
            Err(err) => {
                tracing::warn!(error = %err, "remote job failed");
                self.log.record(
                    LogCategory::Job,
                    "Job pipeline interrupted",
                    Some(err.to_string()),
                );
                Err(err)
            }
        }
    }

    async fn run_local(&self, degraded: bool) -> Result<BitRegister> {
        if degraded {
            tracing::warn!("remote execution requested but link is not ready");
            self.log.record(
                LogCategory::Job,
                "Remote link not ready, running local simulation",
                None,
            );
        }

        let register = self.local.execute(None).await?;
        self.publish(register).await;
        self.log.record(
            LogCategory::Job,
            "Local job complete",
            Some(format!("register {register}")),
        );
        Ok(register)
    }

    async fn publish(&self, register: BitRegister) {
        *self.current.write().await = register;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use qlens_core::link::ApiToken;

    struct FixedBackend {
        register: BitRegister,
    }

    #[async_trait]
    impl JobBackend for FixedBackend {
        fn name(&self) -> &'static str {
            "remote"
        }

        async fn execute(&self, _session_id: Option<&str>) -> Result<BitRegister> {
            Ok(self.register)
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl JobBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "remote"
        }

        async fn execute(&self, _session_id: Option<&str>) -> Result<BitRegister> {
            Err(QlensError::job_interrupted("backend rejected the job"))
        }
    }

    fn ready_session() -> Arc<RwLock<LinkSession>> {
        let mut session = LinkSession::new();
        session
            .begin_authentication(ApiToken::new("token").unwrap())
            .unwrap();
        session
            .complete_authentication("sess-1".to_string())
            .unwrap();
        Arc::new(RwLock::new(session))
    }

    fn service(
        session: Arc<RwLock<LinkSession>>,
        remote: Arc<dyn JobBackend>,
    ) -> (JobService, EventLogHandle) {
        let log = EventLogHandle::new();
        let service = JobService::new(
            session,
            remote,
            Arc::new(qlens_link::LocalBackend::with_delay(Duration::ZERO)),
            log.clone(),
            Duration::from_secs(5),
        );
        (service, log)
    }

    #[tokio::test]
    async fn test_local_path_leaves_session_untouched() {
        let session = Arc::new(RwLock::new(LinkSession::new()));
        let (service, _log) = service(session.clone(), Arc::new(FailingBackend));

        let register = service.run_job(false).await.unwrap();
        assert_eq!(register.to_string().len(), 10);
        assert_eq!(session.read().await.status(), LinkStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_remote_path_publishes_and_returns_to_ready() {
        let session = ready_session();
        let expected: BitRegister = "1100110011".parse().unwrap();
        let (service, _log) = service(session.clone(), Arc::new(FixedBackend { register: expected }));

        let register = service.run_job(true).await.unwrap();
        assert_eq!(register, expected);
        assert_eq!(service.current_register().await, expected);
        assert_eq!(session.read().await.status(), LinkStatus::Ready);
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_previous_register() {
        let session = ready_session();
        let (service, log) = service(session.clone(), Arc::new(FailingBackend));

        let before = service.current_register().await;
        let err = service.run_job(true).await.unwrap_err();

        assert!(err.is_job_interrupted());
        assert_eq!(service.current_register().await, before);
        // Busy is never observable after run_job resolves.
        assert_eq!(session.read().await.status(), LinkStatus::Ready);
        assert!(
            log.snapshot()
                .iter()
                .any(|e| e.message.contains("Job pipeline interrupted"))
        );
    }

    #[tokio::test]
    async fn test_degraded_fallback_logs_a_warning_first() {
        let session = Arc::new(RwLock::new(LinkSession::new()));
        let (service, log) = service(session, Arc::new(FailingBackend));

        service.run_job(true).await.unwrap();

        let entries = log.snapshot();
        // Newest first: completion entry, then the degradation warning.
        assert!(entries[0].message.contains("Local job complete"));
        assert!(entries[1].message.contains("Remote link not ready"));
    }

    #[tokio::test]
    async fn test_job_while_busy_is_rejected() {
        let session = ready_session();
        session.write().await.begin_job().unwrap();

        let (service, _log) = service(session.clone(), Arc::new(FailingBackend));
        let err = service.run_job(true).await.unwrap_err();
        assert!(err.is_operation_pending());
        // The outstanding job still owns the Busy window.
        assert_eq!(session.read().await.status(), LinkStatus::Busy);
    }

    #[tokio::test]
    async fn test_initial_register_is_all_zeros() {
        let (service, _log) = service(
            Arc::new(RwLock::new(LinkSession::new())),
            Arc::new(FailingBackend),
        );
        assert_eq!(service.current_register().await, BitRegister::zeros());
        assert_eq!(service.current_weight().await, 0.0);
    }
}
