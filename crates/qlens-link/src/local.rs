//! LocalBackend - in-process simulation of one job.
//!
//! Used when the caller asks for local execution and when the link is not
//! ready. The delay stands in for the submit/poll exchange the remote path
//! performs, so both paths report completion after a comparable pause.

use std::time::Duration;

use async_trait::async_trait;

use qlens_core::Result;
use qlens_core::register::BitRegister;

use crate::backend::JobBackend;

const DEFAULT_DELAY: Duration = Duration::from_millis(600);

/// Timed local stand-in for the remote job exchange.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    delay: Duration,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }

    /// Overrides the simulated delay (tests use zero).
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn execute(&self, _session_id: Option<&str>) -> Result<BitRegister> {
        tokio::time::sleep(self.delay).await;
        Ok(BitRegister::sample(&mut rand::thread_rng()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlens_core::register::REGISTER_LEN;

    #[tokio::test]
    async fn test_local_job_yields_a_full_register() {
        let backend = LocalBackend::with_delay(Duration::ZERO);
        let register = backend.execute(None).await.unwrap();
        assert_eq!(register.to_string().len(), REGISTER_LEN);
        assert!(register.bits().iter().all(|&b| b <= 1));
    }

    #[tokio::test]
    async fn test_session_id_is_ignored() {
        let backend = LocalBackend::with_delay(Duration::ZERO);
        assert!(backend.execute(Some("sess-1")).await.is_ok());
    }
}
