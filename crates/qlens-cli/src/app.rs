//! Service wiring for one CLI invocation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::RwLock;

use qlens_application::{JobService, LinkService};
use qlens_core::config::QlensConfig;
use qlens_core::event_log::EventLogHandle;
use qlens_core::link::LinkSession;
use qlens_infrastructure::paths::QlensPaths;
use qlens_infrastructure::{ConfigStorage, SecretStorage};
use qlens_link::{LocalBackend, RemoteBackend};

/// Everything a command needs: the loaded configuration, the link session,
/// and the services that own it.
pub struct AppContext {
    pub config: QlensConfig,
    pub log: EventLogHandle,
    pub link: LinkService,
    pub jobs: JobService,
}

impl AppContext {
    /// Loads configuration and wires up the services.
    ///
    /// A missing config file falls back to defaults; a malformed one is an
    /// error the user should see.
    pub fn init() -> Result<Self> {
        let config = match QlensPaths::config_file() {
            Ok(path) => {
                let storage = ConfigStorage::new(path);
                let loaded = storage
                    .load()
                    .context("failed to load config.toml")?
                    .unwrap_or_default();
                tracing::debug!(path = %storage.path().display(), "configuration loaded");
                loaded
            }
            Err(_) => QlensConfig::default(),
        };

        let session = Arc::new(RwLock::new(LinkSession::new()));
        let log = EventLogHandle::new();
        let remote = Arc::new(RemoteBackend::new(&config.link)?);
        let local = Arc::new(LocalBackend::new());

        let link = LinkService::new(session.clone(), remote.clone(), log.clone());
        let jobs = JobService::new(
            session,
            remote,
            local,
            log.clone(),
            Duration::from_secs(config.link.job_timeout_secs),
        );

        Ok(Self {
            config,
            log,
            link,
            jobs,
        })
    }

    /// Resolves the API token: an explicit flag wins, then secret.json.
    pub fn resolve_token(&self, flag: Option<String>) -> Result<String> {
        if let Some(token) = flag {
            return Ok(token);
        }

        SecretStorage::new()
            .ok()
            .and_then(|storage| storage.load().ok())
            .and_then(|secrets| secrets.link)
            .map(|link| link.api_token)
            .context("no API token; pass --token or add it to secret.json")
    }
}
