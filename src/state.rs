use std::sync::Arc;
use std::time::Duration;

use actix_web::web::{Data, ServiceConfig};

use crate::config::AppConfig;
use crate::database::{DatabasePools, Reader, SeaReader, SeaWriter, Writer};
use crate::metrics::AppMetrics;
use crate::middlewares::v1::auth::{SessionCookie, SessionRegistry, SessionSweeper};
use crate::security::{InputGuard, IpRateLimiter, PasswordHasher};

/// Everything the handlers share, built once and handed to every worker
///
/// Clones share the same sessions, limiter counters and pools.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub reader: Arc<dyn Reader>,
    pub writer: Arc<dyn Writer>,
    pub sessions: SessionRegistry,
    pub hasher: PasswordHasher,
    pub guard: InputGuard,
    pub cookie: SessionCookie,
    pub metrics: AppMetrics,
    pub general_limiter: IpRateLimiter,
    pub auth_limiter: IpRateLimiter,
}

impl AppState {
    /// # Errors
    /// Fails if the configured Argon2 parameters are invalid.
    pub fn new(
        config: AppConfig,
        reader: Arc<dyn Reader>,
        writer: Arc<dyn Writer>,
        metrics: AppMetrics,
    ) -> Result<Self, argon2::password_hash::Error> {
        let hasher = PasswordHasher::from_config(&config.auth.argon2)?;
        let sessions = SessionRegistry::new(Duration::from_secs(config.auth.session_ttl));
        let rate_limit = &config.security.rate_limit;

        Ok(Self {
            reader,
            writer,
            sessions,
            hasher,
            guard: InputGuard::new(config.security.input_guard),
            cookie: SessionCookie::from_config(&config),
            metrics,
            general_limiter: IpRateLimiter::new("general", rate_limit.general.clone()),
            auth_limiter: IpRateLimiter::new("auth", rate_limit.auth.clone()),
            config,
        })
    }

    /// State over SeaORM repositories
    pub fn with_pools(
        config: AppConfig,
        pools: DatabasePools,
        metrics: AppMetrics,
    ) -> Result<Self, argon2::password_hash::Error> {
        Self::new(
            config,
            Arc::new(SeaReader::new(pools.read)),
            Arc::new(SeaWriter::new(pools.write)),
            metrics,
        )
    }

    /// Start the periodic sweep of expired sessions and idle limiter state
    pub fn start_sweeper(&self) -> SessionSweeper {
        SessionSweeper::start(
            self.sessions.clone(),
            vec![self.general_limiter.clone(), self.auth_limiter.clone()],
            Duration::from_secs(self.config.auth.sweep_interval),
            Some(self.metrics.clone()),
        )
    }

    /// Register the shared state as app data
    pub fn configure(&self, app: &mut ServiceConfig) {
        app.app_data(Data::new(self.config.clone()))
            .app_data(Data::from(self.reader.clone()))
            .app_data(Data::from(self.writer.clone()))
            .app_data(Data::new(self.sessions.clone()))
            .app_data(Data::new(self.hasher.clone()))
            .app_data(Data::new(self.guard))
            .app_data(Data::new(self.cookie.clone()))
            .app_data(Data::new(self.metrics.clone()));
    }
}
