use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use rand::RngCore;
use rand::rngs::OsRng;
use tokio::task::JoinHandle;

use crate::metrics::AppMetrics;
use crate::models::v1::user::SessionUser;
use crate::security::IpRateLimiter;

/// Bytes of CSPRNG output per session token
pub const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// 32 bytes from the operating system CSPRNG, hex encoded
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// In-process session store shared by every worker
///
/// Cloning is cheap and every clone sees the same sessions. Each service
/// instance builds its own registry, so tests stay isolated.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, Session>>,
    ttl: TimeDelta,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        let shards = (num_cpus::get() * 4).next_power_of_two();

        Self {
            sessions: Arc::new(DashMap::with_shard_amount(shards)),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Mint a token for `user`, valid for the configured TTL
    pub fn create(&self, user: SessionUser) -> String {
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.insert(user, expires_at)
    }

    /// Mint a token with an explicit expiry
    pub fn insert(&self, user: SessionUser, expires_at: DateTime<Utc>) -> String {
        let token = generate_token();
        self.sessions.insert(token.clone(), Session { user, expires_at });
        token
    }

    /// Live session for `token`. An expired entry is removed on the spot.
    pub fn get(&self, token: &str) -> Option<Session> {
        let now = Utc::now();

        let expired = match self.sessions.get(token) {
            Some(entry) if !entry.is_expired_at(now) => return Some(entry.value().clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.sessions.remove_if(token, |_, session| session.is_expired_at(now));
            tracing::debug!("Removed expired session on access");
        }

        None
    }

    /// Whether a session was removed
    pub fn remove(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Remove every expired session, returning how many were dropped
    pub fn sweep(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired_at(now));
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Background task that sweeps a [`SessionRegistry`] on a fixed interval
/// and prunes idle per-IP state from the given rate limiters
///
/// Runs until [`SessionSweeper::shutdown`] is called or the sweeper is dropped.
#[derive(Debug)]
pub struct SessionSweeper {
    handle: Option<JoinHandle<()>>,
}

impl SessionSweeper {
    /// Must be called from within a tokio runtime
    pub fn start(
        registry: SessionRegistry,
        limiters: Vec<IpRateLimiter>,
        every: Duration,
        metrics: Option<AppMetrics>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;

                let removed = registry.sweep();
                if removed > 0 {
                    tracing::info!(removed, remaining = registry.len(), "Swept expired sessions");
                }
                if let Some(metrics) = &metrics {
                    metrics.set_active_sessions(registry.len());
                }

                for limiter in &limiters {
                    let pruned = limiter.prune();
                    if pruned > 0 {
                        tracing::debug!(
                            limiter = limiter.name(),
                            pruned,
                            tracked = limiter.tracked(),
                            "Pruned idle rate limit state"
                        );
                    }
                }
            }
        });

        tracing::debug!(interval = ?every, "Session sweeper started");

        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the sweep and wait for the task to wind down
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
            tracing::debug!("Session sweeper stopped");
        }
    }
}

impl Drop for SessionSweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
