//! # Rate Limiting Middleware
//!
//! Per-IP rate limiting on top of governor's GCRA limiter. A limit of
//! `requests` per `window` seconds becomes a quota that allows a burst of
//! `requests` and replenishes one cell every `window / requests`.
//!
//! With `skip_successful` only responses with status >= 400 are counted.
//! Requests pass until the failures use up the burst, after which the client
//! is blocked until the next cell replenishes.
//!
//! Per-IP state lives until [`IpRateLimiter::prune`] finds it idle for a full
//! window, by which point the bucket has refilled and dropping it loses
//! nothing.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sqlshield::config::RateLimitConfig;
//! use sqlshield::security::{IpRateLimiter, RateLimitMiddleware};
//! use actix_web::{App, HttpServer, web};
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let limiter = IpRateLimiter::new("auth", RateLimitConfig::auth());
//!
//!     HttpServer::new(move || {
//!         App::new().service(
//!             web::scope("/auth").wrap(RateLimitMiddleware::with_limiter(limiter.clone())),
//!         )
//!     })
//!     .bind("0.0.0.0:3001")?
//!     .run()
//!     .await
//! }
//! ```

use actix_web::{
    Error, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web::Data,
};
use dashmap::DashMap;
use futures_util::future::LocalBoxFuture;
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    middleware::StateInformationMiddleware,
    state::InMemoryState,
    state::direct::NotKeyed,
};
use std::future::{Ready, ready};
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::client_ip;
use crate::config::RateLimitConfig;
use crate::errors::ApiError;
use crate::metrics::AppMetrics;

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, StateInformationMiddleware>;

struct Tracked {
    limiter: Arc<Limiter>,
    last_seen: Instant,
}

/// Per-IP rate limiter with thread-safe tracking
#[derive(Clone)]
pub struct IpRateLimiter {
    name: &'static str,
    limiters: Arc<DashMap<IpAddr, Tracked>>,
    blocked: Arc<DashMap<IpAddr, Instant>>,
    config: RateLimitConfig,
}

impl IpRateLimiter {
    /// `name` labels log lines and the `security_rate_limited_total` counter
    pub fn new(name: &'static str, config: RateLimitConfig) -> Self {
        Self {
            name,
            limiters: Arc::new(DashMap::new()),
            blocked: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.config.requests).unwrap_or(NonZeroU32::MIN);
        let period = Duration::from_secs(self.config.window.max(1)) / burst.get();

        Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst)
    }

    fn limiter(&self, ip: IpAddr) -> Arc<Limiter> {
        let mut tracked = self.limiters.entry(ip).or_insert_with(|| Tracked {
            limiter: Arc::new(
                RateLimiter::direct(self.quota()).with_middleware::<StateInformationMiddleware>(),
            ),
            last_seen: Instant::now(),
        });
        tracked.last_seen = Instant::now();

        tracked.limiter.clone()
    }

    /// Count one request from `ip`; `Err` carries the time until the next
    /// request is allowed
    #[tracing::instrument(skip(self), fields(limiter = self.name, ip = %ip))]
    pub fn check_rate_limit(&self, ip: IpAddr) -> Result<(), Duration> {
        if !self.config.enabled {
            return Ok(());
        }

        match self.limiter(ip).check() {
            Ok(_) => {
                tracing::debug!(ip = %ip, "Request allowed");
                Ok(())
            }
            Err(not_until) => Err(not_until.wait_time_from(DefaultClock::default().now())),
        }
    }

    /// Whether `ip` is blocked by earlier failures, without counting anything
    pub fn check_blocked(&self, ip: IpAddr) -> Result<(), Duration> {
        if !self.config.enabled {
            return Ok(());
        }

        let Some(until) = self.blocked.get(&ip).map(|entry| *entry.value()) else {
            return Ok(());
        };

        let now = Instant::now();
        if now < until {
            return Err(until - now);
        }

        self.blocked.remove_if(&ip, |_, until| *until <= now);
        Ok(())
    }

    /// Count one failed request from `ip`, blocking it once the burst is spent
    #[tracing::instrument(skip(self), fields(limiter = self.name, ip = %ip))]
    pub fn record_failure(&self, ip: IpAddr) {
        if !self.config.enabled {
            return;
        }

        let block_for = match self.limiter(ip).check() {
            Ok(snapshot) if snapshot.remaining_burst_capacity() > 0 => return,
            Ok(_) => self.quota().replenish_interval(),
            Err(not_until) => not_until.wait_time_from(DefaultClock::default().now()),
        };

        tracing::debug!(ip = %ip, block_for = ?block_for, "Failure budget exhausted");
        self.blocked.insert(ip, Instant::now() + block_for);
    }

    /// Pre-request check in the mode this limiter is configured for
    fn admit(&self, ip: IpAddr) -> Result<(), Duration> {
        if self.config.skip_successful {
            self.check_blocked(ip)
        } else {
            self.check_rate_limit(ip)
        }
    }

    /// Drop limiters idle for a whole window and blocks that have expired.
    /// Returns how many entries were removed.
    pub fn prune(&self) -> usize {
        self.prune_at(Instant::now())
    }

    fn prune_at(&self, now: Instant) -> usize {
        let window = Duration::from_secs(self.config.window.max(1));
        let before = self.limiters.len() + self.blocked.len();

        self.limiters
            .retain(|_, tracked| now.saturating_duration_since(tracked.last_seen) < window);
        self.blocked.retain(|_, until| *until > now);

        before.saturating_sub(self.limiters.len() + self.blocked.len())
    }

    /// Number of IPs currently holding limiter state
    pub fn tracked(&self) -> usize {
        self.limiters.len()
    }

    /// Clear limiter for an IP (useful for testing)
    pub fn clear_ip(&self, ip: IpAddr) {
        self.limiters.remove(&ip);
        self.blocked.remove(&ip);
    }

    /// Clear all limiters
    pub fn clear_all(&self) {
        self.limiters.clear();
        self.blocked.clear();
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the current configuration
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

/// Whole seconds for `Retry-After`, rounded up
fn retry_after_secs(wait: Duration) -> u64 {
    (wait.as_secs_f64().ceil() as u64).max(1)
}

/// Rate limiting middleware for actix-web
pub struct RateLimitMiddleware {
    limiter: IpRateLimiter,
}

impl RateLimitMiddleware {
    /// Create a new rate limit middleware with the given configuration
    pub fn new(name: &'static str, config: RateLimitConfig) -> Self {
        Self {
            limiter: IpRateLimiter::new(name, config),
        }
    }

    /// Create a new rate limit middleware with an existing limiter
    pub fn with_limiter(limiter: IpRateLimiter) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

/// Rate limiting middleware service
pub struct RateLimitMiddlewareService<S> {
    service: S,
    limiter: IpRateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let ip = client_ip(req.request());

        if let Err(wait_time) = self.limiter.admit(ip) {
            let retry_after = retry_after_secs(wait_time);

            tracing::warn!(
                target: "security",
                limiter = self.limiter.name(),
                ip = %ip,
                path = %req.path(),
                retry_after = retry_after,
                "Rate limit exceeded, returning 429"
            );

            if let Some(metrics) = req.app_data::<Data<AppMetrics>>() {
                metrics.record_rate_limited(self.limiter.name());
            }

            let response = ApiError::TooManyRequests { retry_after }.error_response();
            return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
        }

        let limiter = self.limiter.clone();
        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;

            if limiter.config().skip_successful && res.status().as_u16() >= 400 {
                limiter.record_failure(ip);
            }

            Ok(res.map_into_left_body())
        })
    }
}
