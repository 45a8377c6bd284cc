pub mod guard;
pub mod password;
pub mod rate_limit;
pub mod validation;

use std::net::{IpAddr, Ipv4Addr};

use actix_web::HttpRequest;

pub use guard::{Field, GuardRejection, GuardedJson, GuardedQuery, InputGuard, Screened};
pub use password::{HashAlgorithm, PasswordHasher, StoredPassword};
pub use rate_limit::{IpRateLimiter, RateLimitMiddleware};
pub use validation::Rule;

/// Client address: the peer address, then the first `X-Forwarded-For`
/// entry, then loopback
pub fn client_ip(req: &HttpRequest) -> IpAddr {
    req.peer_addr().map(|addr| addr.ip()).unwrap_or_else(|| {
        req.headers()
            .get("X-Forwarded-For")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
    })
}
