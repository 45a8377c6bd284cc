use crate::metrics::AppMetrics;
use crate::middlewares::v1::auth::SessionRegistry;
use crate::responses::v1::auth::Success;

/// Drop the session behind `token`, if there is one. Always succeeds.
#[tracing::instrument(skip_all, fields(has_token = token.is_some()))]
pub fn logout(sessions: &SessionRegistry, metrics: &AppMetrics, token: Option<&str>) -> Success {
    if let Some(token) = token {
        if sessions.remove(token) {
            tracing::info!("Session destroyed");
        }
        metrics.set_active_sessions(sessions.len());
    }

    Success::default()
}
