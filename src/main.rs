use actix_web::{App, HttpServer, middleware::Logger};
use anyhow::Context;

use sqlshield::metrics::{AppMetrics, MetricsMiddleware};
use sqlshield::state::AppState;
use sqlshield::{config, database, logging, router};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load().context("Failed to load configuration")?;
    logging::init(&config.observability).context("Failed to initialize logging")?;

    tracing::info!(
        name = %config.app.name,
        environment = %config.app.environment,
        guard = ?config.security.input_guard,
        "Starting service"
    );

    let pools = database::connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    let metrics = AppMetrics::with_config(Some(&config));
    let state = AppState::with_pools(config.clone(), pools, metrics)
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 parameters: {e}"))?;

    let sweeper = state.start_sweeper();

    let server_state = state.clone();
    let mut server = HttpServer::new(move || {
        let state = server_state.clone();
        App::new()
            .wrap(MetricsMiddleware::new(state.metrics.clone()))
            .wrap(Logger::default())
            .configure(move |app| router::route(app, &state))
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let address = (config.server.host.as_str(), config.server.port);
    tracing::info!(host = %address.0, port = address.1, prefix = %config.app.prefix, "Listening");

    let result = server
        .bind(address)
        .with_context(|| format!("Failed to bind {}:{}", address.0, address.1))?
        .run()
        .await;

    sweeper.shutdown().await;
    tracing::info!("Server stopped");

    result.context("Server terminated with an error")
}
