use sea_orm::{Database, DatabaseConnection, DbErr};
use sqlshield_migration::{Migrator, MigratorTrait};

use crate::config::DatabaseConfig;

/// The two connection pools behind [`super::Reader`] and [`super::Writer`]
#[derive(Clone, Debug)]
pub struct DatabasePools {
    pub read: DatabaseConnection,
    pub write: DatabaseConnection,
}

impl DatabasePools {
    /// Both capabilities over one connection. Used by tests and single-URL setups.
    pub fn shared(db: DatabaseConnection) -> Self {
        Self {
            read: db.clone(),
            write: db,
        }
    }
}

/// Open the read and write pools, applying migrations through the write pool
/// when `run_migrations` is set. Identical URLs share one pool.
#[tracing::instrument(skip(config), fields(run_migrations = config.run_migrations))]
pub async fn connect(config: &DatabaseConfig) -> Result<DatabasePools, DbErr> {
    let write = Database::connect(config.write_options()).await?;

    if config.run_migrations {
        Migrator::up(&write, None).await?;
        tracing::info!("Database migrations applied");
    }

    if config.read_url == config.write_url {
        tracing::debug!("Read and write pools share one connection URL");
        return Ok(DatabasePools::shared(write));
    }

    let read = Database::connect(config.read_options()).await?;
    tracing::info!("Database pools connected");

    Ok(DatabasePools { read, write })
}
