use quizdesk_migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

pub async fn init_pool_and_migrate(
    options: impl Into<ConnectOptions>,
) -> anyhow::Result<DatabaseConnection> {
    let db = Database::connect(options).await?;

    Migrator::up(&db, None).await?;
    info!("database migrations applied");

    Ok(db)
}
