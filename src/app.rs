//! Process bootstrap: database, modules, migrations, and the HTTP server.

use anyhow::Context;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

use crate::modules;

/// Registry with every application module wired to `pool`.
pub fn build_registry(pool: &SqlitePool) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, pool)?;
    Ok(registry)
}

async fn apply_migrations(registry: &ModuleRegistry, pool: &SqlitePool) -> anyhow::Result<usize> {
    let migrations = registry.collect_migrations();
    let applied = libris_db::run_migrations(pool, &migrations)
        .await
        .context("failed to apply migrations")?;

    tracing::info!(
        applied,
        known = migrations.len(),
        "migrations up to date"
    );
    Ok(applied)
}

/// Connect and apply pending migrations, returning how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let pool = libris_db::connect(&settings.database).await?;
    let registry = build_registry(&pool)?;

    let applied = apply_migrations(&registry, &pool).await;
    pool.close().await;
    applied
}

/// Run the service until a shutdown signal arrives.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let pool = libris_db::connect(&settings.database).await?;
    let registry = build_registry(&pool)?;

    if settings.database.run_migrations {
        apply_migrations(&registry, &pool).await?;
    }

    let ctx = InitCtx {
        settings: &settings,
        db: &pool,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = libris_http::start_server(&registry, &settings).await;

    registry.stop_modules().await?;
    pool.close().await;
    tracing::info!("libris-app shut down");

    served
}
