//! SQL connection pool factory and module migration runner.

use std::time::Duration;

use anyhow::Context;
use libris_kernel::{settings::DatabaseSettings, Migration};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

const LEDGER_TABLE_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS _libris_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Open a connection pool and verify the store answers.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    tracing::info!(
        target: "libris-db",
        max_connections = settings.max_connections,
        "connecting to database"
    );

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_millis(settings.connect_timeout_ms))
        .connect(&settings.url)
        .await
        .context("failed to open database")?;

    ping(&pool).await.context("failed to connect to database")?;

    tracing::info!(target: "libris-db", "database connected");
    Ok(pool)
}

/// Round-trip a trivial statement through the pool.
pub async fn ping(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply every migration not yet recorded in the ledger.
///
/// Each migration runs in its own transaction together with its ledger row,
/// so a failing migration leaves no partial state. Returns how many were applied.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::query(LEDGER_TABLE_DDL)
        .execute(pool)
        .await
        .context("failed to create migration ledger")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already_applied: Option<(String,)> =
            sqlx::query_as("SELECT id FROM _libris_migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await
                .context("failed to read migration ledger")?;

        if already_applied.is_some() {
            tracing::debug!(target: "libris-db", %module, id = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
        sqlx::query("INSERT INTO _libris_migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .context("failed to record migration")?;
        tx.commit().await?;

        tracing::info!(target: "libris-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
