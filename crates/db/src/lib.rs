//! SQLite client factory and migration tooling for SHELF.
//!
//! All durable state lives behind the [`Db`] handle. The handle is created
//! once at startup and passed explicitly to modules and route state; nothing
//! in this crate holds ambient global connections.

use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// A single schema migration contributed by a module.
///
/// `up` must be a single SQLite statement; the runner executes each
/// migration exactly once and records it in the `_migrations` ledger.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Cloneable handle around the process-wide SQLite pool.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Connect to the database at `url` (e.g. `sqlite://store.db`), creating
    /// the file when it does not exist yet.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url '{url}'"))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open database at '{url}'"))?;

        tracing::info!(target: "shelf-db", %url, max_connections, "database pool ready");

        Ok(Self { pool })
    }

    /// Open an in-memory database on a single connection.
    ///
    /// In-memory SQLite databases are per-connection, so the pool is capped
    /// at one connection to keep every query on the same database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("failed to parse in-memory database url")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("failed to open in-memory database")?;

        Ok(Self { pool })
    }

    /// Access the underlying pool for query execution.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply module-contributed migrations that have not run yet.
    ///
    /// Each entry pairs the owning module's name with its migration. Applied
    /// migrations are recorded in `_migrations`, keyed by `(module, id)`, so
    /// reruns at every startup are no-ops.
    pub async fn run_migrations(&self, migrations: &[(String, Migration)]) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                module TEXT NOT NULL,
                id     TEXT NOT NULL,
                PRIMARY KEY (module, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to create migration ledger")?;

        for (module, migration) in migrations {
            let applied: Option<(String,)> = sqlx::query_as(
                "SELECT id FROM _migrations WHERE module = ?1 AND id = ?2",
            )
            .bind(module)
            .bind(migration.id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to read migration ledger")?;

            if applied.is_some() {
                tracing::debug!(
                    target: "shelf-db",
                    module,
                    migration = migration.id,
                    "migration already applied"
                );
                continue;
            }

            sqlx::query(migration.up)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!("failed to apply migration '{}/{}'", module, migration.id)
                })?;

            sqlx::query("INSERT INTO _migrations (module, id) VALUES (?1, ?2)")
                .bind(module)
                .bind(migration.id)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!("failed to record migration '{}/{}'", module, migration.id)
                })?;

            tracing::info!(
                target: "shelf-db",
                module,
                migration = migration.id,
                "migration applied"
            );
        }

        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books_migration() -> (String, Migration) {
        (
            "books".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE IF NOT EXISTS books (id INTEGER PRIMARY KEY AUTOINCREMENT, title VARCHAR(255) NOT NULL)",
            },
        )
    }

    #[tokio::test]
    async fn in_memory_database_accepts_queries() {
        let db = Db::in_memory().await.unwrap();
        let row: (i64,) = sqlx::query_as("SELECT 1").fetch_one(db.pool()).await.unwrap();
        assert_eq!(row.0, 1);
    }

    #[tokio::test]
    async fn migrations_apply_once() {
        let db = Db::in_memory().await.unwrap();
        let migrations = vec![books_migration()];

        db.run_migrations(&migrations).await.unwrap();
        // Second run must be a no-op, not a failure.
        db.run_migrations(&migrations).await.unwrap();

        let ledger: Vec<(String, String)> = sqlx::query_as("SELECT module, id FROM _migrations")
            .fetch_all(db.pool())
            .await
            .unwrap();
        assert_eq!(ledger, vec![("books".to_string(), "001_init".to_string())]);

        sqlx::query("INSERT INTO books (title) VALUES ('proof the table exists')")
            .execute(db.pool())
            .await
            .unwrap();
    }
}
