use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Creates and returns a SQLite connection pool, creating the database
/// file on first run.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Opening SQLite database at {database_url}...");

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    // An in-memory database exists per connection; a pool of one keeps a
    // single schema visible to every query (dev and tests).
    let max_connections = if database_url.contains(":memory:") { 1 } else { 10 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Creates the schema if it does not exist yet. Runs at startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contracts (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            store              TEXT NOT NULL,
            prenom             TEXT NOT NULL DEFAULT '',
            nom                TEXT NOT NULL DEFAULT '',
            date_naissance     TEXT NOT NULL DEFAULT '',
            lieu_naissance     TEXT NOT NULL DEFAULT '',
            adresse            TEXT NOT NULL DEFAULT '',
            nationalite        TEXT NOT NULL DEFAULT '',
            numero_secu        TEXT NOT NULL DEFAULT '',
            date_debut         TEXT NOT NULL DEFAULT '',
            status             TEXT NOT NULL DEFAULT 'created',
            generated_doc_path TEXT,
            created_at         TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contracts_store ON contracts(store)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contracts_status ON contracts(status)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contracts_created_at ON contracts(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}
