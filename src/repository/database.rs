use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Executor, SqlitePool};
use std::path::PathBuf;

use crate::config::AppConfig;

pub async fn init_db(config: &AppConfig) -> Result<SqlitePool> {
    let mut database_path = PathBuf::from(std::env::current_dir()?);
    database_path.push(&config.database.path);

    tracing::info!("database path: {:?}", database_path);

    if !database_path.exists() {
        std::fs::File::create(&database_path).context("Failed to create database file")?;
    }

    let database_url = format!(
        "sqlite://{}",
        database_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid database path"))?
    );

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// 建表，测试里也会对内存库调用
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        "#,
    )
    .await
    .context("Failed to create users table")?;

    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            priority TEXT NOT NULL DEFAULT 'low',
            status TEXT NOT NULL DEFAULT 'open',
            created_at INTEGER NOT NULL
        );
        "#,
    )
    .await
    .context("Failed to create tasks table")?;

    pool.execute("CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks(owner_id)")
        .await
        .context("Failed to create tasks index")?;

    Ok(())
}
