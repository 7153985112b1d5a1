// src/db.rs

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::{config::Config, error::QuizResult};

const CONNECT_RETRIES: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Opens the connection pool, retrying while the database is not reachable.
///
/// Foreign keys are always enforced. In-memory databases keep their
/// connections alive, since closing the last one drops the data.
pub async fn connect(config: &Config) -> QuizResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .foreign_keys(true)
        .create_if_missing(true)
        .busy_timeout(config.transaction_timeout);

    let in_memory = config.database_url.contains(":memory:");
    let mut retry_count = 0;

    loop {
        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);
        if in_memory {
            pool_options = pool_options
                .idle_timeout(Option::<Duration>::None)
                .max_lifetime(Option::<Duration>::None);
        }

        match pool_options.connect_with(options.clone()).await {
            Ok(pool) => return Ok(pool),
            Err(e) => {
                retry_count += 1;
                if retry_count > CONNECT_RETRIES {
                    tracing::error!("Failed to connect to database after {} retries", CONNECT_RETRIES);
                    return Err(e.into());
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &SqlitePool) -> QuizResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Opens a transaction that holds the write lock from its first statement.
///
/// A deferred transaction that reads before writing fails with
/// `database is locked` when another connection wrote in between;
/// `BEGIN IMMEDIATE` waits on the busy timeout instead.
pub async fn begin_write(pool: &SqlitePool) -> QuizResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}
