pub mod models;
pub mod operations;

use anyhow::{Context, Result};
use log::{debug, info};
use sqlx::SqlitePool;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::OnceCell;

static DB_PATH: OnceCell<String> = OnceCell::const_new();

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database location: the explicitly configured path, else `DATABASE_URL`.
pub async fn get_db_path() -> Result<&'static String> {
    DB_PATH
        .get_or_try_init(async || {
            env::var("DATABASE_URL")
                .context("DATABASE_URL must be specified or present in the environment")
        })
        .await
}

pub async fn set_db_path(path: &str) -> Result<()> {
    DB_PATH
        .set(path.to_string())
        .map_err(|e| anyhow::anyhow!(format!("Failed to set DB_PATH: {:?}", e)))
}

/// Opens (creating if needed) the SQLite file at `db_path` and brings the schema up to date.
///
/// WAL, `synchronous = NORMAL` and the busy timeout are set on the connect
/// options so every pooled connection gets them.
pub async fn connect(db_path: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePool::connect_with(options)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create DB pool: {}", e))?;

    init_database(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database, used by tests and throwaway sessions.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    init_database(&pool).await?;
    Ok(pool)
}

pub async fn drop_all_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM nutrition_meals")
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM nutrition_plans")
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM machine_recommendations")
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM performances").execute(pool).await?;
    sqlx::query("DELETE FROM goals").execute(pool).await?;
    sqlx::query("DELETE FROM exercises").execute(pool).await?;
    sqlx::query("DELETE FROM machines").execute(pool).await?;
    sqlx::query("DELETE FROM users").execute(pool).await?;
    sqlx::query("DELETE FROM settings").execute(pool).await?;
    Ok(())
}

struct Migration {
    name: &'static str,
    up_sql: &'static str,
}

const MIGRATION_2026_10_01_090000_0000_SETUP_TABLES: &str =
    include_str!("../../../migrations/2026-10-01-090000-0000_setup_tables/up.sql");

const MIGRATION_2026_10_15_090000_0000_MACHINE_GUIDANCE: &str =
    include_str!("../../../migrations/2026-10-15-090000-0000_machine_guidance/up.sql");

const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "2026-10-01-090000-0000_setup_tables",
        up_sql: MIGRATION_2026_10_01_090000_0000_SETUP_TABLES,
    },
    Migration {
        name: "2026-10-15-090000-0000_machine_guidance",
        up_sql: MIGRATION_2026_10_15_090000_0000_MACHINE_GUIDANCE,
    },
];

async fn init_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER NOT NULL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn is_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<bool> {
    let result =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _migrations WHERE name = ?1")
            .bind(migration_name)
            .fetch_one(pool)
            .await?;
    Ok(result > 0)
}

async fn mark_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<()> {
    sqlx::query("INSERT INTO _migrations (name) VALUES (?1)")
        .bind(migration_name)
        .execute(pool)
        .await?;
    Ok(())
}

fn parse_sql_statements(sql: &str) -> Vec<String> {
    sql.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub async fn init_database(pool: &SqlitePool) -> Result<()> {
    init_migrations_table(pool).await?;

    for migration in MIGRATIONS {
        if is_migration_applied(pool, migration.name).await? {
            debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        info!("Applying migration: {}", migration.name);
        for statement in parse_sql_statements(migration.up_sql) {
            sqlx::query(&statement).execute(pool).await.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to execute migration statement in {}: {} - Error: {}",
                    migration.name,
                    statement,
                    e
                )
            })?;
        }

        mark_migration_applied(pool, migration.name).await?;
        info!("Migration {} applied successfully", migration.name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_statements_skip_comments_and_blanks() {
        let sql = "-- header\nCREATE TABLE a (x INTEGER);\n\n  -- note\nCREATE TABLE b (y TEXT);\n";
        let statements = parse_sql_statements(sql);
        assert_eq!(
            statements,
            vec!["CREATE TABLE a (x INTEGER)", "CREATE TABLE b (y TEXT)"]
        );
    }

    #[tokio::test]
    async fn migrations_apply_once() {
        let pool = connect_in_memory().await.unwrap();
        init_database(&pool).await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(applied, MIGRATIONS.len() as i64);
    }

    #[tokio::test]
    async fn every_file_connection_gets_the_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smartgym.db");
        let pool = connect(path.to_str().unwrap()).await.unwrap();

        // two connections held at once are necessarily distinct
        let mut first = pool.acquire().await.unwrap();
        let mut second = pool.acquire().await.unwrap();
        for conn in [&mut first, &mut second] {
            let journal: String = sqlx::query_scalar("PRAGMA journal_mode")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            let synchronous: i64 = sqlx::query_scalar("PRAGMA synchronous")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            let busy_timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            assert_eq!(journal, "wal");
            assert_eq!(synchronous, 1);
            assert_eq!(busy_timeout, 5000);
        }
    }
}
