use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub mod row_parsers;
pub mod uuid_sql;

pub async fn init(database_url: &str) -> anyhow::Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(database_url)
		.with_context(|| format!("invalid DATABASE_URL: {database_url}"))?
		.create_if_missing(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(10)
		.min_connections(1)
		.acquire_timeout(Duration::from_secs(10))
		.connect_with(options)
		.await
		.context("failed to connect to database")?;

	migrate(&pool).await?;

	Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
	sqlx::migrate!()
		.run(pool)
		.await
		.context("failed to run migrations")
}
