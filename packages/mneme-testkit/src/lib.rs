//! Throwaway Postgres databases and Qdrant collections for the live tests.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, sync::Mutex, time::Duration};

use qdrant_client::Qdrant;
use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::time;
use uuid::Uuid;

const ADMIN_DATABASE: &str = "postgres";
const QDRANT_TIMEOUT: Duration = Duration::from_secs(10);

/// A uniquely named database on the `MNEME_PG_DSN` server. Call [`TestDatabase::cleanup`] when
/// the test is done with it.
pub struct TestDatabase {
	name: String,
	dsn: String,
	admin: PgConnectOptions,
	collections: Mutex<Vec<String>>,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Failed to parse MNEME_PG_DSN: {err}.")))?;
		let admin = base.clone().database(ADMIN_DATABASE);
		let name = format!("mneme_test_{}", Uuid::new_v4().simple());
		let mut conn = PgConnection::connect_with(&admin).await?;

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
			.await
			.map_err(|err| Error::Message(format!("Failed to create test database: {err}.")))?;
		conn.close().await?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin, collections: Mutex::new(Vec::new()) })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// A Qdrant collection name unique to this database. It is deleted by `cleanup`.
	pub fn collection_name(&self, prefix: &str) -> String {
		let collection = format!("{prefix}_{}", self.name);

		self.collections.lock().unwrap_or_else(|err| err.into_inner()).push(collection.clone());

		collection
	}

	pub async fn cleanup(self) -> Result<()> {
		let collections = self.collections.into_inner().unwrap_or_else(|err| err.into_inner());

		drop_collections(&collections).await?;

		let mut conn = PgConnection::connect_with(&self.admin).await?;

		sqlx::query(
			"\
SELECT pg_terminate_backend(pid)
FROM pg_stat_activity
WHERE datname = $1 AND pid <> pg_backend_pid()",
		)
		.bind(self.name.as_str())
		.fetch_all(&mut conn)
		.await?;
		conn.execute(format!(r#"DROP DATABASE IF EXISTS "{}""#, self.name).as_str())
			.await
			.map_err(|err| Error::Message(format!("Failed to drop test database: {err}.")))?;

		Ok(())
	}
}

pub fn env_dsn() -> Option<String> {
	env::var("MNEME_PG_DSN").ok()
}

pub fn env_qdrant_url() -> Option<String> {
	env::var("MNEME_QDRANT_URL").ok()
}

async fn drop_collections(collections: &[String]) -> Result<()> {
	if collections.is_empty() {
		return Ok(());
	}

	let Some(qdrant_url) = env_qdrant_url() else {
		return Ok(());
	};
	let client = Qdrant::from_url(&qdrant_url).build()?;

	for collection in collections {
		time::timeout(QDRANT_TIMEOUT, client.delete_collection(collection.clone()))
			.await
			.map_err(|_| {
				Error::Message(format!("Timed out deleting Qdrant collection {collection:?}."))
			})??;
	}

	Ok(())
}
