// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use miette::Diagnostic;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const WARNINGS_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/warnings");
pub const TICKETS_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/tickets");

/// How long a connection waits on another connection's write lock before giving up, in milliseconds.
const BUSY_TIMEOUT_MS: u32 = 5000;

// To get boxed errors (as returned by the migration runner) into miette, we need a wrapper type for them.
#[derive(Debug, Diagnostic)]
pub struct MigrationError(pub Box<dyn Error + Send + Sync>);

impl fmt::Display for MigrationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

impl Error for MigrationError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		self.0.source()
	}
}

#[derive(Debug, Diagnostic, Error)]
pub enum StoreError {
	#[error("the store at {path} could not be opened")]
	#[diagnostic(code(warden::store::unavailable), help("check that the database path is writable"))]
	Unavailable {
		path: String,
		#[source]
		source: ConnectionError,
	},
	#[error("a query against the store failed")]
	#[diagnostic(code(warden::store::query))]
	Query(#[from] diesel::result::Error),
	#[error("the store's tables could not be created")]
	#[diagnostic(code(warden::store::migration))]
	Migration(#[from] MigrationError),
	#[error("the storage task ended before completing")]
	#[diagnostic(code(warden::store::task))]
	Task(#[from] tokio::task::JoinError),
}

/// A durable SQLite store.
///
/// No connection is held between operations. Every call to [Self::run] opens a fresh connection on the blocking
/// thread pool, hands it to the operation, and drops it when the operation returns, whether it succeeded or not.
#[derive(Clone, Debug)]
pub struct Store {
	path: Arc<str>,
}

impl Store {
	pub fn new(path: &str) -> Self {
		Self { path: Arc::from(path) }
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	fn connect(&self) -> Result<SqliteConnection, StoreError> {
		let mut db_connection = SqliteConnection::establish(&self.path).map_err(|source| StoreError::Unavailable {
			path: self.path.to_string(),
			source,
		})?;
		db_connection.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))?;
		Ok(db_connection)
	}

	/// Runs a storage operation against a short-lived connection without blocking the async runtime.
	pub async fn run<T, F>(&self, operation: F) -> Result<T, StoreError>
	where
		T: Send + 'static,
		F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError> + Send + 'static,
	{
		let store = self.clone();
		tokio::task::spawn_blocking(move || {
			let mut db_connection = store.connect()?;
			operation(&mut db_connection)
		})
		.await?
	}

	/// Creates any missing tables. Safe to call on every startup.
	pub async fn initialize(&self, migrations: EmbeddedMigrations) -> Result<(), StoreError> {
		self.run(move |db_connection| {
			run_embedded_migrations(db_connection, migrations)?;
			Ok(())
		})
		.await
	}
}

pub fn run_embedded_migrations(
	db_connection: &mut SqliteConnection,
	migrations: EmbeddedMigrations,
) -> Result<(), MigrationError> {
	match db_connection.run_pending_migrations(migrations) {
		Ok(_) => Ok(()),
		Err(error) => Err(MigrationError(error)),
	}
}

#[cfg(test)]
pub(crate) mod test_support {
	use super::Store;
	use std::path::PathBuf;

	/// A store backed by a throwaway file in the system temp directory, removed on drop.
	pub struct TempStore {
		pub store: Store,
		path: PathBuf,
	}

	impl TempStore {
		pub fn new(prefix: &str) -> Self {
			let path = std::env::temp_dir().join(format!("{}-{}.db", prefix, cuid2::create_id()));
			let store = Store::new(path.to_str().expect("temp path is UTF-8"));
			Self { store, path }
		}
	}

	impl Drop for TempStore {
		fn drop(&mut self) {
			let _ = std::fs::remove_file(&self.path);
		}
	}
}
