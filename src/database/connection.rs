/*!
 * The shared SQLite handle behind the repository.
 *
 * One connection serves the vocabulary, transcripts and tags tables. It sits
 * behind a mutex so the blocking parse path (vocabulary get-or-create) and the
 * async controller paths can share it. Async callers go through
 * `execute_async`/`transaction_async`, which hop onto tokio's blocking pool.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::schema;

const DEFAULT_DB_FILENAME: &str = "colloquial.db";

/// Directory under the user's local data directory
const DEFAULT_DB_DIRNAME: &str = "colloquial";

#[derive(Clone)]
pub struct DatabaseConnection {
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open the database under the user's data directory
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_database_path()?)
    }

    /// Open or create the database file, creating missing parent directories.
    ///
    /// The schema is created or migrated before the handle is returned, and
    /// foreign keys are enforced so tags cannot outlive their transcript.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening tag database at {:?}", db_path);
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        Self::from_connection(conn)
    }

    /// A private database that disappears with the handle
    pub fn new_in_memory() -> Result<Self> {
        debug!("Opening in-memory tag database");
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;

        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        schema::initialize_schema(&conn)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/colloquial/colloquial.db`
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Run `f` on the calling thread.
    ///
    /// Used by vocabulary lookups during a parse, which already run on a
    /// blocking thread.
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = lock(&self.connection)?;
        f(&conn)
    }

    /// Run `f` on tokio's blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&connection)?;
            f(&conn)
        })
        .await
        .context("Database task panicked")?
    }

    /// Run `f` in a transaction on tokio's blocking pool.
    ///
    /// The transaction commits only if `f` succeeds; an error rolls back
    /// every statement `f` issued.
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = lock(&connection)?;
            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;

            Ok(result)
        })
        .await
        .context("Database transaction task panicked")?
    }
}

fn lock(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    connection
        .lock()
        .map_err(|e| anyhow!("Failed to acquire database lock: {}", e))
}
