// Copyright 2026. The Nyx Wallet Community
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! A small `r2d2`-pooled sqlite connection, kept minimal since this workspace only ever needs one
//! connection type (§1 "Storage").

use diesel::{
    r2d2::{ConnectionManager, Pool, PooledConnection},
    SqliteConnection,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

#[derive(Debug, Error)]
pub enum SqliteStorageError {
    #[error("failed to build sqlite connection pool: {0}")]
    PoolBuild(String),
    #[error("failed to obtain a pooled sqlite connection: {0}")]
    PoolTimeout(String),
    #[error("failed to run pending migrations: {0}")]
    Migration(String),
    #[error("diesel error: {0}")]
    Diesel(#[from] diesel::result::Error),
}

/// A cloneable handle to a pool of sqlite connections, one pool per wallet database file. Not
/// generic over the connection type: this workspace's only backend is sqlite, so there is nothing
/// to abstract over.
#[derive(Clone)]
pub struct SqliteConnectionPool {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl SqliteConnectionPool {
    /// Opens (creating if absent) the sqlite file at `database_url` and runs any pending
    /// migrations before returning.
    pub fn connect(database_url: &str) -> Result<Self, SqliteStorageError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(8)
            .build(manager)
            .map_err(|e| SqliteStorageError::PoolBuild(e.to_string()))?;
        let connection_pool = SqliteConnectionPool { pool };
        connection_pool.run_migrations()?;
        Ok(connection_pool)
    }

    pub fn get(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, SqliteStorageError> {
        self.pool.get().map_err(|e| SqliteStorageError::PoolTimeout(e.to_string()))
    }

    fn run_migrations(&self) -> Result<(), SqliteStorageError> {
        let mut conn = self.get()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .map_err(|e| SqliteStorageError::Migration(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn connect_runs_migrations_on_a_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.sqlite3");
        let pool = SqliteConnectionPool::connect(path.to_str().unwrap()).unwrap();
        // A second connection from the same pool should see the migrated schema already applied.
        let _conn = pool.get().unwrap();
    }
}
