pub mod todo_model;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection};
use diesel::SqliteConnection;

pub type Pool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT_MS: u32 = 5_000;

const CREATE_TODOS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL
    );
    CREATE INDEX IF NOT EXISTS todos_created_at_idx ON todos (created_at DESC, id DESC);
";

/// Applied to every connection the pool opens
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON;",
            self.busy_timeout_ms
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Build a connection pool over the sqlite file at `database_url`
pub fn build_pool(database_url: &str, max_size: u32) -> Result<Pool, r2d2::Error> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);

    r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout_ms: BUSY_TIMEOUT_MS,
        }))
        .build(manager)
}

/// Create the `todos` table if it does not exist yet
pub fn init_database(pool: &Pool) -> anyhow::Result<()> {
    let conn = pool.get()?;

    conn.batch_execute(CREATE_TODOS_TABLE)?;

    log::info!("Database initialised");

    Ok(())
}

/// Single-connection in-memory store, every checkout sees the same database
#[cfg(test)]
pub fn test_pool() -> Pool {
    let pool = build_pool(":memory:", 1).expect("in-memory pool");
    init_database(&pool).expect("create todos table");
    pool
}
