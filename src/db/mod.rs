use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use dotenvy::dotenv;
use rocket::http::Status;
use rocket::request::{self, FromRequest, Request};
use rocket::State;
use std::env;
use std::ops::{Deref, DerefMut};

pub mod schema;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

// An alias to the type for a pool of Diesel SQLite connections.
pub type Pool = diesel::r2d2::Pool<ConnectionManager<SqliteConnection>>;

pub struct DbConn(pub PooledConnection<ConnectionManager<SqliteConnection>>);

// SQLite ships with foreign keys off; every pooled connection needs the
// pragma before it may touch the likes table.
#[derive(Debug)]
struct SqliteOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Attempts to retrieve a single connection from the managed database pool.
/// If no pool is currently managed, fails with an `InternalServerError`
/// status. If no connections are available, fails with a `ServiceUnavailable`
/// status.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for DbConn {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<DbConn, ()> {
        let pool = match request.guard::<&State<Pool>>().await {
            request::Outcome::Success(pool) => pool,
            _ => return request::Outcome::Error((Status::InternalServerError, ())),
        };
        match pool.get() {
            Ok(conn) => request::Outcome::Success(DbConn(conn)),
            Err(_) => request::Outcome::Error((Status::ServiceUnavailable, ())),
        }
    }
}

// For the convenience of using a &mut DbConn as a &mut SqliteConnection.
impl Deref for DbConn {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DbConn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

pub fn database_url() -> String {
    dotenv().ok();
    env::var("DATABASE_URL").unwrap_or_else(|_| "cafehub.db".into())
}

pub fn init_pool(database_url: &str) -> Result<Pool, diesel::r2d2::PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(SqliteOptions))
        .build(manager)
}

/// Unpooled connection for the seeder and for model tests.
pub fn establish(database_url: &str) -> ConnectionResult<SqliteConnection> {
    let mut conn = SqliteConnection::establish(database_url)?;
    conn.batch_execute("PRAGMA foreign_keys = ON;")
        .map_err(ConnectionError::CouldntSetupConfiguration)?;
    Ok(conn)
}

pub fn run_migrations(conn: &mut SqliteConnection) {
    conn.run_pending_migrations(MIGRATIONS)
        .expect("database migrations failed");
}

#[cfg(test)]
pub fn test_conn() -> SqliteConnection {
    let mut conn = establish(":memory:").expect("in-memory database");
    run_migrations(&mut conn);
    conn
}
