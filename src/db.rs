use diesel::sqlite::SqliteConnection;
use diesel::{ConnectionError, ConnectionResult};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig, PoolError};
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{pooled_connection::bb8::Pool, AsyncConnection, AsyncPgConnection};
use diesel_async::SimpleAsyncConnection;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

pub type SqliteConn = SyncConnectionWrapper<SqliteConnection>;

pub type PgPool = Pool<AsyncPgConnection>;
pub type SqlitePool = Pool<SqliteConn>;

// Applied to every new SQLite connection: writers wait for the lock instead of
// failing immediately, and readers do not block the writer.
const SQLITE_PRAGMAS: &str = "PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL;";

pub async fn create_pg_pool(
    database_url: &str,
    max_size: u32,
) -> Result<PgPool, PoolError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder().max_size(max_size).build(config).await?;

    Ok(pool)
}

pub async fn create_sqlite_pool(
    database_path: &str,
    max_size: u32,
) -> Result<SqlitePool, PoolError> {
    let mut manager_config = ManagerConfig::<SqliteConn>::default();
    manager_config.custom_setup = Box::new(establish_sqlite_connection);

    let config =
        AsyncDieselConnectionManager::<SqliteConn>::new_with_config(database_path, manager_config);
    let pool = Pool::builder().max_size(max_size).build(config).await?;

    Ok(pool)
}

fn establish_sqlite_connection(path: &str) -> BoxFuture<'_, ConnectionResult<SqliteConn>> {
    let path = path.to_string();
    async move {
        let mut conn = SqliteConn::establish(&path).await?;
        conn.batch_execute(SQLITE_PRAGMAS)
            .await
            .map_err(ConnectionError::CouldntSetupConfiguration)?;
        Ok(conn)
    }
    .boxed()
}
