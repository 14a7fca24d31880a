// Embedded single-file store.
use super::StatsWindow;
use crate::db::{create_sqlite_pool, SqlitePool};
use crate::error_handler::ServiceError;
use crate::models::DailyStat;
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel_async::{RunQueryDsl, SimpleAsyncConnection};

progress_store!(SqliteStore, crate::db::SqliteConn);

const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        parent_id INTEGER,
        time_minutes INTEGER NOT NULL DEFAULT 0,
        position INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS daily_progress (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        task_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT 0,
        time_spent INTEGER NOT NULL DEFAULT 0,
        UNIQUE(task_id, date)
    );

    CREATE TABLE IF NOT EXISTS timer_sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        task_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        duration INTEGER NOT NULL,
        timestamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_timer_sessions_task_date
        ON timer_sessions(task_id, date);
";

const DAILY_STATS_SQL: &str = "SELECT date, \
        COUNT(DISTINCT CASE WHEN completed THEN task_id END) AS completed_tasks, \
        COUNT(DISTINCT task_id) AS total_tasks, \
        COALESCE(SUM(time_spent), 0) AS total_time_seconds \
     FROM daily_progress \
     WHERE date >= ? AND date <= ? \
     GROUP BY date \
     ORDER BY date ASC";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    const BACKEND: &'static str = "sqlite";

    pub async fn connect(path: &str, pool_size: u32) -> Result<Self, ServiceError> {
        log::info!("Opening SQLite store at {}", path);
        let pool = create_sqlite_pool(path, pool_size).await?;
        Ok(SqliteStore { pool })
    }

    async fn prepare_schema(&self) -> Result<(), ServiceError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(SCHEMA_SQL).await?;

        if conn.spawn_blocking(blocking::seed_default_tasks).await? {
            log::info!("Seeded default tasks");
        }
        Ok(())
    }

    async fn load_daily_stats(&self, window: &StatsWindow) -> Result<Vec<DailyStat>, ServiceError> {
        let mut conn = self.pool.get().await?;

        let query = sql_query(DAILY_STATS_SQL)
            .bind::<Text, _>(&window.from)
            .bind::<Text, _>(&window.to);
        log::debug!("Executing SQL for daily stats: {:?}", query);

        Ok(query.load::<DailyStat>(&mut conn).await?)
    }
}

mod blocking {
    use crate::schema::tasks;
    use crate::seed::DEFAULT_TASKS;
    use diesel::prelude::*;
    use diesel::sqlite::SqliteConnection;

    // BEGIN IMMEDIATE takes the write lock before the count, so two processes
    // starting on the same empty file cannot both see zero rows.
    pub(super) fn seed_default_tasks(conn: &mut SqliteConnection) -> QueryResult<bool> {
        conn.immediate_transaction(|conn| {
            let existing: i64 = tasks::table.count().get_result(conn)?;
            if existing > 0 {
                return Ok(false);
            }

            for task in DEFAULT_TASKS.iter() {
                diesel::insert_into(tasks::table).values(task).execute(conn)?;
            }
            Ok(true)
        })
    }
}
