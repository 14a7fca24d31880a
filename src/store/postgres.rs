// Networked PostgreSQL store.
use super::StatsWindow;
use crate::db::{create_pg_pool, PgPool};
use crate::error_handler::ServiceError;
use crate::models::DailyStat;
use crate::schema::tasks;
use crate::seed::DEFAULT_TASKS;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl, SimpleAsyncConnection};

progress_store!(PgStore, diesel_async::AsyncPgConnection);

const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS tasks (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        parent_id INTEGER,
        time_minutes INTEGER NOT NULL DEFAULT 0,
        position INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS daily_progress (
        id SERIAL PRIMARY KEY,
        task_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT false,
        time_spent INTEGER NOT NULL DEFAULT 0,
        UNIQUE(task_id, date)
    );

    CREATE TABLE IF NOT EXISTS timer_sessions (
        id SERIAL PRIMARY KEY,
        task_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        duration INTEGER NOT NULL,
        timestamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_timer_sessions_task_date
        ON timer_sessions(task_id, date);
";

// Held until the seeding transaction ends; concurrent starts queue here
// instead of both inserting into an empty table.
const LOCK_TASKS_SQL: &str = "LOCK TABLE tasks IN SHARE ROW EXCLUSIVE MODE";

// Seed rows carry explicit ids, which SERIAL does not see.
const SYNC_TASK_SEQUENCE_SQL: &str =
    "SELECT setval(pg_get_serial_sequence('tasks', 'id'), (SELECT MAX(id) FROM tasks))";

const DAILY_STATS_SQL: &str = "SELECT date, \
        COUNT(DISTINCT CASE WHEN completed THEN task_id END) AS completed_tasks, \
        COUNT(DISTINCT task_id) AS total_tasks, \
        COALESCE(SUM(time_spent), 0)::BIGINT AS total_time_seconds \
     FROM daily_progress \
     WHERE date >= $1 AND date <= $2 \
     GROUP BY date \
     ORDER BY date ASC";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    const BACKEND: &'static str = "postgres";

    pub async fn connect(database_url: &str, pool_size: u32) -> Result<Self, ServiceError> {
        log::info!("Connecting to PostgreSQL store");
        let pool = create_pg_pool(database_url, pool_size).await?;
        Ok(PgStore { pool })
    }

    async fn prepare_schema(&self) -> Result<(), ServiceError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(SCHEMA_SQL).await?;

        if seed_default_tasks(&mut conn).await? {
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

async fn seed_default_tasks(conn: &mut AsyncPgConnection) -> QueryResult<bool> {
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        async move {
            sql_query(LOCK_TASKS_SQL).execute(conn).await?;

            let existing: i64 = tasks::table.count().get_result(conn).await?;
            if existing > 0 {
                return Ok(false);
            }

            for task in DEFAULT_TASKS.iter() {
                diesel::insert_into(tasks::table)
                    .values(task)
                    .execute(conn)
                    .await?;
            }
            sql_query(SYNC_TASK_SEQUENCE_SQL).execute(conn).await?;
            Ok(true)
        }
        .scope_boxed()
    })
    .await
}
