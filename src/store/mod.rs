// Storage interface for tasks, daily progress and timer sessions.
//
// One implementation per database backend. The backend is chosen once in
// `connect`; handlers only ever see `dyn ProgressStore`.
use crate::config::{AppConfig, StoreLocation};
use crate::error_handler::ServiceError;
use crate::models::{DailyStat, ProgressEntry, Task, TimerSession, WeeklyStat};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;

#[macro_use]
mod queries;
pub mod postgres;
pub mod sqlite;

pub use postgres::PgStore;
pub use sqlite::SqliteStore;

pub const WEEKLY_WINDOW_DAYS: i64 = 7;
pub const DAILY_WINDOW_DAYS: i64 = 30;

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Short backend name reported by the health check.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), ServiceError>;

    /// Creates missing tables and seeds the default tasks into an empty store.
    /// Safe to run on every start.
    async fn init_schema(&self) -> Result<(), ServiceError>;

    /// All tasks ordered by `position`, then `id`.
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError>;

    /// Overwrites `time_minutes`. Returns the number of rows touched, which is
    /// zero for an unknown id.
    async fn update_task_time(&self, task_id: i32, time_minutes: i32)
        -> Result<usize, ServiceError>;

    async fn progress_for_date(&self, date: NaiveDate) -> Result<Vec<ProgressEntry>, ServiceError>;

    /// Flips `completed` for (task, date), creating the row as completed when
    /// absent. Atomic.
    async fn toggle_progress(&self, task_id: i32, date: NaiveDate) -> Result<(), ServiceError>;

    /// Logs a session and adds its duration to the day's `time_spent` in one
    /// transaction.
    async fn record_timer_session(
        &self,
        task_id: i32,
        date: NaiveDate,
        duration: i32,
    ) -> Result<(), ServiceError>;

    /// Logged sessions for (task, date) in insertion order.
    async fn timer_sessions(
        &self,
        task_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<TimerSession>, ServiceError>;

    async fn weekly_stats(&self, today: NaiveDate) -> Result<Vec<WeeklyStat>, ServiceError>;

    async fn daily_stats(&self, today: NaiveDate) -> Result<Vec<DailyStat>, ServiceError>;
}

pub type SharedStore = Arc<dyn ProgressStore>;

/// Opens the store named by the configuration.
pub async fn connect(config: &AppConfig) -> Result<SharedStore, ServiceError> {
    let store: SharedStore = match &config.store {
        StoreLocation::Postgres(url) => Arc::new(PgStore::connect(url, config.pool_size).await?),
        StoreLocation::Sqlite(path) => {
            Arc::new(SqliteStore::connect(path, config.pool_size).await?)
        }
    };
    log::info!("Connected to {} store", store.backend());
    Ok(store)
}

/// Inclusive date range ending today, compared as ISO strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsWindow {
    pub from: String,
    pub to: String,
}

impl StatsWindow {
    pub fn trailing(today: NaiveDate, days: i64) -> Self {
        StatsWindow {
            from: iso_date(today - Duration::days(days)),
            to: iso_date(today),
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        self.from.as_str() <= date && date <= self.to.as_str()
    }
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
