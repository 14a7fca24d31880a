// Query bodies and trait plumbing that read the same in both dialects. Each
// store expands this once for its own type and connection; diesel renders the
// backend-specific SQL.
//
// The expanding store must have a `pool` field and provide:
//   const BACKEND: &'static str
//   async fn prepare_schema(&self) -> Result<(), ServiceError>
//   async fn load_daily_stats(&self, &StatsWindow) -> Result<Vec<DailyStat>, ServiceError>

macro_rules! progress_store {
    ($store:ty, $conn:ty) => {
        mod shared {
            use $crate::models::{
                NewDailyProgress, NewTimerSession, ProgressEntry, Task, TimerSession, WeeklyStat,
            };
            use $crate::schema::{daily_progress, tasks, timer_sessions};
            use $crate::store::StatsWindow;
            use diesel::dsl::{count_distinct, not};
            use diesel::prelude::*;
            use diesel_async::scoped_futures::ScopedFutureExt;
            use diesel_async::{AsyncConnection, RunQueryDsl};

            type Conn = $conn;

            pub(super) async fn list_tasks(conn: &mut Conn) -> QueryResult<Vec<Task>> {
                tasks::table
                    .select(Task::as_select())
                    .order((tasks::position.asc(), tasks::id.asc()))
                    .load::<Task>(conn)
                    .await
            }

            pub(super) async fn update_task_time(
                conn: &mut Conn,
                task_id: i32,
                time_minutes: i32,
            ) -> QueryResult<usize> {
                diesel::update(tasks::table.filter(tasks::id.eq(task_id)))
                    .set(tasks::time_minutes.eq(time_minutes))
                    .execute(conn)
                    .await
            }

            pub(super) async fn progress_for_date(
                conn: &mut Conn,
                date: &str,
            ) -> QueryResult<Vec<ProgressEntry>> {
                daily_progress::table
                    .filter(daily_progress::date.eq(date))
                    .order(daily_progress::task_id.asc())
                    .select(ProgressEntry::as_select())
                    .load::<ProgressEntry>(conn)
                    .await
            }

            pub(super) async fn toggle_progress(
                conn: &mut Conn,
                task_id: i32,
                date: &str,
            ) -> QueryResult<usize> {
                diesel::insert_into(daily_progress::table)
                    .values(&NewDailyProgress {
                        task_id,
                        date,
                        completed: true,
                        time_spent: 0,
                    })
                    .on_conflict((daily_progress::task_id, daily_progress::date))
                    .do_update()
                    .set(daily_progress::completed.eq(not(daily_progress::completed)))
                    .execute(conn)
                    .await
            }

            pub(super) async fn record_timer_session(
                conn: &mut Conn,
                task_id: i32,
                date: String,
                duration: i32,
            ) -> QueryResult<()> {
                conn.transaction::<_, diesel::result::Error, _>(move |conn| {
                    async move {
                        diesel::insert_into(timer_sessions::table)
                            .values(&NewTimerSession {
                                task_id,
                                date: &date,
                                duration,
                            })
                            .execute(conn)
                            .await?;

                        diesel::insert_into(daily_progress::table)
                            .values(&NewDailyProgress {
                                task_id,
                                date: &date,
                                completed: false,
                                time_spent: duration,
                            })
                            .on_conflict((daily_progress::task_id, daily_progress::date))
                            .do_update()
                            .set(
                                daily_progress::time_spent
                                    .eq(daily_progress::time_spent + duration),
                            )
                            .execute(conn)
                            .await?;

                        Ok(())
                    }
                    .scope_boxed()
                })
                .await
            }

            pub(super) async fn timer_sessions(
                conn: &mut Conn,
                task_id: i32,
                date: &str,
            ) -> QueryResult<Vec<TimerSession>> {
                timer_sessions::table
                    .filter(timer_sessions::task_id.eq(task_id))
                    .filter(timer_sessions::date.eq(date))
                    .order(timer_sessions::id.asc())
                    .select(TimerSession::as_select())
                    .load::<TimerSession>(conn)
                    .await
            }

            pub(super) async fn weekly_stats(
                conn: &mut Conn,
                window: &StatsWindow,
            ) -> QueryResult<Vec<WeeklyStat>> {
                let rows = daily_progress::table
                    .filter(daily_progress::completed.eq(true))
                    .filter(daily_progress::date.ge(&window.from))
                    .filter(daily_progress::date.le(&window.to))
                    .group_by(daily_progress::date)
                    .select((
                        daily_progress::date,
                        count_distinct(daily_progress::task_id),
                        diesel::dsl::sum(daily_progress::time_spent),
                    ))
                    .order(daily_progress::date.asc())
                    .load::<(String, i64, Option<i64>)>(conn)
                    .await?;

                Ok(rows.into_iter().map(WeeklyStat::from).collect())
            }
        }

        #[async_trait::async_trait]
        impl $crate::store::ProgressStore for $store {
            fn backend(&self) -> &'static str {
                Self::BACKEND
            }

            async fn ping(&self) -> Result<(), $crate::error_handler::ServiceError> {
                let mut conn = self.pool.get().await?;
                diesel_async::RunQueryDsl::execute(diesel::sql_query("SELECT 1"), &mut conn)
                    .await?;
                Ok(())
            }

            async fn init_schema(&self) -> Result<(), $crate::error_handler::ServiceError> {
                $crate::seed::validate_hierarchy(&$crate::seed::DEFAULT_TASKS)
                    .map_err($crate::error_handler::ServiceError::InternalServerError)?;
                self.prepare_schema().await
            }

            async fn list_tasks(
                &self,
            ) -> Result<Vec<$crate::models::Task>, $crate::error_handler::ServiceError> {
                let mut conn = self.pool.get().await?;
                Ok(shared::list_tasks(&mut conn).await?)
            }

            async fn update_task_time(
                &self,
                task_id: i32,
                time_minutes: i32,
            ) -> Result<usize, $crate::error_handler::ServiceError> {
                let mut conn = self.pool.get().await?;
                Ok(shared::update_task_time(&mut conn, task_id, time_minutes).await?)
            }

            async fn progress_for_date(
                &self,
                date: chrono::NaiveDate,
            ) -> Result<Vec<$crate::models::ProgressEntry>, $crate::error_handler::ServiceError>
            {
                let mut conn = self.pool.get().await?;
                Ok(shared::progress_for_date(&mut conn, &$crate::store::iso_date(date)).await?)
            }

            async fn toggle_progress(
                &self,
                task_id: i32,
                date: chrono::NaiveDate,
            ) -> Result<(), $crate::error_handler::ServiceError> {
                let mut conn = self.pool.get().await?;
                shared::toggle_progress(&mut conn, task_id, &$crate::store::iso_date(date))
                    .await?;
                Ok(())
            }

            async fn record_timer_session(
                &self,
                task_id: i32,
                date: chrono::NaiveDate,
                duration: i32,
            ) -> Result<(), $crate::error_handler::ServiceError> {
                let mut conn = self.pool.get().await?;
                shared::record_timer_session(
                    &mut conn,
                    task_id,
                    $crate::store::iso_date(date),
                    duration,
                )
                .await?;
                Ok(())
            }

            async fn timer_sessions(
                &self,
                task_id: i32,
                date: chrono::NaiveDate,
            ) -> Result<Vec<$crate::models::TimerSession>, $crate::error_handler::ServiceError>
            {
                let mut conn = self.pool.get().await?;
                Ok(
                    shared::timer_sessions(&mut conn, task_id, &$crate::store::iso_date(date))
                        .await?,
                )
            }

            async fn weekly_stats(
                &self,
                today: chrono::NaiveDate,
            ) -> Result<Vec<$crate::models::WeeklyStat>, $crate::error_handler::ServiceError>
            {
                let window =
                    $crate::store::StatsWindow::trailing(today, $crate::store::WEEKLY_WINDOW_DAYS);
                let mut conn = self.pool.get().await?;
                Ok(shared::weekly_stats(&mut conn, &window).await?)
            }

            async fn daily_stats(
                &self,
                today: chrono::NaiveDate,
            ) -> Result<Vec<$crate::models::DailyStat>, $crate::error_handler::ServiceError>
            {
                let window =
                    $crate::store::StatsWindow::trailing(today, $crate::store::DAILY_WINDOW_DAYS);
                self.load_daily_stats(&window).await
            }
        }
    };
}
