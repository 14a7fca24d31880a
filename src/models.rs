use crate::schema::{daily_progress, tasks, timer_sessions};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use serde::{Deserialize, Serialize};

// --- Task ---
#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = tasks)]
pub struct Task {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub time_minutes: i32,
    pub position: i32,
}

// Seed rows carry their own ids; there is no create-task endpoint.
#[derive(Insertable, Debug, Clone, Copy)]
#[diesel(table_name = tasks)]
pub struct NewTask<'a> {
    pub id: i32,
    pub name: &'a str,
    pub parent_id: Option<i32>,
    pub time_minutes: i32,
    pub position: i32,
}

// --- DailyProgress ---
#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = daily_progress)]
pub struct ProgressEntry {
    pub task_id: i32,
    pub completed: bool,
    pub time_spent: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = daily_progress)]
pub struct NewDailyProgress<'a> {
    pub task_id: i32,
    pub date: &'a str,
    pub completed: bool,
    pub time_spent: i32,
}

// --- TimerSession ---
#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = timer_sessions)]
pub struct TimerSession {
    pub id: i32,
    pub task_id: i32,
    pub date: String,
    pub duration: i32,
    pub timestamp: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = timer_sessions)]
pub struct NewTimerSession<'a> {
    pub task_id: i32,
    pub date: &'a str,
    pub duration: i32,
}

// --- PAYLOAD DTOs ---

#[derive(Deserialize, Debug)]
pub struct UpdateTaskTimePayload {
    pub time_minutes: i32,
}

#[derive(Deserialize, Debug)]
pub struct ToggleProgressPayload {
    pub task_id: i32,
}

#[derive(Deserialize, Debug)]
pub struct TimerSessionPayload {
    pub task_id: i32,
    /// Seconds.
    pub duration: i32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        SuccessResponse { success: true }
    }
}

// --- Stats Models ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeeklyStat {
    pub date: String,
    pub tasks_completed: i64,
    pub total_time: i64,
}

// Row shape of the weekly aggregate query: (date, distinct tasks, SUM(time_spent)).
impl From<(String, i64, Option<i64>)> for WeeklyStat {
    fn from((date, tasks_completed, total_time): (String, i64, Option<i64>)) -> Self {
        WeeklyStat {
            date,
            tasks_completed,
            total_time: total_time.unwrap_or(0),
        }
    }
}

// Loaded through sql_query; the conditional distinct count has no DSL form.
#[derive(QueryableByName, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DailyStat {
    #[diesel(sql_type = Text)]
    pub date: String,
    #[diesel(sql_type = BigInt)]
    pub completed_tasks: i64,
    #[diesel(sql_type = BigInt)]
    pub total_tasks: i64,
    #[diesel(sql_type = BigInt)]
    pub total_time_seconds: i64,
}
