use actix_web::{http::StatusCode, test, web, App};
use chrono::{Duration, Local, NaiveDate};
use daily_tracker::handlers;
use daily_tracker::models::{DailyStat, NewTask, ProgressEntry, SuccessResponse, Task, WeeklyStat};
use daily_tracker::schema::tasks;
use daily_tracker::store::{iso_date, ProgressStore, SharedStore, SqliteStore};
use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;
use diesel::{Connection, RunQueryDsl};
use futures_util::future::join_all;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

fn db_path(dir: &TempDir) -> String {
    dir.path().join("tracker.db").to_str().unwrap().to_string()
}

async fn open_store() -> (TempDir, SharedStore) {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::connect(&db_path(&dir), 4).await.unwrap();
    store.init_schema().await.unwrap();
    let store: SharedStore = Arc::new(store);
    (dir, store)
}

macro_rules! app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::from($store.clone()))
                .configure(handlers::configure),
        )
        .await
    };
}

// Plain connection to the same file, for arranging rows the API cannot create.
fn side_connection(dir: &TempDir) -> SqliteConnection {
    SqliteConnection::establish(&db_path(dir)).unwrap()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[actix_web::test]
async fn fresh_store_lists_seeded_tasks_in_order() {
    let (_dir, store) = open_store().await;
    let app = app!(store);

    let req = test::TestRequest::get().uri("/api/tasks").to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(tasks.len(), 9);
    assert_eq!(tasks[0].name, "25 Apps (Time - 2.5 hrs)");
    assert_eq!(tasks[0].parent_id, None);
    assert_eq!(tasks[0].position, 1);

    let keys: Vec<(i32, i32)> = tasks.iter().map(|t| (t.position, t.id)).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(
        tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 6, 7, 8, 9]
    );
}

#[actix_web::test]
async fn listing_orders_by_position_then_id() {
    let (dir, store) = open_store().await;
    let mut conn = side_connection(&dir);
    let extra = [
        NewTask {
            id: 10,
            name: "Stretch",
            parent_id: None,
            time_minutes: 5,
            position: 0,
        },
        NewTask {
            id: 11,
            name: "Journal",
            parent_id: None,
            time_minutes: 10,
            position: 99,
        },
        NewTask {
            id: 12,
            name: "Review notes",
            parent_id: Some(1),
            time_minutes: 15,
            position: 1,
        },
    ];
    for task in &extra {
        diesel::insert_into(tasks::table)
            .values(task)
            .execute(&mut conn)
            .unwrap();
    }

    let app = app!(store);
    let req = test::TestRequest::get().uri("/api/tasks").to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![10, 1, 2, 12, 3, 4, 5, 6, 7, 8, 9, 11]
    );
}

#[actix_web::test]
async fn schema_init_is_idempotent() {
    let (_dir, store) = open_store().await;
    store.update_task_time(4, 75).await.unwrap();
    store.init_schema().await.unwrap();

    let tasks = store.list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 9);
    assert_eq!(tasks.iter().find(|t| t.id == 4).unwrap().time_minutes, 75);
}

#[actix_web::test]
async fn concurrent_first_start_seeds_once() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);

    let mut stores = Vec::new();
    for _ in 0..4 {
        stores.push(SqliteStore::connect(&path, 2).await.unwrap());
    }
    for result in join_all(stores.iter().map(|store| store.init_schema())).await {
        result.unwrap();
    }

    let tasks = stores[0].list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 9);
    assert_eq!(
        tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 6, 7, 8, 9]
    );
}

#[actix_web::test]
async fn update_task_time_overwrites_value() {
    let (_dir, store) = open_store().await;
    let app = app!(store);

    let req = test::TestRequest::put()
        .uri("/api/tasks/3")
        .set_json(json!({ "time_minutes": 45 }))
        .to_request();
    let resp: SuccessResponse = test::call_and_read_body_json(&app, req).await;
    assert!(resp.success);

    let req = test::TestRequest::get().uri("/api/tasks").to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks.iter().find(|t| t.id == 3).unwrap().time_minutes, 45);
}

#[actix_web::test]
async fn update_of_unknown_task_still_succeeds() {
    let (_dir, store) = open_store().await;
    let app = app!(store);

    let req = test::TestRequest::put()
        .uri("/api/tasks/999")
        .set_json(json!({ "time_minutes": 10 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(store.list_tasks().await.unwrap().len(), 9);
}

#[actix_web::test]
async fn toggle_creates_then_flips_progress() {
    let (_dir, store) = open_store().await;
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri("/api/progress/toggle")
        .set_json(json!({ "task_id": 1 }))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp, json!({ "success": true }));

    let req = test::TestRequest::get().uri("/api/progress/today").to_request();
    let progress: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        progress,
        json!({ "1": { "task_id": 1, "completed": true, "time_spent": 0 } })
    );

    let req = test::TestRequest::post()
        .uri("/api/progress/toggle")
        .set_json(json!({ "task_id": 1 }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/api/progress/today").to_request();
    let progress: HashMap<String, ProgressEntry> = test::call_and_read_body_json(&app, req).await;
    assert!(!progress["1"].completed);
}

#[actix_web::test]
async fn timer_sessions_accumulate_time() {
    let (_dir, store) = open_store().await;
    let app = app!(store);

    for duration in [30, 45] {
        let req = test::TestRequest::post()
            .uri("/api/timer/session")
            .set_json(json!({ "task_id": 5, "duration": duration }))
            .to_request();
        let resp: SuccessResponse = test::call_and_read_body_json(&app, req).await;
        assert!(resp.success);
    }

    let req = test::TestRequest::get().uri("/api/progress/today").to_request();
    let progress: HashMap<String, ProgressEntry> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(progress["5"].time_spent, 75);
    assert!(!progress["5"].completed);

    let sessions = store.timer_sessions(5, today()).await.unwrap();
    assert_eq!(
        sessions.iter().map(|s| s.duration).collect::<Vec<_>>(),
        vec![30, 45]
    );
    assert!(sessions.iter().all(|s| s.date == iso_date(today())));
}

#[actix_web::test]
async fn toggle_keeps_time_spent() {
    let (_dir, store) = open_store().await;
    let date = today();

    store.record_timer_session(2, date, 120).await.unwrap();
    store.toggle_progress(2, date).await.unwrap();

    let entries = store.progress_for_date(date).await.unwrap();
    assert_eq!(
        entries,
        vec![ProgressEntry {
            task_id: 2,
            completed: true,
            time_spent: 120
        }]
    );
}

#[actix_web::test]
async fn stats_stay_inside_their_windows() {
    let (_dir, store) = open_store().await;
    let app = app!(store);
    let today = today();
    let day = |offset: i64| today + Duration::days(offset);

    store.toggle_progress(1, day(0)).await.unwrap();
    store.record_timer_session(2, day(0), 60).await.unwrap();
    store.toggle_progress(1, day(-7)).await.unwrap();
    store.toggle_progress(1, day(-8)).await.unwrap();
    store.record_timer_session(4, day(-3), 90).await.unwrap();
    store.toggle_progress(3, day(-30)).await.unwrap();
    store.toggle_progress(3, day(-31)).await.unwrap();
    store.toggle_progress(6, day(1)).await.unwrap();

    let req = test::TestRequest::get().uri("/api/stats/weekly").to_request();
    let weekly: Vec<WeeklyStat> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        weekly,
        vec![
            WeeklyStat {
                date: iso_date(day(-7)),
                tasks_completed: 1,
                total_time: 0
            },
            WeeklyStat {
                date: iso_date(day(0)),
                tasks_completed: 1,
                total_time: 0
            },
        ]
    );

    let req = test::TestRequest::get().uri("/api/stats/daily").to_request();
    let daily: Vec<DailyStat> = test::call_and_read_body_json(&app, req).await;
    let dates: Vec<String> = daily.iter().map(|s| s.date.clone()).collect();
    assert_eq!(
        dates,
        vec![
            iso_date(day(-30)),
            iso_date(day(-8)),
            iso_date(day(-7)),
            iso_date(day(-3)),
            iso_date(day(0)),
        ]
    );

    let timer_only = &daily[3];
    assert_eq!(timer_only.completed_tasks, 0);
    assert_eq!(timer_only.total_tasks, 1);
    assert_eq!(timer_only.total_time_seconds, 90);

    let current = &daily[4];
    assert_eq!(current.completed_tasks, 1);
    assert_eq!(current.total_tasks, 2);
    assert_eq!(current.total_time_seconds, 60);
}

#[actix_web::test]
async fn concurrent_toggles_do_not_lose_updates() {
    let (_dir, store) = open_store().await;
    let date = today();

    let toggles = (0..5).map(|_| store.toggle_progress(7, date));
    for result in join_all(toggles).await {
        result.unwrap();
    }

    let entries = store.progress_for_date(date).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].completed);
}

#[actix_web::test]
async fn concurrent_timer_sessions_sum_exactly() {
    let (_dir, store) = open_store().await;
    let date = today();

    let sessions = (0..8).map(|_| store.record_timer_session(8, date, 10));
    for result in join_all(sessions).await {
        result.unwrap();
    }

    let entries = store.progress_for_date(date).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].time_spent, 80);
    assert_eq!(store.timer_sessions(8, date).await.unwrap().len(), 8);
}

#[actix_web::test]
async fn failed_progress_update_rolls_back_session_log() {
    let (dir, store) = open_store().await;
    side_connection(&dir)
        .batch_execute(
            "CREATE TRIGGER reject_progress BEFORE INSERT ON daily_progress \
             BEGIN SELECT RAISE(ABORT, 'progress write rejected'); END;",
        )
        .unwrap();
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri("/api/timer/session")
        .set_json(json!({ "task_id": 1, "duration": 30 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["statusCode"], 500);

    assert!(store.timer_sessions(1, today()).await.unwrap().is_empty());
    assert!(store.progress_for_date(today()).await.unwrap().is_empty());
}

#[actix_web::test]
async fn malformed_body_is_a_structured_bad_request() {
    let (_dir, store) = open_store().await;
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri("/api/timer/session")
        .set_json(json!({ "task_id": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["statusCode"], 400);

    assert!(store.timer_sessions(1, today()).await.unwrap().is_empty());
}

#[actix_web::test]
async fn health_and_index_respond() {
    let (_dir, store) = open_store().await;
    let app = app!(store);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "status": "healthy", "backend": "sqlite" }));

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}
