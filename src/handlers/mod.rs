pub mod page_handlers;
pub mod progress_handlers;
pub mod stats_handlers;
pub mod task_handlers;
pub mod timer_handlers;

use crate::error_handler::json_error_handler;
use actix_web::web;
use chrono::{Local, NaiveDate};

/// Calendar date on the server's local clock.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Registers every route. The store itself is attached by the caller as
/// `web::Data<dyn ProgressStore>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(page_handlers::index_handler)
        .service(page_handlers::health_check_handler)
        .service(
            web::scope("/api/tasks")
                .service(task_handlers::list_tasks_handler)
                .service(task_handlers::update_task_time_handler),
        )
        .service(
            web::scope("/api/progress")
                .service(progress_handlers::get_today_progress_handler)
                .service(progress_handlers::toggle_progress_handler),
        )
        .service(web::scope("/api/timer").service(timer_handlers::record_timer_session_handler))
        .service(
            web::scope("/api/stats")
                .service(stats_handlers::get_weekly_stats_handler)
                .service(stats_handlers::get_daily_stats_handler),
        );
}
