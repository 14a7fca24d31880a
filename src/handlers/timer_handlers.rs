use super::today;
use crate::error_handler::ServiceError;
use crate::models::{SuccessResponse, TimerSessionPayload};
use crate::store::ProgressStore;
use actix_web::{post, web, HttpResponse};

// === POST /api/timer/session ===
#[post("/session")]
pub async fn record_timer_session_handler(
    store: web::Data<dyn ProgressStore>,
    payload: web::Json<TimerSessionPayload>,
) -> Result<HttpResponse, ServiceError> {
    let date = today();
    log::info!(
        "Recording {}s timer session for task {} on {}",
        payload.duration,
        payload.task_id,
        date
    );

    store
        .record_timer_session(payload.task_id, date, payload.duration)
        .await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
