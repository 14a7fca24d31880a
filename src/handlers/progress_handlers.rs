use super::today;
use crate::error_handler::ServiceError;
use crate::models::{ProgressEntry, SuccessResponse, ToggleProgressPayload};
use crate::store::ProgressStore;
use actix_web::{get, post, web, HttpResponse};
use std::collections::BTreeMap;

// === GET /api/progress/today ===
// Keyed by task id; tasks without a row today are absent.
#[get("/today")]
pub async fn get_today_progress_handler(
    store: web::Data<dyn ProgressStore>,
) -> Result<HttpResponse, ServiceError> {
    let entries = store.progress_for_date(today()).await?;

    let progress: BTreeMap<i32, ProgressEntry> = entries
        .into_iter()
        .map(|entry| (entry.task_id, entry))
        .collect();

    Ok(HttpResponse::Ok().json(progress))
}

// === POST /api/progress/toggle ===
#[post("/toggle")]
pub async fn toggle_progress_handler(
    store: web::Data<dyn ProgressStore>,
    payload: web::Json<ToggleProgressPayload>,
) -> Result<HttpResponse, ServiceError> {
    let date = today();
    log::debug!("Toggling task {} for {}", payload.task_id, date);

    store.toggle_progress(payload.task_id, date).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
