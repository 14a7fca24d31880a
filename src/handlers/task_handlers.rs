use crate::error_handler::ServiceError;
use crate::models::{SuccessResponse, UpdateTaskTimePayload};
use crate::store::ProgressStore;
use actix_web::{get, put, web, HttpResponse};

// === GET /api/tasks ===
#[get("")]
pub async fn list_tasks_handler(
    store: web::Data<dyn ProgressStore>,
) -> Result<HttpResponse, ServiceError> {
    let task_list = store.list_tasks().await?;
    Ok(HttpResponse::Ok().json(task_list))
}

// === PUT /api/tasks/{task_id} ===
// Unknown ids are not an error: the update simply touches nothing.
#[put("/{task_id}")]
pub async fn update_task_time_handler(
    store: web::Data<dyn ProgressStore>,
    task_id_path: web::Path<i32>,
    payload: web::Json<UpdateTaskTimePayload>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = task_id_path.into_inner();
    log::info!(
        "Setting time_minutes of task {} to {}",
        task_id,
        payload.time_minutes
    );

    let updated = store
        .update_task_time(task_id, payload.time_minutes)
        .await?;
    if updated == 0 {
        log::warn!("Time update for unknown task {} matched no rows", task_id);
    }

    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
