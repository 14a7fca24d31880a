use super::today;
use crate::error_handler::ServiceError;
use crate::store::ProgressStore;
use actix_web::{get, web, HttpResponse};

// === GET /api/stats/weekly ===
#[get("/weekly")]
pub async fn get_weekly_stats_handler(
    store: web::Data<dyn ProgressStore>,
) -> Result<HttpResponse, ServiceError> {
    let stats = store.weekly_stats(today()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

// === GET /api/stats/daily ===
#[get("/daily")]
pub async fn get_daily_stats_handler(
    store: web::Data<dyn ProgressStore>,
) -> Result<HttpResponse, ServiceError> {
    let stats = store.daily_stats(today()).await?;
    Ok(HttpResponse::Ok().json(stats))
}
