use crate::error_handler::ServiceError;
use crate::store::ProgressStore;
use actix_web::{get, http::header::ContentType, web, HttpResponse};

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[get("/")]
pub async fn index_handler() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

#[get("/health")]
pub async fn health_check_handler(
    store: web::Data<dyn ProgressStore>,
) -> Result<HttpResponse, ServiceError> {
    match store.ping().await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "backend": store.backend()
        }))),
        Err(e) => {
            log::error!("Health check failed: {:?}", e);
            Err(ServiceError::InternalServerError(
                "Failed to check database".to_string(),
            ))
        }
    }
}
