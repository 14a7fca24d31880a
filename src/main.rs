use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use daily_tracker::config::AppConfig;
use daily_tracker::{handlers, store};
use std::io;

fn build_cors(frontend_urls: &[String]) -> Cors {
    if frontend_urls.is_empty() {
        return Cors::permissive();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600);
    for origin in frontend_urls {
        cors = cors.allowed_origin(origin);
    }
    cors
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    if cfg!(debug_assertions) {
        match dotenvy::dotenv() {
            Ok(path) => log::info!(".env file loaded from path: {}", path.display()),
            Err(e) => log::warn!(
                "Could not load .env file: {}, using environment variables.",
                e
            ),
        }
    }

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let store = store::connect(&config).await.map_err(|e| {
        log::error!("Failed to open {} store: {}", config.store.backend_name(), e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    store.init_schema().await.map_err(|e| {
        log::error!("Schema initialization failed: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    log::info!("Daily tracker starting at http://{}", config.bind_address());

    let frontend_urls = config.frontend_urls.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(build_cors(&frontend_urls))
            .app_data(web::Data::from(store.clone()))
            .configure(handlers::configure)
    })
    .bind(config.bind_address())?
    .run()
    .await
}
