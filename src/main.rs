mod api;
mod config;
mod context;
mod database;
mod jobs;
mod middleware;
mod models;
mod services;
#[cfg(test)]
mod testing;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::jobs::{start_notification_worker, NotificationQueue};
use crate::services::push_service::{ExpoPushGateway, NotificationDispatcher};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("❌ {}", e);
        io::Error::other(e.to_string())
    })?;

    log::info!("🚀 Starting Couples Service...");

    let db = database::MongoDB::new(&config.database_url).await.map_err(|e| {
        log::error!("❌ Failed to connect to MongoDB: {}", e);
        io::Error::other(e.to_string())
    })?;

    log::info!("✅ MongoDB connected successfully");

    // Notificações saem da request: fila + worker em background
    let (queue, jobs) = NotificationQueue::new();
    let gateway = Arc::new(ExpoPushGateway::new(&config.expo_push_url));
    start_notification_worker(jobs, NotificationDispatcher::new(gateway));

    let ctx = web::Data::new(AppContext::from_mongo(db, &config, queue));
    let max_json_bytes = config.max_json_bytes;

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", config.host, config.port);

    HttpServer::new(move || {
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            .configure(|cfg| api::configure(cfg, ctx.clone(), max_json_bytes))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
