pub mod auth;
pub mod connect;
pub mod health;
pub mod notes;
pub mod profile;
pub mod swagger;
pub mod tasks;
pub mod widget;

use actix_web::{web, ResponseError};
use serde::Deserialize;

use crate::context::AppContext;
use crate::utils::error::AppError;

/// `?profileId=` ou `?userId=` (o app usa os dois)
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub profile_id: Option<String>,
    pub user_id: Option<String>,
}

impl OwnerQuery {
    pub fn owner(&self) -> Option<&str> {
        self.profile_id
            .as_deref()
            .or(self.user_id.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Registra contexto, extractors e todas as rotas. Usado pelo `main` e pelos testes HTTP.
pub fn configure(cfg: &mut web::ServiceConfig, ctx: web::Data<AppContext>, max_json_bytes: usize) {
    cfg.app_data(ctx)
        .app_data(
            web::JsonConfig::default()
                .limit(max_json_bytes)
                .error_handler(|err, _req| {
                    log::warn!("⚠️  Rejected JSON body: {}", err);
                    actix_web::error::InternalError::from_response(
                        err,
                        AppError::validation("Invalid JSON body").error_response(),
                    )
                    .into()
                }),
        )
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            actix_web::error::InternalError::from_response(
                err,
                AppError::validation("Invalid query string").error_response(),
            )
            .into()
        }))
        .route("/", web::get().to(health::root))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .route("/test", web::get().to(health::connectivity_probe))
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/pushtoken", web::post().to(auth::push_token))
                        .route("/account", web::delete().to(auth::delete_account)),
                )
                .route("/connect", web::post().to(connect::connect))
                .service(
                    web::resource("/notes")
                        .route(web::get().to(notes::get_notes))
                        .route(web::post().to(notes::create_note))
                        .route(web::patch().to(notes::update_note))
                        .route(web::delete().to(notes::delete_note)),
                )
                .service(
                    web::resource("/profile")
                        .route(web::get().to(profile::get_profile))
                        .route(web::put().to(profile::update_profile)),
                )
                .service(
                    web::resource("/tasks")
                        .route(web::get().to(tasks::get_tasks))
                        .route(web::post().to(tasks::post_tasks)),
                )
                .service(
                    web::resource("/widget")
                        .route(web::get().to(widget::get_widget))
                        .route(web::post().to(widget::post_widget)),
                ),
        );
}
