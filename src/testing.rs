// Shared fixtures for the test modules: an AppContext over the in-memory store,
// a fake media uploader and a queue whose jobs the test can inspect.

use actix_web::web;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    context::AppContext,
    database::memory::MemoryStore,
    jobs::{NotificationJob, NotificationQueue},
    services::{auth_service, auth_service::TokenIssuer, media_service::tests::FakeUploader},
    utils::crypto::PasswordHasher,
};

pub struct TestContext {
    pub ctx: AppContext,
    pub store: Arc<MemoryStore>,
    pub jobs: UnboundedReceiver<NotificationJob>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_uploader(FakeUploader::default())
    }

    pub fn with_uploader(uploader: FakeUploader) -> Self {
        let store = Arc::new(MemoryStore::default());
        let (queue, jobs) = NotificationQueue::new();

        let ctx = AppContext {
            users: store.clone(),
            pairings: store.clone(),
            notes: store.clone(),
            tasks: store.clone(),
            media: Arc::new(uploader),
            hasher: PasswordHasher::new(4),
            tokens: TokenIssuer::new("test-secret", "couples-service", "couples-app", 1),
            notifications: queue,
            code_prefix: "LOVII".to_string(),
        };

        Self { ctx, store, jobs }
    }

    /// Registers a user and returns `(id, code, token)`.
    pub async fn user(&self, name: &str) -> (String, String, String) {
        let response = auth_service::register(
            &self.ctx,
            &auth_service::RegisterRequest {
                password: Some("pw".into()),
                name: Some(name.into()),
                avatar: None,
            },
        )
        .await
        .expect("register");

        (response.user.id, response.user.code, response.token)
    }

    pub fn drain_jobs(&mut self) -> Vec<NotificationJob> {
        let mut jobs = Vec::new();
        while let Ok(job) = self.jobs.try_recv() {
            jobs.push(job);
        }
        jobs
    }
}

/// Rotas da API sobre o contexto de teste, para `App::configure`.
pub fn routes(ctx: AppContext) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| crate::api::configure(cfg, web::Data::new(ctx), 1 << 20)
}
