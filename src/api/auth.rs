use actix_web::{web, HttpResponse, ResponseError};

use crate::context::AppContext;
use crate::middleware::AuthUser;
use crate::services::auth_service::{
    self, AuthResponse, LoginRequest, PushTokenRequest, RegisterRequest,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Password missing")
    )
)]
pub async fn register(
    ctx: web::Data<AppContext>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    let name = request.name.as_deref().unwrap_or("Anonymous");
    log::info!("📝 POST /auth/register - name: {}", name);

    match auth_service::register(&ctx, &request).await {
        Ok(response) => {
            log::info!("✅ Registration successful: {}", response.user.code);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Code or password missing"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    ctx: web::Data<AppContext>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    let code = request.code.as_deref().unwrap_or("N/A");
    log::info!("🔐 POST /auth/login - code: {}", code);

    match auth_service::login(&ctx, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", code);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", code, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/pushtoken",
    tag = "Auth",
    request_body = PushTokenRequest,
    responses(
        (status = 200, description = "Push token stored"),
        (status = 400, description = "userId or token missing")
    )
)]
pub async fn push_token(
    ctx: web::Data<AppContext>,
    request: web::Json<PushTokenRequest>,
) -> HttpResponse {
    log::info!("📲 POST /auth/pushtoken - user: {}", request.user_id.as_deref().unwrap_or("N/A"));

    match auth_service::update_push_token(&ctx, &request).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => {
            log::warn!("❌ Push token sync failed: {}", e);
            e.error_response()
        }
    }
}

/// 🗑️ Delete account endpoint
/// Deletes the user account and all associated data
#[utoipa::path(
    delete,
    path = "/api/auth/account",
    tag = "Auth",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_account(ctx: web::Data<AppContext>, user: AuthUser) -> HttpResponse {
    log::info!("🗑️ DELETE /auth/account - user: {}", user.user_id);

    match auth_service::delete_account(&ctx, &user.user_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Account deleted successfully"
        })),
        Err(e) => {
            log::error!("❌ Failed to delete account {}: {}", user.user_id, e);
            e.error_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::database::UserStore;
    use crate::testing::{routes, TestContext};

    #[actix_web::test]
    async fn test_register_login_and_delete_account() {
        let t = TestContext::new();
        let store = t.store.clone();
        let app = test::init_service(App::new().configure(routes(t.ctx))).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "password": "secret" }))
            .to_request();
        let registered: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(registered["success"], true);
        assert_eq!(registered["user"]["name"], "Anonymous");
        let code = registered["user"]["code"].as_str().unwrap().to_string();
        assert!(code.starts_with("LOVII-"));

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "code": code, "password": "wrong" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "code": code, "password": "secret" }))
            .to_request();
        let login: Value = test::call_and_read_body_json(&app, req).await;
        let token = login["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::delete()
            .uri("/api/auth/account")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert!(store.find_by_code(&code).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_register_requires_password_and_rejects_bad_json() {
        let t = TestContext::new();
        let app = test::init_service(App::new().configure(routes(t.ctx))).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "name": "Ana" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "success": false, "error": "Invalid JSON body" }));
    }

    #[actix_web::test]
    async fn test_push_token_requires_fields() {
        let t = TestContext::new();
        let (ana, _, _) = t.user("Ana").await;
        let app = test::init_service(App::new().configure(routes(t.ctx))).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/pushtoken")
            .set_json(json!({ "userId": ana }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/auth/pushtoken")
            .set_json(json!({ "userId": ana, "token": "ExpoPushToken[abc]" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "success": true }));
    }
}
