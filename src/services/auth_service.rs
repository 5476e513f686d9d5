use crate::{
    context::AppContext,
    models::{User, UserInfo},
    utils::{crypto::generate_invite_code, error::AppError},
};
use crate::database::StoreError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tentativas de gerar um código de convite livre antes de desistir
const MAX_CODE_ATTEMPTS: usize = 5;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,  // user_id
    pub code: String,
    pub iat: usize,   // issued at
    pub exp: usize,   // expiration
    pub jti: String,  // JWT ID
    pub aud: String,  // audience
    pub iss: String,  // issuer
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub password: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub code: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushTokenRequest {
    pub user_id: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserInfo,
    pub token: String,
}

/// Emite e valida os JWT de sessão (HS256)
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    issuer: String,
    audience: String,
    ttl_hours: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, issuer: &str, audience: &str, ttl_hours: i64) -> Self {
        Self {
            secret: secret.to_string(),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            ttl_hours,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.user_id.clone(),
            code: user.code.clone(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::hours(self.ttl_hours)).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )?;
        Ok(data.claims)
    }
}

fn required<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(message))
}

// User registration
pub async fn register(ctx: &AppContext, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
    let password = required(&request.password, "Password is required")?;
    let password_hash = ctx.hasher.hash(password).await?;

    let name = request
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Anonymous".to_string());

    let mut attempt = 0;
    let user = loop {
        attempt += 1;

        let candidate = User {
            user_id: Uuid::new_v4().to_string(),
            code: generate_invite_code(&ctx.code_prefix),
            password_hash: password_hash.clone(),
            name: Some(name.clone()),
            avatar: request.avatar.clone(),
            push_token: None,
            created_at: Utc::now().timestamp_millis(),
        };

        // O índice único em `code` é a garantia final; colisão gera novo código
        match ctx.users.insert(&candidate).await {
            Ok(()) => break candidate,
            Err(StoreError::Duplicate(_)) if attempt < MAX_CODE_ATTEMPTS => {
                log::warn!("⚠️  Invite code collision on {}, retrying", candidate.code);
            }
            Err(StoreError::Duplicate(_)) => {
                log::error!("❌ No free invite code after {} attempts", attempt);
                return Err(AppError::Internal("Could not allocate a unique invite code".to_string()));
            }
            Err(e) => return Err(e.into()),
        }
    };

    let token = ctx.tokens.issue(&user)?;

    log::info!("✅ User registered successfully: {} ({})", user.user_id, user.code);

    Ok(AuthResponse {
        success: true,
        user: UserInfo::from(&user),
        token,
    })
}

// User login
pub async fn login(ctx: &AppContext, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    let code = required(&request.code, "Code and Password are required")?;
    let password = required(&request.password, "Code and Password are required")?;

    // Unknown code and wrong password produce the exact same error
    let user = ctx
        .users
        .find_by_code(code)
        .await?
        .ok_or_else(|| AppError::Auth(INVALID_CREDENTIALS.to_string()))?;

    if !ctx.hasher.verify(password, &user.password_hash).await? {
        return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    let token = ctx.tokens.issue(&user)?;

    Ok(AuthResponse {
        success: true,
        user: UserInfo::from(&user),
        token,
    })
}

/// Overwrites the user's push token. An unknown `user_id` is a silent no-op:
/// the client re-syncs its token on every launch and nothing downstream needs the failure.
pub async fn update_push_token(ctx: &AppContext, request: &PushTokenRequest) -> Result<(), AppError> {
    let (user_id, token) = match (request.user_id.as_deref(), request.token.as_deref()) {
        (Some(u), Some(t)) if !u.is_empty() && !t.is_empty() => (u, t),
        _ => return Err(AppError::validation("User ID and Token are required")),
    };

    ctx.users.set_push_token(user_id, token).await?;
    Ok(())
}

pub async fn update_profile(
    ctx: &AppContext,
    user_id: &str,
    name: Option<&str>,
    avatar: Option<&str>,
) -> Result<User, AppError> {
    ctx.users
        .update_profile(user_id, name, avatar)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Deletes the account and everything it owns: notes, tasks and pairings.
pub async fn delete_account(ctx: &AppContext, user_id: &str) -> Result<(), AppError> {
    if ctx.users.find_by_id(user_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    let notes = ctx.notes.delete_by_owner(user_id).await?;
    ctx.tasks.delete_by_owner(user_id).await?;
    let pairings = ctx.pairings.delete_for_user(user_id).await?;
    ctx.users.delete(user_id).await?;

    log::info!(
        "🗑️ Account {} deleted ({} notes, {} pairings)",
        user_id,
        notes,
        pairings
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::UserStore;
    use crate::database::memory::CollidingUsers;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use crate::testing::TestContext;

    fn register_request(password: &str) -> RegisterRequest {
        RegisterRequest {
            password: Some(password.into()),
            name: Some("Ana".into()),
            avatar: None,
        }
    }

    fn login_request(code: &str, password: &str) -> LoginRequest {
        LoginRequest {
            code: Some(code.into()),
            password: Some(password.into()),
        }
    }

    #[tokio::test]
    async fn test_register_generates_prefixed_code() {
        let t = TestContext::new();
        let response = register(&t.ctx, &register_request("pw")).await.unwrap();

        let suffix = response.user.code.strip_prefix("LOVII-").unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        let stored = t.store.find_by_code(&response.user.code).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "pw");
    }

    #[tokio::test]
    async fn test_register_codes_are_unique() {
        let t = TestContext::new();
        let mut codes = std::collections::HashSet::new();
        for _ in 0..20 {
            let response = register(&t.ctx, &register_request("pw")).await.unwrap();
            assert!(codes.insert(response.user.code));
        }
    }

    #[tokio::test]
    async fn test_register_requires_password() {
        let t = TestContext::new();
        let err = register(
            &t.ctx,
            &RegisterRequest {
                password: None,
                name: None,
                avatar: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_defaults_name() {
        let t = TestContext::new();
        let response = register(
            &t.ctx,
            &RegisterRequest {
                password: Some("pw".into()),
                name: None,
                avatar: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(response.user.name.as_deref(), Some("Anonymous"));
    }

    #[tokio::test]
    async fn test_login_success_and_token() {
        let t = TestContext::new();
        let registered = register(&t.ctx, &register_request("pw")).await.unwrap();

        let response = login(&t.ctx, &login_request(&registered.user.code, "pw"))
            .await
            .unwrap();

        assert_eq!(response.user, registered.user);
        let claims = t.ctx.tokens.verify(&response.token).unwrap();
        assert_eq!(claims.sub, registered.user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let t = TestContext::new();
        let registered = register(&t.ctx, &register_request("pw")).await.unwrap();

        let wrong_password = login(&t.ctx, &login_request(&registered.user.code, "nope"))
            .await
            .unwrap_err();
        let unknown_code = login(&t.ctx, &login_request("LOVII-ZZZZZZ", "pw"))
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_code.to_string());
        assert!(matches!(wrong_password, AppError::Auth(_)));
    }

    #[tokio::test]
    async fn test_push_token_on_unknown_user_is_noop() {
        let t = TestContext::new();
        let request = PushTokenRequest {
            user_id: Some("ghost".into()),
            token: Some("ExpoPushToken[abc]".into()),
        };
        assert!(update_push_token(&t.ctx, &request).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_profile_unknown_user() {
        let t = TestContext::new();
        let err = update_profile(&t.ctx, "ghost", Some("x"), None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_token_from_other_issuer_is_rejected() {
        let user = User {
            user_id: "u1".into(),
            code: "LOVII-AAAAAA".into(),
            password_hash: String::new(),
            name: None,
            avatar: None,
            push_token: None,
            created_at: 0,
        };
        let ours = TokenIssuer::new("secret", "couples-service", "couples-app", 1);
        let theirs = TokenIssuer::new("secret", "someone-else", "couples-app", 1);

        let token = theirs.issue(&user).unwrap();
        assert!(matches!(ours.verify(&token), Err(AppError::Auth(_))));
        assert_eq!(ours.verify(&ours.issue(&user).unwrap()).unwrap().sub, "u1");
    }

    #[tokio::test]
    async fn test_register_retries_code_collisions() {
        let mut t = TestContext::new();
        let users = Arc::new(CollidingUsers::new(t.store.clone(), 2));
        t.ctx.users = users.clone() as Arc<dyn UserStore>;

        let response = register(&t.ctx, &register_request("pw")).await.unwrap();

        assert_eq!(users.attempts.load(Ordering::SeqCst), 3);
        assert!(t.store.find_by_code(&response.user.code).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_register_gives_up_after_five_collisions() {
        let mut t = TestContext::new();
        let users = Arc::new(CollidingUsers::new(t.store.clone(), 10));
        t.ctx.users = users.clone() as Arc<dyn UserStore>;

        let err = register(&t.ctx, &register_request("pw")).await.unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(users.attempts.load(Ordering::SeqCst), 5);
    }
}
