use serde::{Deserialize, Serialize};

/// Usuário armazenado no MongoDB (collection `users`)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub user_id: String,  // PRIMARY IDENTIFIER - uuid v4 string
    /// Código de convite, ex: "LOVII-4F7Q2K"
    pub code: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub push_token: Option<String>,
    /// Unix timestamp em milissegundos
    pub created_at: i64,
}

/// Public projection returned by auth endpoints
#[derive(Debug, Serialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub code: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.user_id.clone(),
            code: user.code.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
        }
    }
}
