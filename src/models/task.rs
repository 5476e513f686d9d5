use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: i64,
}

impl Task {
    pub fn new(user_id: &str, text: &str, completed: bool, created_at: i64) -> Self {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            text: text.to_string(),
            completed,
            created_at,
        }
    }
}

/// Lista de tarefas de um usuário, embutida num único documento (collection `user_tasks`)
/// para que a substituição completa seja atômica.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTasks {
    pub user_id: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub updated_at: i64,
}

/// Task as sent by the client
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub profile_id: Option<String>,
    pub user_id: Option<String>,
    pub text: Option<String>,
    pub completed: Option<bool>,
}

impl TaskInput {
    pub fn owner(&self) -> Option<&str> {
        self.profile_id
            .as_deref()
            .or(self.user_id.as_deref())
            .filter(|s| !s.is_empty())
    }
}
