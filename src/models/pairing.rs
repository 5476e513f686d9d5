use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PairingStatus {
    /// Never written by the connect flow: pairing is direct, there is no accept step.
    Pending,
    Active,
}

/// Relação não-direcionada entre dois usuários (collection `pairings`)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Pairing {
    pub pairing_id: String,
    pub user_a: String,
    pub user_b: String,
    /// Chave canônica `menor:maior`, única no banco
    pub pair_key: String,
    pub status: PairingStatus,
    pub created_at: i64,
}

impl Pairing {
    pub fn new_active(user_a: &str, user_b: &str) -> Self {
        Pairing {
            pairing_id: uuid::Uuid::new_v4().to_string(),
            user_a: user_a.to_string(),
            user_b: user_b.to_string(),
            pair_key: pair_key(user_a, user_b),
            status: PairingStatus::Active,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }

    /// The side of the pairing that is not `user_id`.
    pub fn other_side(&self, user_id: &str) -> &str {
        if self.user_a == user_id {
            &self.user_b
        } else {
            &self.user_a
        }
    }
}

/// Order-independent key for an unordered pair of user ids.
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}:{}", a, b)
    } else {
        format!("{}:{}", b, a)
    }
}
