use rand::Rng;

use crate::utils::error::AppError;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const CODE_SUFFIX_LEN: usize = 6;

/// Hash de senha com bcrypt (salt aleatório embutido no hash).
///
/// bcrypt is CPU-bound, so both operations run on the blocking pool.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_string();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hashed)
    }

    /// Returns `false` for a wrong password and for a malformed stored hash alike.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_string();
        let hash = hash.to_string();
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;

        match valid {
            Ok(valid) => Ok(valid),
            Err(e) => {
                log::warn!("⚠️  Stored password hash could not be verified: {}", e);
                Ok(false)
            }
        }
    }
}

/// Gera um código de convite: `PREFIX-` + 6 caracteres [A-Z0-9]
pub fn generate_invite_code(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CODE_SUFFIX_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", prefix, suffix)
}
