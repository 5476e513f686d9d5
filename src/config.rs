use std::env;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

/// Configuração do serviço, carregada das variáveis de ambiente (.env via dotenv)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_ttl_hours: i64,
    pub bcrypt_cost: u32,
    /// Prefixo do código de convite ("LOVII" -> "LOVII-4F7Q2K")
    pub code_prefix: String,
    pub expo_push_url: String,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_upload_preset: Option<String>,
    pub max_json_bytes: usize,
}

#[derive(Debug)]
pub struct ConfigError(String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError("DATABASE_URL must be set".to_string()))?;

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                log::warn!("⚠️  JWT_SECRET not set, using the development default");
                "default-secret-change-me".to_string()
            }
        };

        Ok(AppConfig {
            host: string_or("HOST", "0.0.0.0"),
            port: parse_or(&lookup, "PORT", 3000)?,
            database_url,
            jwt_secret,
            jwt_issuer: string_or("JWT_ISSUER", "couples-service"),
            jwt_audience: string_or("JWT_AUDIENCE", "couples-app"),
            jwt_ttl_hours: parse_or(&lookup, "JWT_TTL_HOURS", 720)?,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", 10)?,
            code_prefix: string_or("CODE_PREFIX", "LOVII"),
            expo_push_url: string_or("EXPO_PUSH_URL", DEFAULT_EXPO_PUSH_URL),
            cloudinary_cloud_name: lookup("CLOUDINARY_CLOUD_NAME").filter(|v| !v.is_empty()),
            cloudinary_upload_preset: lookup("CLOUDINARY_UPLOAD_PRESET").filter(|v| !v.is_empty()),
            max_json_bytes: parse_or(&lookup, "MAX_JSON_BYTES", 50 * 1024 * 1024)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "mongodb://localhost/lovii")]))
                .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.code_prefix, "LOVII");
        assert_eq!(config.expo_push_url, DEFAULT_EXPO_PUSH_URL);
        assert!(config.cloudinary_cloud_name.is_none());
    }

    #[test]
    fn test_missing_database_url() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_number() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "mongodb://localhost/lovii"),
            ("PORT", "http"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
