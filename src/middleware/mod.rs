pub mod auth;
pub mod security_headers;

pub use auth::AuthUser;
pub use security_headers::SecurityHeaders;
