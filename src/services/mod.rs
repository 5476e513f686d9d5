pub mod auth_service;
pub mod media_service;
pub mod note_service;
pub mod pairing_service;
pub mod push_service;
pub mod sync_service;
pub mod task_service;
