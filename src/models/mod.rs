pub mod note;
pub mod pairing;
pub mod task;
pub mod user;

pub use note::*;
pub use pairing::*;
pub use task::*;
pub use user::*;
