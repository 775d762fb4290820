pub mod profile_service;
pub mod user_service;

pub use profile_service::*;
pub use user_service::*;
