pub mod auth_service;
pub mod identity_service;
pub mod user_service;
pub mod user_store;

pub use identity_service::*;
pub use user_service::*;
pub use user_store::*;
