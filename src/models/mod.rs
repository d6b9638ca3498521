pub mod stamp;
pub mod user;

pub use stamp::*;
pub use user::*;
