pub mod enums;
pub mod document;
pub mod user;
pub mod verification;

pub use document::*;
pub use user::*;
pub use verification::*;
