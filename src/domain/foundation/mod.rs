//! Foundation types shared across domain modules.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode};
pub use ids::AccountId;
pub use timestamp::Timestamp;
