pub mod amazon;
pub mod cache;
pub mod error;
pub mod rate_limit;
pub mod shipstation;

pub use error::{ServiceError, ServiceResult};
