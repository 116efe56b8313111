//! Request middleware.

pub mod rate_limit;
pub mod request_id;

pub use rate_limit::rate_limit_middleware;
pub use request_id::MakeRequestUuidV7;
