//! HTTP handlers for pledge-api.

pub mod health;
pub mod notes;
