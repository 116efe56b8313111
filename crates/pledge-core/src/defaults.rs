//! Centralized default constants for pledgewatch.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates should reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for note list endpoints.
pub const PAGE_LIMIT: i64 = 50;

/// Hard upper bound on a single page of notes.
pub const PAGE_LIMIT_MAX: i64 = 100;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

// =============================================================================
// SCORING
// =============================================================================

/// Version label of the scoring model whose outputs are stored alongside notes.
pub const ALGORITHM_VERSION: &str = "1.0.0";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default HTTP bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default database URL when `DATABASE_URL` is unset.
pub const DATABASE_URL: &str = "postgres://localhost/pledgewatch";

/// Default maximum pool connections.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Seconds a request waits for a pooled connection.
pub const DB_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Maximum accepted request body size in bytes.
pub const REQUEST_BODY_LIMIT: usize = 1024 * 1024;

/// Default CORS origin whitelist.
pub const ALLOWED_ORIGINS: &str = "http://localhost:3000";
