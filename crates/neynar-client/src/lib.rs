//! Neynar API Client
//!
//! Looks up Farcaster users by verified address in bulk and fetches the
//! power-user list. Bulk lookups retry transient failures with exponential
//! backoff and never surface an error to the caller: every failure mode
//! degrades to an empty result.
//!
//! # API Coverage
//!
//! - `GET /v2/farcaster/user/bulk-by-address` - Users keyed by queried address
//! - `GET /v2/farcaster/user/power_lite` - Power-user FIDs

mod client;
mod error;
mod retry;
mod types;

pub use client::NeynarClient;
pub use error::{NeynarError, Result};
pub use retry::RetryPolicy;
pub use types::{BulkUsersResponse, User, VerifiedAddresses};
