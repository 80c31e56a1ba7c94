//! Farcaster Address Resolver
//!
//! Turns wallet addresses found on web pages into Farcaster identities.
//! Concurrent `resolve` calls are coalesced into debounced batches so that
//! many requests cost one Neynar lookup; results are cached with a TTL and
//! annotated with a slowly refreshed power-user flag.

pub mod config;
pub mod enrichment;
pub mod error;
pub mod resolver;
pub mod types;

pub use config::{Config, ResolverConfig};
pub use enrichment::{NotableMembers, RefreshStatus};
pub use error::{ResolverError, Result};
pub use resolver::NameResolver;
pub use types::{CacheMetadata, IdentityKind, ResolvedIdentity};
