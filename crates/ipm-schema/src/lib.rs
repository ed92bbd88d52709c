//! Shared types for the IPM catalog.
//!
//! These are the records the backend stores and serves and the client
//! consumes: an [`IpRecord`] per hardware IP package, owning a mapping of
//! version string to [`Release`].

pub mod hash;
pub mod lenient;
pub mod record;
pub mod types;

// Re-exports
pub use hash::Sha256Hash;
pub use record::{IpRecord, IpType, Release};
pub use types::{IpName, Version};

/// Version token that selects the newest visible release of an IP.
///
/// Matched exactly and case-sensitively; `"Latest"` is an ordinary version key.
pub const LATEST: &str = "latest";
