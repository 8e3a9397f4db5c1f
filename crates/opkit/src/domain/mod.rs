//! Domain types for operator packages.
//!
//! A [`Package`] owns an arena of [`VersionRecord`]s (one per CSV) and a set
//! of [`Channel`]s. Channel version lists are derived data: they are
//! recomputed by the update-graph resolver after every edit.

mod channel;
mod package;
mod record;

pub use channel::Channel;
pub use package::Package;
pub use record::VersionRecord;

/// Maximum length of a Kubernetes object name (DNS-1123 subdomain).
pub const MAX_NAME_LENGTH: usize = 253;

/// Maximum length of a channel name.
pub const MAX_CHANNEL_NAME_LENGTH: usize = 63;
