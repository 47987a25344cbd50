//! Engine release acquisition
//!
//! This module provides:
//! - Release listing and asset selection against the GitHub releases API
//! - A local cache of extracted releases keyed by tag
//! - The acquirer that downloads into the cache only when needed
//! - Engine version gating

pub mod acquirer;
pub mod cache;
pub mod index;
pub mod version;

pub use acquirer::{AcquiredEngine, ReleaseAcquirer};
pub use cache::ArtifactCache;
pub use index::{
    select_asset, Release, ReleaseAsset, ReleaseIndex, ReleaseIndexClient, VersionSelector,
};
pub use version::{check_compatibility, is_supported, MINIMUM_SUPPORTED_VERSION};
