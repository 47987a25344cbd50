//! Engine and tool version comparison

use semver::Version;

/// Oldest engine release the generated build files support
pub const MINIMUM_SUPPORTED_VERSION: Version = Version::new(0, 1, 0);

/// Parse a version string, tolerating a leading `v` and missing components
/// (`v0.1` parses as `0.1.0`, `3.22` as `3.22.0`)
pub fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);

    if let Ok(v) = Version::parse(cleaned) {
        return Some(v);
    }

    // Pad to three numeric components, dropping any pre-release/build suffix
    let core = cleaned.split(['-', '+']).next().unwrap_or(cleaned);
    let mut parts = core.split('.').map(|p| p.parse::<u64>().ok());
    let major = parts.next()??;
    let minor = parts.next().unwrap_or(Some(0))?;
    let patch = parts.next().unwrap_or(Some(0))?;
    if parts.next().is_some() {
        return None;
    }
    Some(Version::new(major, minor, patch))
}

/// Whether an engine tag is new enough for configure/build support.
/// Tags that do not parse are treated as unsupported.
pub fn is_supported(tag: &str) -> bool {
    parse_version(tag).is_some_and(|v| v >= MINIMUM_SUPPORTED_VERSION)
}

/// Returns a warning message if the engine tag predates the supported minimum
pub fn check_compatibility(tag: &str) -> Option<String> {
    if is_supported(tag) {
        None
    } else {
        Some(format!(
            "Warning - NovelRT {} is NOT supported. Configuration/building is disabled at this time.",
            tag
        ))
    }
}
