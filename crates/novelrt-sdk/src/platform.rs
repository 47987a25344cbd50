//! Host platform detection and the tokens each external source uses for it

use std::fmt;

/// Platforms NovelRT publishes prebuilt releases for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    /// Detect the platform this binary is running on
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Substring identifying this platform's asset in a GitHub release
    pub fn release_token(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Ubuntu",
            Platform::MacOs => "macOS",
        }
    }

    /// Substring identifying this platform in Conan profile names
    pub fn profile_token(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOs => "macOS",
        }
    }

    /// Suffix appended to executables built for this platform
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            _ => "",
        }
    }

    /// Whether third-party shared libraries must be staged next to the project.
    /// Linux resolves them through the system package manager instead.
    pub fn stages_shared_libraries(&self) -> bool {
        !matches!(self, Platform::Linux)
    }

    /// Whether build tool output follows the MSBuild layout rather than make/ninja
    pub fn uses_msbuild_output(&self) -> bool {
        matches!(self, Platform::Windows)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_tokens() {
        assert_eq!(Platform::Windows.release_token(), "Windows");
        assert_eq!(Platform::Linux.release_token(), "Ubuntu");
        assert_eq!(Platform::MacOs.release_token(), "macOS");
    }

    #[test]
    fn test_exe_suffix_only_on_windows() {
        assert_eq!(Platform::Windows.exe_suffix(), ".exe");
        assert_eq!(Platform::Linux.exe_suffix(), "");
        assert_eq!(Platform::MacOs.exe_suffix(), "");
    }

    #[test]
    fn test_shared_library_staging() {
        assert!(Platform::Windows.stages_shared_libraries());
        assert!(Platform::MacOs.stages_shared_libraries());
        assert!(!Platform::Linux.stages_shared_libraries());
    }
}
