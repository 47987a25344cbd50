//! Explicit per-run context handed to every pipeline component

use crate::config::SdkConfig;
use crate::platform::Platform;
use std::fmt;

/// How the engine is consumed by a generated project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Engine comes from an extracted release archive
    Prebuilt,
    /// Engine is built from a local source tree alongside the project
    FromSource,
}

impl GenerationMode {
    pub fn is_from_source(&self) -> bool {
        matches!(self, GenerationMode::FromSource)
    }
}

/// Build configuration passed to CMake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildType {
    #[default]
    Debug,
    Release,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings that stay fixed for the whole run
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub config: SdkConfig,
    pub platform: Platform,
    pub verbose: bool,
    pub build_type: BuildType,
}

impl PipelineContext {
    pub fn new(config: SdkConfig, verbose: bool) -> Self {
        Self {
            config,
            platform: Platform::current(),
            verbose,
            build_type: BuildType::Debug,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }
}
