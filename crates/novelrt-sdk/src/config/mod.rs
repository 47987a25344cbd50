//! SDK configuration
//!
//! Every value has a built-in default and can be overridden through an
//! environment variable, the same way template URLs are overridable for
//! development use.

use crate::error::{Result, SdkError};
use std::path::{Path, PathBuf};
use url::Url;

/// Default GitHub releases endpoint for the engine
pub const DEFAULT_RELEASES_URL: &str = "https://api.github.com/repos/novelrt/NovelRT/releases";

/// Default repository holding the Conan profile definitions
pub const DEFAULT_CONAN_CONFIG_URL: &str = "https://github.com/NovelRT/ConanConfig.git";

pub const RELEASES_URL_ENV: &str = "NOVELRT_RELEASES_URL";
pub const CONAN_CONFIG_URL_ENV: &str = "NOVELRT_CONAN_CONFIG_URL";
pub const TEMPLATE_DIR_ENV: &str = "NOVELRT_TEMPLATE_DIR";
pub const ENGINE_DIR_ENV: &str = "NOVELRT_ENGINE_DIR";
pub const CMAKE_ENV: &str = "NOVELRT_CMAKE";
pub const CONAN_ENV: &str = "NOVELRT_CONAN";
pub const STRICT_CACHE_ENV: &str = "NOVELRT_STRICT_CACHE";

/// Name of the template directory shipped next to the binary
const TEMPLATE_DIR_NAME: &str = "TemplateFiles";

/// How the artifact cache decides a version is already present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheValidation {
    /// A directory named after the tag is enough
    #[default]
    TrustExistence,
    /// The directory must also hold the completion marker written after extraction
    RequireMarker,
}

#[derive(Debug, Clone)]
pub struct SdkConfig {
    pub releases_url: String,
    pub conan_config_url: String,
    pub template_dir: PathBuf,
    pub engine_cache_dir: PathBuf,
    pub cmake_program: PathBuf,
    pub conan_program: PathBuf,
    pub cache_validation: CacheValidation,
    pub user_agent: String,
}

impl SdkConfig {
    /// Build the configuration from defaults and environment overrides
    pub fn from_env() -> Result<Self> {
        let template_dir = match std::env::var_os(TEMPLATE_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_template_dir(),
        };

        let engine_cache_dir = match std::env::var_os(ENGINE_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_engine_cache_dir()?,
        };

        let cache_validation = match std::env::var(STRICT_CACHE_ENV) {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => CacheValidation::RequireMarker,
            _ => CacheValidation::TrustExistence,
        };

        Ok(Self {
            releases_url: checked_url(RELEASES_URL_ENV, env_or(RELEASES_URL_ENV, DEFAULT_RELEASES_URL))?,
            conan_config_url: checked_url(
                CONAN_CONFIG_URL_ENV,
                env_or(CONAN_CONFIG_URL_ENV, DEFAULT_CONAN_CONFIG_URL),
            )?,
            template_dir,
            engine_cache_dir,
            cmake_program: PathBuf::from(env_or(CMAKE_ENV, "cmake")),
            conan_program: PathBuf::from(env_or(CONAN_ENV, "conan")),
            cache_validation,
            user_agent: default_user_agent(),
        })
    }

    /// Configuration rooted in explicit directories, with no environment lookups
    pub fn with_dirs(template_dir: impl Into<PathBuf>, engine_cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            releases_url: DEFAULT_RELEASES_URL.to_string(),
            conan_config_url: DEFAULT_CONAN_CONFIG_URL.to_string(),
            template_dir: template_dir.into(),
            engine_cache_dir: engine_cache_dir.into(),
            cmake_program: PathBuf::from("cmake"),
            conan_program: PathBuf::from("conan"),
            cache_validation: CacheValidation::TrustExistence,
            user_agent: default_user_agent(),
        }
    }

    /// Path of the CMake template tree
    pub fn cmake_template_dir(&self) -> PathBuf {
        self.template_dir.join("CMakeTemplate")
    }

    /// Path of the dependency manifest template
    pub fn conanfile_template(&self) -> PathBuf {
        self.template_dir.join("conanfile.py")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Reject a URL setting that does not parse, naming the variable it came from
fn checked_url(key: &str, value: String) -> Result<String> {
    match Url::parse(&value) {
        Ok(_) => Ok(value),
        Err(e) => Err(SdkError::acquisition_with(
            format!("Invalid URL in {}: {}", key, value),
            e,
        )),
    }
}

fn default_user_agent() -> String {
    format!("novelrt-sdk/{}", env!("CARGO_PKG_VERSION"))
}

/// Templates ship beside the executable; fall back to the working directory
fn default_template_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(TEMPLATE_DIR_NAME)))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from("templates"))
}

fn default_engine_cache_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .ok_or_else(|| SdkError::acquisition("Could not determine the local data directory"))?;
    Ok(base.join("NovelRT").join("Engine"))
}

/// Resolve a possibly relative path against the working directory
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    }
}
