//! Error types shared by every stage of the SDK pipeline
//!
//! Lower-level I/O, HTTP and subprocess faults are translated into one of these
//! kinds at the component boundary, with enough context attached (paths, URLs,
//! versions, tool output) for the caller to report or retry.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the SDK
pub type Result<T, E = SdkError> = std::result::Result<T, E>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SdkError {
    /// Release index unreachable, release missing, or an asset download failed
    #[error("{message}")]
    Acquisition {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// No asset in a release carries the platform token
    #[error("No release asset supporting {platform} was found in {tag}")]
    UnsupportedPlatform { tag: String, platform: String },

    /// Archive corrupt or filesystem failure while unpacking
    #[error("Failed to extract {} into {}", archive.display(), destination.display())]
    Extraction {
        archive: PathBuf,
        destination: PathBuf,
        #[source]
        source: BoxedSource,
    },

    /// Copy, move or substitution failure while materializing a template
    #[error("Template generation failed at {}: {message}", path.display())]
    TemplateGeneration {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// `project.json` missing or unparsable
    #[error("Project definition {} could not be used: {message}", path.display())]
    ProjectDefinition {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Required external tool absent or too old
    #[error("{tool} is not available: {reason}")]
    ToolNotFound { tool: String, reason: String },

    /// Tool exited non-zero or the smoke test marker was absent
    #[error("{message}")]
    BuildFailure { message: String },

    /// The supplied local engine tree is not a NovelRT source checkout
    #[error("Invalid engine source at {}: {reason}", path.display())]
    InvalidEngineSource { path: PathBuf, reason: String },

    /// Publish destination already holds files
    #[error("The publish output directory {} is not empty", path.display())]
    PublishTargetNotEmpty { path: PathBuf },

    /// The user chose to quit at an interactive prompt
    #[error("Cancelled by user")]
    UserCancelled,

    /// Reading from or drawing to the terminal failed
    #[error("Terminal I/O failed")]
    Terminal {
        #[from]
        source: std::io::Error,
    },
}

impl SdkError {
    pub fn acquisition(message: impl Into<String>) -> Self {
        SdkError::Acquisition {
            message: message.into(),
            source: None,
        }
    }

    pub fn acquisition_with(
        message: impl Into<String>,
        source: impl Into<BoxedSource>,
    ) -> Self {
        SdkError::Acquisition {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn template(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        SdkError::TemplateGeneration {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn template_io(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        SdkError::TemplateGeneration {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn build_failure(message: impl Into<String>) -> Self {
        SdkError::BuildFailure {
            message: message.into(),
        }
    }

    /// Process exit status for this kind of failure.
    ///
    /// Template generation gets its own status so scripts can tell a
    /// half-written project tree apart from other failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            SdkError::UserCancelled => 0,
            SdkError::TemplateGeneration { .. } => 2,
            _ => 1,
        }
    }
}
