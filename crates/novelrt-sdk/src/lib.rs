//! NovelRT SDK - acquire the engine, generate projects and drive their builds
//!
//! The library is organized into layers:
//!
//! - **Components** - release index and cache, template engine, Conan and
//!   CMake drivers, each usable on its own
//! - **Pipelines** - the "new project" and "build project" workflows that
//!   sequence the components against an explicit [`PipelineContext`]
//! - **Terminal front end** - cliclack-framed command runners and the
//!   terminal-backed [`Prompt`] (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based terminal front end
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use novelrt_sdk::{
//!     NewProjectOptions, NewProjectPipeline, PipelineContext, ReleaseIndexClient, Result,
//!     ScriptedPrompt, SdkConfig,
//! };
//!
//! async fn create(options: NewProjectOptions) -> Result<()> {
//!     let ctx = PipelineContext::new(SdkConfig::from_env()?, false);
//!     let index = ReleaseIndexClient::from_config(&ctx.config)?;
//!     let outcome = NewProjectPipeline::new(&ctx, index)
//!         .run(&options, &mut ScriptedPrompt::new(["1"]))
//!         .await?;
//!     println!("{} is at {:?}", outcome.project_name, outcome.stage);
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod conan;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod project;
pub mod prompt;
pub mod publish;
pub mod release;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use builder::BuildOrchestrator;
pub use conan::DependencyInstaller;
pub use config::{CacheValidation, SdkConfig};
pub use context::{BuildType, GenerationMode, PipelineContext};
pub use error::{Result, SdkError};
pub use pipeline::{
    build_project, validate_engine_source, NewProjectOptions, NewProjectOutcome,
    NewProjectPipeline, PipelineStage,
};
pub use platform::Platform;
pub use project::ProjectDefinition;
pub use prompt::{Prompt, ScriptedPrompt};
pub use release::{ArtifactCache, ReleaseAcquirer, ReleaseIndexClient, VersionSelector};
pub use templates::ProjectTemplateEngine;
