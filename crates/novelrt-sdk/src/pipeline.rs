//! The "new project" and "build project" workflows
//!
//! Stages run strictly in sequence and the first failure ends the run.
//! Nothing already written is rolled back.

use crate::builder::BuildOrchestrator;
use crate::conan::DependencyInstaller;
use crate::config::absolutize;
use crate::context::{GenerationMode, PipelineContext};
use crate::error::{Result, SdkError};
use crate::project::ProjectDefinition;
use crate::prompt::Prompt;
use crate::release::{check_compatibility, ArtifactCache, ReleaseAcquirer, ReleaseIndex, VersionSelector};
use crate::runtime::{check_tool, cmake_requirement, conan_requirement};
use crate::templates::ProjectTemplateEngine;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Build directory created inside a generated project
pub const BUILD_DIR: &str = "build";

/// Dependency manifest at the project root
pub const MANIFEST_FILE: &str = "conanfile.py";

/// How far a "new project" run got
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Unresolved,
    Acquired,
    Generated,
    Configured,
    Built,
}

#[derive(Debug, Clone)]
pub struct NewProjectOptions {
    pub output_dir: PathBuf,
    /// Local engine source tree; selects [`GenerationMode::FromSource`]
    pub engine_location: Option<PathBuf>,
    pub version: VersionSelector,
    pub configure: bool,
    pub build: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProjectOutcome {
    pub project_name: String,
    pub project_dir: PathBuf,
    pub mode: GenerationMode,
    /// Release tag used, `None` for source builds
    pub engine_tag: Option<String>,
    pub stage: PipelineStage,
}

/// Check that `path` looks like a NovelRT source checkout: a top-level
/// `CMakeLists.txt` and at least one header under `include/NovelRT`
pub fn validate_engine_source(path: &Path) -> Result<PathBuf> {
    let path = absolutize(path);

    let cmake_lists = path.join("CMakeLists.txt");
    if !cmake_lists.is_file() {
        return Err(SdkError::InvalidEngineSource {
            path: path.clone(),
            reason: format!("NovelRT CMakeLists file not found at {}", cmake_lists.display()),
        });
    }

    let headers = path.join("include").join("NovelRT");
    let has_header = WalkDir::new(&headers)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .any(|entry| {
            entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "h")
        });
    if !has_header {
        return Err(SdkError::InvalidEngineSource {
            path: path.clone(),
            reason: format!("No header files were found at {}", headers.display()),
        });
    }

    Ok(path)
}

pub struct NewProjectPipeline<'a, I: ReleaseIndex> {
    ctx: &'a PipelineContext,
    acquirer: ReleaseAcquirer<I>,
}

impl<'a, I: ReleaseIndex> NewProjectPipeline<'a, I> {
    pub fn new(ctx: &'a PipelineContext, index: I) -> Self {
        let cache = ArtifactCache::from_config(&ctx.config);
        Self {
            ctx,
            acquirer: ReleaseAcquirer::new(index, cache, ctx.platform),
        }
    }

    pub async fn run<P: Prompt + ?Sized>(
        &self,
        options: &NewProjectOptions,
        prompt: &mut P,
    ) -> Result<NewProjectOutcome> {
        let mut will_configure = options.configure;
        let mut will_build = options.build;

        let (mode, engine_location, engine_tag) = match &options.engine_location {
            Some(location) => {
                warn!("Warning - Source build of NovelRT was selected.");
                warn!("Please note that any modifications made to NovelRT may not be supported by the NovelRT team.");
                info!("Confirming engine location...");
                let location = validate_engine_source(location)?;
                debug!("Confirmed engine location.");
                (GenerationMode::FromSource, location, None)
            }
            None => {
                let engine = self.acquirer.acquire(&options.version, prompt).await?;
                if let Some(message) = check_compatibility(&engine.tag) {
                    warn!("{}", message);
                    will_configure = false;
                    will_build = false;
                }
                (GenerationMode::Prebuilt, engine.path, Some(engine.tag))
            }
        };

        let project_dir = absolutize(&options.output_dir);
        let mut outcome = NewProjectOutcome {
            project_name: String::new(),
            project_dir: project_dir.clone(),
            mode,
            engine_tag,
            stage: PipelineStage::Acquired,
        };

        match &outcome.engine_tag {
            Some(tag) => info!("Generating project in {} with NovelRT {}", project_dir.display(), tag),
            None => info!(
                "Generating project in {} using source build of NovelRT...",
                project_dir.display()
            ),
        }

        let generator = ProjectTemplateEngine::from_config(&self.ctx.config, self.ctx.platform);
        outcome.project_name = generator.generate(&project_dir, &engine_location, mode)?;
        outcome.stage = PipelineStage::Generated;
        info!("Successfully generated new NovelRT project!");

        if !will_configure && !will_build {
            return Ok(outcome);
        }

        let build_dir = project_dir.join(BUILD_DIR);
        self.install_dependencies(&project_dir, &build_dir, prompt).await?;

        let orchestrator = BuildOrchestrator::from_context(self.ctx);
        let build_type = self.ctx.build_type;

        if will_configure {
            orchestrator
                .configure(&project_dir, &build_dir, build_type, mode.is_from_source())
                .await?;
            outcome.stage = PipelineStage::Configured;
        }

        if will_build {
            if !will_configure {
                warn!("Warning - building without specifying configuration flag may cause issues during CMake configuration/building!");
            }
            orchestrator.build(&build_dir, build_type).await?;

            if !orchestrator
                .confirm_build_success(&build_dir, &outcome.project_name, build_type)
                .await?
            {
                return Err(SdkError::build_failure(
                    "Something went wrong while trying to build your project.",
                ));
            }
            outcome.stage = PipelineStage::Built;
            info!("Successfully generated and built project!");
        }

        Ok(outcome)
    }

    async fn install_dependencies<P: Prompt + ?Sized>(
        &self,
        project_dir: &Path,
        build_dir: &Path,
        prompt: &mut P,
    ) -> Result<()> {
        info!("Checking for required applications to build your project...");
        check_tool(&self.ctx.config.cmake_program, &cmake_requirement()).await?;
        check_tool(&self.ctx.config.conan_program, &conan_requirement()).await?;

        let installer = DependencyInstaller::new(self.ctx, ProjectDefinition::path_in(project_dir));
        let profiles = installer
            .install_configuration_sources(&self.ctx.config.conan_config_url)
            .await?;
        let profile = installer.resolve_profile(&profiles, prompt)?;
        installer
            .install(&project_dir.join(MANIFEST_FILE), build_dir, &profile)
            .await
    }
}

/// Install, configure and build an existing project through Conan.
///
/// The stored dependency profile is reused; one is chosen interactively
/// when the project has none yet.
pub async fn build_project<P: Prompt + ?Sized>(
    ctx: &PipelineContext,
    project_dir: &Path,
    prompt: &mut P,
) -> Result<ProjectDefinition> {
    let project_dir = absolutize(project_dir);
    let project_file = ProjectDefinition::path_in(&project_dir);
    let definition = ProjectDefinition::load(&project_file)?;
    info!("Building {} {}", definition.name, definition.version);

    check_tool(&ctx.config.conan_program, &conan_requirement()).await?;

    let installer = DependencyInstaller::new(ctx, &project_file);
    let manifest = project_dir.join(MANIFEST_FILE);
    let build_dir = project_dir.join(BUILD_DIR);

    let profile = if definition.dependency_profile.is_empty() {
        let profiles = installer
            .install_configuration_sources(&ctx.config.conan_config_url)
            .await?;
        installer.resolve_profile(&profiles, prompt)?
    } else {
        debug!("Using stored profile {}", definition.dependency_profile);
        definition.dependency_profile.clone()
    };

    installer.install(&manifest, &build_dir, &profile).await?;
    installer.configure(&manifest, &build_dir).await?;
    installer.build(&manifest, &build_dir).await?;

    ProjectDefinition::load(&project_file)
}
