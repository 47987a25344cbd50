//! Dependency installation through Conan
//!
//! Every phase shells out to `conan` and then records what it did in the
//! project's `project.json`.

use crate::context::{BuildType, PipelineContext};
use crate::error::{Result, SdkError};
use crate::platform::Platform;
use crate::project::ProjectDefinition;
use crate::prompt::{select_numbered, Prompt};
use crate::runtime::output::{
    classify_build_line, classify_config_line, classify_plain_line, emit, ProfileSet,
};
use crate::runtime::ToolCommand;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Value recorded as `buildApp` once Conan has installed dependencies
pub const BUILD_APP: &str = "conan";

const INSTALL_ARGS: &str = "--build=missing";

pub struct DependencyInstaller {
    program: PathBuf,
    project_file: PathBuf,
    platform: Platform,
    build_type: BuildType,
    verbose: bool,
}

impl DependencyInstaller {
    /// Installer for the project whose metadata lives at `project_file`
    pub fn new(ctx: &PipelineContext, project_file: impl Into<PathBuf>) -> Self {
        Self {
            program: ctx.config.conan_program.clone(),
            project_file: project_file.into(),
            platform: ctx.platform,
            build_type: ctx.build_type,
            verbose: ctx.verbose,
        }
    }

    pub fn project_file(&self) -> &Path {
        &self.project_file
    }

    /// Install profile definitions from `url` and return the profiles it reported
    pub async fn install_configuration_sources(&self, url: &str) -> Result<ProfileSet> {
        info!("Downloading available Conan configurations from: {}...", url);

        let mut profiles = ProfileSet::default();
        ToolCommand::new(&self.program)
            .args(["config", "install", url])
            .run_checked("config install", |stream, line| {
                let event = classify_config_line(line, stream);
                emit(&event);
                profiles = std::mem::take(&mut profiles).with(&event);
            })
            .await?;

        Ok(profiles)
    }

    /// Ask the user to pick one of the general-purpose profiles for this platform
    pub fn resolve_profile<P: Prompt + ?Sized>(
        &self,
        profiles: &ProfileSet,
        prompt: &mut P,
    ) -> Result<String> {
        let token = self.platform.profile_token();
        let offered = profiles.offered_for(token);
        if offered.is_empty() {
            return Err(SdkError::build_failure(format!(
                "No Conan profiles for {} were installed",
                self.platform
            )));
        }

        info!("Please choose a configuration that is applicable to your build system.");
        warn!("Note: choosing an invalid configuration will cause the build and configure options to fail.");

        let index = select_numbered(prompt, "Please select a proper number or Q to quit: ", &offered)?;
        Ok(offered[index].clone())
    }

    /// `conan install <manifest> -if <dir> --build=missing -pr <profile>`
    pub async fn install(&self, manifest: &Path, output_dir: &Path, profile: &str) -> Result<()> {
        info!("Installing dependencies with profile {}...", profile);

        ToolCommand::new(&self.program)
            .arg("install")
            .arg(manifest)
            .arg("-if")
            .arg(output_dir)
            .arg(INSTALL_ARGS)
            .args(["-pr", profile])
            .run_checked("install", |stream, line| emit(&classify_plain_line(line, stream)))
            .await?;

        ProjectDefinition::update(&self.project_file, |definition| {
            definition.build_app = BUILD_APP.to_string();
            definition.build_app_args = INSTALL_ARGS.to_string();
            definition.dependency_profile = profile.to_string();
        })?;
        Ok(())
    }

    /// `conan build <manifest> --build-folder <dir> --configure`
    pub async fn configure(&self, manifest: &Path, output_dir: &Path) -> Result<()> {
        info!("Configuring project...");

        ToolCommand::new(&self.program)
            .arg("build")
            .arg(manifest)
            .arg("--build-folder")
            .arg(output_dir)
            .arg("--configure")
            .run_checked("configure", |stream, line| emit(&classify_plain_line(line, stream)))
            .await?;

        self.record_build_configuration()
    }

    /// `conan build <manifest> --build-folder <dir> --build`
    pub async fn build(&self, manifest: &Path, output_dir: &Path) -> Result<()> {
        info!("Building project...");

        let (platform, verbose) = (self.platform, self.verbose);
        ToolCommand::new(&self.program)
            .arg("build")
            .arg(manifest)
            .arg("--build-folder")
            .arg(output_dir)
            .arg("--build")
            .run_checked("build", |stream, line| {
                emit(&classify_build_line(line, stream, platform, verbose))
            })
            .await?;

        self.record_build_configuration()
    }

    fn record_build_configuration(&self) -> Result<()> {
        let build_type = self.build_type.as_str();
        ProjectDefinition::update(&self.project_file, |definition| {
            definition.last_build_configuration = build_type.to_string();
        })?;
        Ok(())
    }
}
