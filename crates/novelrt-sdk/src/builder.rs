//! CMake configure/build phases and the post-build smoke test

use crate::context::{BuildType, PipelineContext};
use crate::error::Result;
use crate::platform::Platform;
use crate::runtime::output::{classify_build_line, classify_plain_line, emit};
use crate::runtime::{Stream, ToolCommand};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

/// Text the template's executable prints when it links and runs
pub const SMOKE_TEST_MARKER: &str = "Hello";

/// Cache variables that keep engine source builds lean
pub const SOURCE_BUILD_FLAGS: &[&str] = &[
    "-DNOVELRT_BUILD_DOCUMENTATION=OFF",
    "-DNOVELRT_BUILD_SAMPLES=OFF",
];

pub struct BuildOrchestrator {
    cmake: PathBuf,
    platform: Platform,
    verbose: bool,
}

impl BuildOrchestrator {
    pub fn new(cmake: impl Into<PathBuf>, platform: Platform, verbose: bool) -> Self {
        Self {
            cmake: cmake.into(),
            platform,
            verbose,
        }
    }

    pub fn from_context(ctx: &PipelineContext) -> Self {
        Self::new(ctx.config.cmake_program.clone(), ctx.platform, ctx.verbose)
    }

    pub async fn configure(
        &self,
        project_dir: &Path,
        build_dir: &Path,
        build_type: BuildType,
        from_source: bool,
    ) -> Result<()> {
        let mut command = ToolCommand::new(&self.cmake)
            .arg("-S")
            .arg(project_dir)
            .arg("-B")
            .arg(build_dir)
            .arg(format!("-DCMAKE_BUILD_TYPE={}", build_type));
        if from_source {
            warn!("Warning - automatically disabling documentation and sample generation for Engine builds.");
            command = command.args(SOURCE_BUILD_FLAGS.iter().copied());
        }

        info!("Configuring project...");
        command
            .run_checked("configure", |stream, line| emit(&classify_plain_line(line, stream)))
            .await
    }

    pub async fn build(&self, build_dir: &Path, build_type: BuildType) -> Result<()> {
        let (platform, verbose) = (self.platform, self.verbose);

        info!("Building project...");
        ToolCommand::new(&self.cmake)
            .arg("--build")
            .arg(build_dir)
            .args(["--config", build_type.as_str()])
            .run_checked("build", |stream, line| {
                emit(&classify_build_line(line, stream, platform, verbose))
            })
            .await
    }

    /// Where the built executable may live: the multi-config layout first,
    /// then the single-config one
    pub fn executable_candidates(
        &self,
        build_dir: &Path,
        project_name: &str,
        build_type: BuildType,
    ) -> Vec<PathBuf> {
        let file_name = format!("{}{}", project_name, self.platform.exe_suffix());
        let target_dir = build_dir.join("src").join(project_name);
        vec![
            target_dir.join(build_type.as_str()).join(&file_name),
            target_dir.join(&file_name),
        ]
    }

    /// Run the freshly built executable and look for [`SMOKE_TEST_MARKER`]
    /// on its stdout.
    ///
    /// A missing executable or one that never prints the marker counts as
    /// `false`, whatever its exit status.
    pub async fn confirm_build_success(
        &self,
        build_dir: &Path,
        project_name: &str,
        build_type: BuildType,
    ) -> Result<bool> {
        let candidates = self.executable_candidates(build_dir, project_name, build_type);
        let Some(executable) = candidates.iter().find(|path| path.is_file()) else {
            error!(
                "No built executable found at {}",
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(" or ")
            );
            return Ok(false);
        };

        info!("Checking for finished build...");
        let working_dir = executable.parent().unwrap_or(build_dir);
        let mut found = false;
        let status = ToolCommand::new(executable)
            .current_dir(working_dir)
            .run(|stream, line| match stream {
                Stream::Stdout => {
                    if !line.is_empty() {
                        info!("{}", line);
                    }
                    found |= line.contains(SMOKE_TEST_MARKER);
                }
                Stream::Stderr => emit(&classify_plain_line(line, stream)),
            })
            .await?;
        debug!("{} exited with {}", executable.display(), status);

        Ok(found)
    }
}
