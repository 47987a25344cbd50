//! Release builds copied out to a deployment directory

use crate::builder::BuildOrchestrator;
use crate::context::{BuildType, PipelineContext};
use crate::error::{Result, SdkError};
use crate::templates::copier::{copy_dir, CopyMode};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Scratch build directory created inside the project
pub const PUBLISH_BUILD_DIR: &str = "PublishOutput";

/// True when `dir` exists and holds at least one entry
fn has_entries(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    let mut entries = fs::read_dir(dir).map_err(|e| {
        SdkError::build_failure(format!("Failed to read {}: {}", dir.display(), e))
    })?;
    Ok(entries.next().is_some())
}

/// Build `project_dir` in Release and move the build tree to `output_dir`.
///
/// Fails with [`SdkError::PublishTargetNotEmpty`] before building anything
/// if `output_dir` already holds files.
pub async fn publish(ctx: &PipelineContext, project_dir: &Path, output_dir: &Path) -> Result<PathBuf> {
    if has_entries(output_dir)? {
        return Err(SdkError::PublishTargetNotEmpty {
            path: output_dir.to_path_buf(),
        });
    }

    let build_dir = project_dir.join(PUBLISH_BUILD_DIR);
    if build_dir.exists() {
        debug!("Removing stale {}", build_dir.display());
        fs::remove_dir_all(&build_dir).map_err(|e| {
            SdkError::build_failure(format!("Failed to remove {}: {}", build_dir.display(), e))
        })?;
    }
    fs::create_dir_all(&build_dir).map_err(|e| {
        SdkError::build_failure(format!("Failed to create {}: {}", build_dir.display(), e))
    })?;

    let orchestrator = BuildOrchestrator::from_context(ctx);
    orchestrator
        .configure(project_dir, &build_dir, BuildType::Release, false)
        .await?;
    orchestrator.build(&build_dir, BuildType::Release).await?;

    info!("Publishing to {}", output_dir.display());
    move_dir(&build_dir, output_dir)?;
    Ok(output_dir.to_path_buf())
}

/// Rename `from` to `to`, copying instead when they sit on different filesystems
fn move_dir(from: &Path, to: &Path) -> Result<()> {
    if to.is_dir() {
        fs::remove_dir(to).map_err(|e| {
            SdkError::build_failure(format!("Failed to replace {}: {}", to.display(), e))
        })?;
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            SdkError::build_failure(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    debug!("Rename failed, copying {} instead", from.display());
    copy_dir(from, to, CopyMode::Create)?;
    fs::remove_dir_all(from).map_err(|e| {
        SdkError::build_failure(format!("Failed to remove {}: {}", from.display(), e))
    })
}
