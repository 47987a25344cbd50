//! Detection of the external build tools and their minimum versions

use super::process::{Stream, ToolCommand};
use crate::error::{Result, SdkError};
use crate::release::version::parse_version;
use log::info;
use semver::Version;
use std::path::Path;

/// A tool the build phases depend on
#[derive(Debug, Clone)]
pub struct ToolRequirement {
    pub name: &'static str,
    pub minimum: Version,
}

pub fn cmake_requirement() -> ToolRequirement {
    ToolRequirement {
        name: "CMake",
        minimum: Version::new(3, 19, 8),
    }
}

pub fn conan_requirement() -> ToolRequirement {
    ToolRequirement {
        name: "Conan",
        minimum: Version::new(1, 43, 0),
    }
}

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: &'static str,
    pub version: Version,
}

/// Pull the version out of `<tool> version X.Y.Z` style output
pub fn parse_tool_version(output: &str) -> Option<Version> {
    let first_line = output.lines().map(str::trim).find(|line| !line.is_empty())?;
    let token = first_line.split_whitespace().last()?;
    parse_version(token)
}

/// Reject a version older than the requirement
pub fn check_version(requirement: &ToolRequirement, output: &str) -> Result<ToolInfo> {
    let version = parse_tool_version(output).ok_or_else(|| SdkError::ToolNotFound {
        tool: requirement.name.to_string(),
        reason: format!("could not read a version from '{}'", output.trim()),
    })?;

    if version < requirement.minimum {
        return Err(SdkError::ToolNotFound {
            tool: requirement.name.to_string(),
            reason: format!(
                "{} {} is not compatible with NovelRT at this time. Please use version {} or above.",
                requirement.name, version, requirement.minimum
            ),
        });
    }

    Ok(ToolInfo {
        name: requirement.name,
        version,
    })
}

/// Run `<program> --version` and check it against `requirement`
pub async fn check_tool(program: &Path, requirement: &ToolRequirement) -> Result<ToolInfo> {
    let mut stdout = String::new();
    let status = ToolCommand::new(program)
        .arg("--version")
        .run(|stream, line| {
            if stream == Stream::Stdout {
                stdout.push_str(line);
                stdout.push('\n');
            }
        })
        .await
        .map_err(|e| match e {
            SdkError::ToolNotFound { reason, .. } => SdkError::ToolNotFound {
                tool: requirement.name.to_string(),
                reason,
            },
            other => other,
        })?;

    if !status.success() {
        return Err(SdkError::ToolNotFound {
            tool: requirement.name.to_string(),
            reason: format!("{} --version exited with {}", program.display(), status),
        });
    }

    let info = check_version(requirement, &stdout)?;
    info!("Found {} version {}!", info.name, info.version);
    Ok(info)
}
