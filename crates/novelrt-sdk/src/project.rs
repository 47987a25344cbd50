//! Persisted project metadata (`project.json` at the project root)

use crate::error::{Result, SdkError};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the metadata document
pub const PROJECT_FILE: &str = "project.json";

/// Project metadata mutated by each pipeline phase.
///
/// Fields this crate does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub engine_location: String,
    #[serde(default)]
    pub project_location: String,
    #[serde(default)]
    pub build_app: String,
    #[serde(default)]
    pub build_app_args: String,
    #[serde(default)]
    pub last_build_configuration: String,
    #[serde(default)]
    pub dependency_profile: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectDefinition {
    /// Location of the metadata file inside `project_dir`
    pub fn path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(PROJECT_FILE)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SdkError::ProjectDefinition {
            path: path.to_path_buf(),
            message: "failed to read".to_string(),
            source: Some(e.into()),
        })?;

        serde_json::from_str(&content).map_err(|e| SdkError::ProjectDefinition {
            path: path.to_path_buf(),
            message: "failed to parse".to_string(),
            source: Some(e.into()),
        })
    }

    fn to_pretty_json(&self, path: &Path) -> Result<String> {
        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| SdkError::ProjectDefinition {
                path: path.to_path_buf(),
                message: "failed to serialize".to_string(),
                source: Some(e.into()),
            })?;
        json.push('\n');
        Ok(json)
    }

    /// Write the document, replacing any existing one
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_pretty_json(path)?;
        fs::write(path, json).map_err(|e| SdkError::ProjectDefinition {
            path: path.to_path_buf(),
            message: "failed to write".to_string(),
            source: Some(e.into()),
        })
    }

    /// Write the document, failing if one already exists
    pub fn create(&self, path: &Path) -> Result<()> {
        let json = self.to_pretty_json(path)?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| SdkError::ProjectDefinition {
                path: path.to_path_buf(),
                message: "failed to create".to_string(),
                source: Some(e.into()),
            })?;
        file.write_all(json.as_bytes())
            .map_err(|e| SdkError::ProjectDefinition {
                path: path.to_path_buf(),
                message: "failed to write".to_string(),
                source: Some(e.into()),
            })
    }

    /// Read-modify-write the document at `path`.
    ///
    /// The file is only rewritten when `modify` actually changed something.
    /// Returns whether a write happened.
    pub fn update<F>(path: &Path, modify: F) -> Result<bool>
    where
        F: FnOnce(&mut ProjectDefinition),
    {
        let original = Self::load(path)?;
        let mut updated = original.clone();
        modify(&mut updated);

        if updated == original {
            debug!("{} unchanged", path.display());
            return Ok(false);
        }

        updated.save(path)?;
        debug!("Updated {}", path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ProjectDefinition {
        ProjectDefinition {
            name: "demo".to_string(),
            version: "0.0.1".to_string(),
            engine_location: "/opt/engine-v0.1.0".to_string(),
            project_location: "/tmp/demo".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_field_names_are_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["engineLocation"], "/opt/engine-v0.1.0");
        assert_eq!(json["dependencyProfile"], "");
        assert!(json.get("lastBuildConfiguration").is_some());
    }

    #[test]
    fn test_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = ProjectDefinition::load(&tmp.path().join(PROJECT_FILE)).unwrap_err();
        assert!(matches!(err, SdkError::ProjectDefinition { .. }));

        let err = ProjectDefinition::update(&tmp.path().join(PROJECT_FILE), |_| {}).unwrap_err();
        assert!(matches!(err, SdkError::ProjectDefinition { .. }));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_FILE);
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ProjectDefinition::load(&path).unwrap_err(),
            SdkError::ProjectDefinition { .. }
        ));
    }

    #[test]
    fn test_update_only_writes_on_change() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_FILE);
        sample().create(&path).unwrap();

        let wrote = ProjectDefinition::update(&path, |def| def.name = "demo".to_string()).unwrap();
        assert!(!wrote);

        let wrote = ProjectDefinition::update(&path, |def| {
            def.dependency_profile = "linux-gcc-x64".to_string()
        })
        .unwrap();
        assert!(wrote);
        assert_eq!(
            ProjectDefinition::load(&path).unwrap().dependency_profile,
            "linux-gcc-x64"
        );
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_FILE);
        fs::write(
            &path,
            r#"{"name": "demo", "customTool": {"enabled": true}, "tags": [1, 2]}"#,
        )
        .unwrap();

        ProjectDefinition::update(&path, |def| def.build_app = "conan".to_string()).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["customTool"]["enabled"], true);
        assert_eq!(raw["tags"][1], 2);
        assert_eq!(raw["buildApp"], "conan");
    }

    #[test]
    fn test_create_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_FILE);
        sample().create(&path).unwrap();
        assert!(sample().create(&path).is_err());
    }
}
