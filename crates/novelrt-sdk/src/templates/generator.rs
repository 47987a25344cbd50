//! Materialize the CMake project template into an output directory

use super::copier::{copy_dir, copy_file, copy_matching_files, CopyMode};
use super::substitution::{apply_build_tokens, apply_project_values, ProjectValues};
use crate::config::SdkConfig;
use crate::context::GenerationMode;
use crate::error::{Result, SdkError};
use crate::platform::Platform;
use crate::project::ProjectDefinition;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory name replaced by the project name
pub const PLACEHOLDER_DIR: &str = "PROJECT_NAME";

/// File kept only so an otherwise empty template directory exists
pub const MARKER_FILE: &str = "DeleteMe.txt";

/// Suffix of the build description files that get token substitution
const BUILD_FILE_SUFFIX: &str = "CMakeLists.txt";

const MANIFEST_FILE: &str = "conanfile.py";

pub struct ProjectTemplateEngine {
    cmake_template: PathBuf,
    conanfile_template: PathBuf,
    platform: Platform,
}

impl ProjectTemplateEngine {
    pub fn new(
        cmake_template: impl Into<PathBuf>,
        conanfile_template: impl Into<PathBuf>,
        platform: Platform,
    ) -> Self {
        Self {
            cmake_template: cmake_template.into(),
            conanfile_template: conanfile_template.into(),
            platform,
        }
    }

    pub fn from_config(config: &SdkConfig, platform: Platform) -> Self {
        Self::new(
            config.cmake_template_dir(),
            config.conanfile_template(),
            platform,
        )
    }

    /// Generate a project in `output_dir` and return its name.
    ///
    /// The name is the leaf of `output_dir`. Any failure leaves whatever was
    /// already written in place; nothing is rolled back.
    pub fn generate(
        &self,
        output_dir: &Path,
        engine_location: &Path,
        mode: GenerationMode,
    ) -> Result<String> {
        let project_name = project_name_for(output_dir)?;
        let values = ProjectValues::for_project(&project_name);

        debug!("Attempting to copy template to {}.", output_dir.display());
        copy_dir(&self.cmake_template, output_dir, CopyMode::Create)?;

        rename_placeholder_dirs(output_dir, &project_name)?;
        delete_marker_files(output_dir)?;

        for build_file in build_files(output_dir)? {
            info!("Generating {}", build_file.display());
            rewrite(&build_file, |contents| {
                apply_build_tokens(contents, &values, mode, engine_location)
            })?;
        }

        let manifest = output_dir.join(MANIFEST_FILE);
        copy_file(&self.conanfile_template, &manifest, CopyMode::Create)?;
        info!("Generating {}", manifest.display());
        rewrite(&manifest, |contents| apply_project_values(contents, &values))?;

        if mode == GenerationMode::Prebuilt {
            self.stage_engine_binaries(engine_location, output_dir)?;
        }

        let definition = ProjectDefinition {
            name: project_name.clone(),
            version: values.version.clone(),
            engine_location: engine_location.to_string_lossy().into_owned(),
            project_location: output_dir.to_string_lossy().into_owned(),
            ..Default::default()
        };
        let definition_path = ProjectDefinition::path_in(output_dir);
        definition
            .create(&definition_path)
            .map_err(|e| SdkError::template(&definition_path, e.to_string()))?;

        Ok(project_name)
    }

    /// Copy resources, and shared libraries where the toolchain will not find
    /// them on its own, from the prebuilt engine's `bin` directory
    fn stage_engine_binaries(&self, engine_location: &Path, output_dir: &Path) -> Result<()> {
        let bin = engine_location.join("bin");

        let resources = bin.join("Resources");
        if resources.is_dir() {
            info!("Copying engine resources...");
            copy_dir(&resources, &output_dir.join("Resources"), CopyMode::Overwrite)?;
        } else {
            debug!("No engine resources at {}", resources.display());
        }

        if self.platform.stages_shared_libraries() {
            let copied = copy_matching_files(
                &bin,
                &output_dir.join("bin"),
                CopyMode::Overwrite,
                is_shared_library,
            )?;
            debug!("Staged {} shared libraries", copied.len());
        }

        Ok(())
    }
}

/// The project name is the output directory's leaf name
pub fn project_name_for(output_dir: &Path) -> Result<String> {
    output_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| SdkError::template(output_dir, "cannot derive a project name"))
}

fn is_shared_library(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dll") || ext.eq_ignore_ascii_case("dylib"))
}

/// Rename `PROJECT_NAME` directories, parent before children, so child
/// paths are computed under the renamed parent
fn rename_placeholder_dirs(dir: &Path, project_name: &str) -> Result<()> {
    let mut subdirs = Vec::new();
    let entries =
        fs::read_dir(dir).map_err(|e| SdkError::template_io(dir, "failed to read directory", e))?;
    for entry in entries {
        let entry =
            entry.map_err(|e| SdkError::template_io(dir, "failed to read directory", e))?;
        if entry.path().is_dir() {
            subdirs.push(entry);
        }
    }

    for entry in subdirs {
        let mut path = entry.path();
        if entry.file_name() == PLACEHOLDER_DIR {
            let renamed = dir.join(project_name);
            fs::rename(&path, &renamed)
                .map_err(|e| SdkError::template_io(&path, "failed to rename directory", e))?;
            path = renamed;
        }
        rename_placeholder_dirs(&path, project_name)?;
    }

    Ok(())
}

/// Remove every marker file below the project root, logging the directory
/// it was holding open
fn delete_marker_files(root: &Path) -> Result<()> {
    let mut markers = Vec::new();
    for entry in WalkDir::new(root).min_depth(2) {
        let entry = entry.map_err(|e| SdkError::template(root, e.to_string()))?;
        if entry.file_type().is_file() && entry.file_name() == MARKER_FILE {
            markers.push(entry.into_path());
        }
    }

    for marker in markers {
        if let Some(parent) = marker.parent() {
            info!("Generating {}", parent.display());
        }
        fs::remove_file(&marker)
            .map_err(|e| SdkError::template_io(&marker, "failed to delete marker file", e))?;
    }

    Ok(())
}

fn build_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| SdkError::template(root, e.to_string()))?;
        let is_build_file = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(BUILD_FILE_SUFFIX));
        if entry.file_type().is_file() && is_build_file {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn rewrite<F>(path: &Path, transform: F) -> Result<()>
where
    F: FnOnce(&str) -> String,
{
    let contents = fs::read_to_string(path)
        .map_err(|e| SdkError::template_io(path, "failed to read file", e))?;
    fs::write(path, transform(&contents))
        .map_err(|e| SdkError::template_io(path, "failed to write file", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::substitution::{ENGINE_PACKAGES, FIND_PACKAGE_TOKEN, ENGINE_LIB_TOKEN};
    use tempfile::TempDir;

    /// Small template mirroring the layout of the shipped one
    fn write_template(root: &Path) -> (PathBuf, PathBuf) {
        let cmake = root.join("CMakeTemplate");
        fs::create_dir_all(cmake.join("src/PROJECT_NAME/include")).unwrap();
        fs::create_dir_all(cmake.join("Resources")).unwrap();
        fs::write(
            cmake.join("CMakeLists.txt"),
            "project(###PROJECT_NAME### VERSION ###PROJECT_VERSION###)\n###NOVELRT_FIND_PACKAGE###\n###NOVELRT_ENGINE_SUBDIR###\nadd_subdirectory(src)\n",
        )
        .unwrap();
        fs::write(cmake.join("src/CMakeLists.txt"), "add_subdirectory(###PROJECT_NAME###)\n").unwrap();
        fs::write(
            cmake.join("src/PROJECT_NAME/CMakeLists.txt"),
            "add_executable(###PROJECT_NAME### main.cpp)\ntarget_link_libraries(###PROJECT_NAME### ###NOVELRT_ENGINE_LIB###)\n###NOVELRT_ENGINE_SOURCE_CBP###\n###NOVELRT_ENGINE_SRC_DEPENDENCIES###\n",
        )
        .unwrap();
        fs::write(cmake.join("src/PROJECT_NAME/main.cpp"), "int main() {}\n").unwrap();
        fs::write(cmake.join("src/PROJECT_NAME/include/DeleteMe.txt"), "").unwrap();
        fs::write(cmake.join("Resources/DeleteMe.txt"), "").unwrap();

        let conanfile = root.join("conanfile.py");
        fs::write(
            &conanfile,
            "name = \"###PROJECT_NAME###\"\ndescription = \"###PROJECT_DESCRIPTION###\"\nversion = \"###PROJECT_VERSION###\"\n",
        )
        .unwrap();
        (cmake, conanfile)
    }

    fn engine(tmp: &TempDir, platform: Platform) -> ProjectTemplateEngine {
        let (cmake, conanfile) = write_template(&tmp.path().join("templates"));
        ProjectTemplateEngine::new(cmake, conanfile, platform)
    }

    fn all_paths(root: &Path) -> Vec<PathBuf> {
        WalkDir::new(root)
            .into_iter()
            .map(|e| e.unwrap().into_path())
            .collect()
    }

    #[test]
    fn test_generate_prebuilt() {
        let tmp = TempDir::new().unwrap();
        let generator = engine(&tmp, Platform::Linux);
        let out = tmp.path().join("demo");
        let engine_dir = tmp.path().join("engine-v0.1.0");

        let name = generator
            .generate(&out, &engine_dir, GenerationMode::Prebuilt)
            .unwrap();
        assert_eq!(name, "demo");

        let root = fs::read_to_string(out.join("CMakeLists.txt")).unwrap();
        assert!(root.contains("project(demo VERSION 0.0.1)"));
        assert_eq!(
            root.matches("find_package(").count(),
            ENGINE_PACKAGES.len()
        );

        let app = fs::read_to_string(out.join("src/demo/CMakeLists.txt")).unwrap();
        assert!(app.contains("target_link_libraries(demo NovelRT::Engine)"));

        let conanfile = fs::read_to_string(out.join("conanfile.py")).unwrap();
        assert!(conanfile.contains("name = \"demo\""));
        assert!(conanfile.contains("description = \"demo app\""));

        let definition = ProjectDefinition::load(&out.join("project.json")).unwrap();
        assert_eq!(definition.name, "demo");
        assert_eq!(definition.version, "0.0.1");
        assert!(definition.dependency_profile.is_empty());
    }

    #[test]
    fn test_no_placeholders_remain() {
        let tmp = TempDir::new().unwrap();
        let generator = engine(&tmp, Platform::Linux);
        let out = tmp.path().join("demo");

        generator
            .generate(&out, Path::new("/src/NovelRT"), GenerationMode::FromSource)
            .unwrap();

        for path in all_paths(&out) {
            let name = path.file_name().unwrap();
            assert_ne!(name, PLACEHOLDER_DIR, "{}", path.display());
            assert_ne!(name, MARKER_FILE, "{}", path.display());
            if path.is_file() {
                let contents = fs::read_to_string(&path).unwrap();
                assert!(!contents.contains(FIND_PACKAGE_TOKEN));
                assert!(!contents.contains(ENGINE_LIB_TOKEN));
            }
        }
        assert!(out.join("src/demo/include").is_dir());
        assert!(out.join("Resources").is_dir());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        let generator = engine(&tmp, Platform::Linux);
        let first = tmp.path().join("one/demo");
        let second = tmp.path().join("two/demo");
        let engine_dir = Path::new("/opt/engine");

        generator.generate(&first, engine_dir, GenerationMode::Prebuilt).unwrap();
        generator.generate(&second, engine_dir, GenerationMode::Prebuilt).unwrap();

        for file in ["CMakeLists.txt", "src/CMakeLists.txt", "src/demo/CMakeLists.txt", "conanfile.py"] {
            assert_eq!(
                fs::read(first.join(file)).unwrap(),
                fs::read(second.join(file)).unwrap(),
                "{}",
                file
            );
        }
    }

    #[test]
    fn test_existing_files_abort_generation() {
        let tmp = TempDir::new().unwrap();
        let generator = engine(&tmp, Platform::Linux);
        let out = tmp.path().join("demo");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("CMakeLists.txt"), "mine").unwrap();

        let err = generator
            .generate(&out, Path::new("/opt/engine"), GenerationMode::Prebuilt)
            .unwrap_err();
        assert!(matches!(err, SdkError::TemplateGeneration { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_missing_template_root() {
        let tmp = TempDir::new().unwrap();
        let generator = ProjectTemplateEngine::new(
            tmp.path().join("nope"),
            tmp.path().join("conanfile.py"),
            Platform::Linux,
        );
        let err = generator
            .generate(&tmp.path().join("demo"), Path::new("/opt/engine"), GenerationMode::Prebuilt)
            .unwrap_err();
        assert!(matches!(err, SdkError::TemplateGeneration { .. }));
    }

    #[test]
    fn test_prebuilt_stages_engine_binaries() {
        let tmp = TempDir::new().unwrap();
        let engine_dir = tmp.path().join("engine");
        fs::create_dir_all(engine_dir.join("bin/Resources/Fonts")).unwrap();
        fs::write(engine_dir.join("bin/Resources/Fonts/Gayathri.ttf"), "font").unwrap();
        fs::write(engine_dir.join("bin/glfw3.dll"), "dll").unwrap();

        let windows = engine(&tmp, Platform::Windows);
        let out = tmp.path().join("win/demo");
        windows.generate(&out, &engine_dir, GenerationMode::Prebuilt).unwrap();
        assert!(out.join("Resources/Fonts/Gayathri.ttf").is_file());
        assert!(out.join("bin/glfw3.dll").is_file());

        let linux = ProjectTemplateEngine::new(
            tmp.path().join("templates/CMakeTemplate"),
            tmp.path().join("templates/conanfile.py"),
            Platform::Linux,
        );
        let out = tmp.path().join("linux/demo");
        linux.generate(&out, &engine_dir, GenerationMode::Prebuilt).unwrap();
        assert!(out.join("Resources/Fonts/Gayathri.ttf").is_file());
        assert!(!out.join("bin").exists());
    }

    #[test]
    fn test_from_source_skips_staging() {
        let tmp = TempDir::new().unwrap();
        let engine_dir = tmp.path().join("engine");
        fs::create_dir_all(engine_dir.join("bin/Resources")).unwrap();
        fs::write(engine_dir.join("bin/Resources/a.txt"), "a").unwrap();

        let generator = engine(&tmp, Platform::Windows);
        let out = tmp.path().join("demo");
        generator.generate(&out, &engine_dir, GenerationMode::FromSource).unwrap();
        assert!(!out.join("Resources/a.txt").exists());
    }

    #[test]
    fn test_shipped_template_end_to_end() {
        let templates = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates");
        let generator = ProjectTemplateEngine::new(
            templates.join("CMakeTemplate"),
            templates.join("conanfile.py"),
            Platform::Linux,
        );

        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("demo");
        let name = generator
            .generate(&out, Path::new("/opt/engine-v0.1.0"), GenerationMode::Prebuilt)
            .unwrap();

        assert_eq!(name, "demo");
        assert!(out.join("conanfile.py").is_file());
        let root = fs::read_to_string(out.join("CMakeLists.txt")).unwrap();
        assert!(root.contains("demo"));
        assert!(!root.contains("###"));
        for path in all_paths(&out) {
            assert_ne!(path.file_name().unwrap(), PLACEHOLDER_DIR);
            assert_ne!(path.file_name().unwrap(), MARKER_FILE);
        }
    }

    #[test]
    fn test_marker_at_project_root_is_kept() {
        let tmp = TempDir::new().unwrap();
        let generator = engine(&tmp, Platform::Linux);
        fs::write(tmp.path().join("templates/CMakeTemplate").join(MARKER_FILE), "top").unwrap();
        let out = tmp.path().join("demo");

        generator
            .generate(&out, Path::new("/opt/engine"), GenerationMode::Prebuilt)
            .unwrap();

        assert!(out.join(MARKER_FILE).is_file());
        assert!(!out.join("Resources").join(MARKER_FILE).exists());
        assert!(!out.join("src/demo/include").join(MARKER_FILE).exists());
    }

    #[test]
    fn test_hyphenated_project_keeps_valid_manifest_class() {
        let templates = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates");
        let generator = ProjectTemplateEngine::new(
            templates.join("CMakeTemplate"),
            templates.join("conanfile.py"),
            Platform::Linux,
        );

        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("my-game");
        generator
            .generate(&out, Path::new("/opt/engine-v0.1.0"), GenerationMode::Prebuilt)
            .unwrap();

        let manifest = fs::read_to_string(out.join("conanfile.py")).unwrap();
        assert!(manifest.contains("name = \"my-game\""));
        let class_line = manifest
            .lines()
            .find(|line| line.starts_with("class "))
            .unwrap();
        let class_name = class_line["class ".len()..].split('(').next().unwrap();
        assert!(!class_name.is_empty());
        assert!(class_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert!(!class_name.starts_with(|c: char| c.is_ascii_digit()));
    }
}
