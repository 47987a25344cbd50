//! Placeholder tokens and their mode-dependent replacements

use crate::context::GenerationMode;
use std::path::Path;

pub const PROJECT_NAME_TOKEN: &str = "###PROJECT_NAME###";
pub const PROJECT_DESCRIPTION_TOKEN: &str = "###PROJECT_DESCRIPTION###";
pub const PROJECT_VERSION_TOKEN: &str = "###PROJECT_VERSION###";
pub const ENGINE_LIB_TOKEN: &str = "###NOVELRT_ENGINE_LIB###";
pub const ENGINE_SOURCE_CBP_TOKEN: &str = "###NOVELRT_ENGINE_SOURCE_CBP###";
pub const ENGINE_SRC_DEPENDENCIES_TOKEN: &str = "###NOVELRT_ENGINE_SRC_DEPENDENCIES###";
pub const ENGINE_SUBDIR_TOKEN: &str = "###NOVELRT_ENGINE_SUBDIR###";
pub const FIND_PACKAGE_TOKEN: &str = "###NOVELRT_FIND_PACKAGE###";

/// Version every newly generated project starts at
pub const INITIAL_PROJECT_VERSION: &str = "0.0.1";

/// Third-party packages the prebuilt engine links against, as CMake package names
pub const ENGINE_PACKAGES: &[&str] = &[
    "Freetype",
    "glfw3",
    "glm",
    "GTest",
    "SndFile",
    "Microsoft.GSL",
    "OpenAL",
    "TBB",
    "spdlog",
    "Vulkan",
    "PNG",
    "ZLIB",
];

/// Name, description and version written into every templated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectValues {
    pub name: String,
    pub description: String,
    pub version: String,
}

impl ProjectValues {
    pub fn for_project(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: format!("{} app", name),
            version: INITIAL_PROJECT_VERSION.to_string(),
        }
    }
}

/// Replace the name/description/version tokens
pub fn apply_project_values(contents: &str, values: &ProjectValues) -> String {
    contents
        .replace(PROJECT_NAME_TOKEN, &values.name)
        .replace(PROJECT_DESCRIPTION_TOKEN, &values.description)
        .replace(PROJECT_VERSION_TOKEN, &values.version)
}

/// Replace every token in a CMake build description
pub fn apply_build_tokens(
    contents: &str,
    values: &ProjectValues,
    mode: GenerationMode,
    engine_location: &Path,
) -> String {
    let contents = apply_project_values(contents, values);
    let engine = cmake_path(engine_location);

    match mode {
        GenerationMode::FromSource => contents
            .replace(ENGINE_LIB_TOKEN, "Engine")
            .replace(ENGINE_SOURCE_CBP_TOKEN, &copy_build_products(&values.name))
            .replace(
                ENGINE_SRC_DEPENDENCIES_TOKEN,
                &format!("add_dependencies({} Resources)", values.name),
            )
            .replace(ENGINE_SUBDIR_TOKEN, &source_subdirectory(&engine))
            .replace(FIND_PACKAGE_TOKEN, ""),
        GenerationMode::Prebuilt => contents
            .replace(ENGINE_LIB_TOKEN, "NovelRT::Engine")
            .replace(ENGINE_SOURCE_CBP_TOKEN, &imported_config_mapping("NovelRT::Engine"))
            .replace(ENGINE_SRC_DEPENDENCIES_TOKEN, "")
            .replace(
                ENGINE_SUBDIR_TOKEN,
                &format!("include(\"{}/lib/NovelRT.cmake\")", engine),
            )
            .replace(FIND_PACKAGE_TOKEN, &find_package_directives()),
    }
}

/// One `find_package(... REQUIRED)` line per engine dependency
pub fn find_package_directives() -> String {
    ENGINE_PACKAGES
        .iter()
        .map(|package| format!("find_package({} REQUIRED)", package))
        .collect::<Vec<_>>()
        .join("\n")
}

/// CMake wants forward slashes on every platform
fn cmake_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn copy_build_products(target: &str) -> String {
    format!(
        "copy_build_products({target}\n\
         \tDEPENDENCY Resources\n\
         \tTARGET_LOCATION $<TARGET_FILE_DIR:{target}>/Resources\n\n\
         \tDEPENDENCY Engine\n\
         \tTARGET_LOCATION $<TARGET_FILE_DIR:{target}>)"
    )
}

fn imported_config_mapping(target: &str) -> String {
    format!(
        "set_target_properties({target} PROPERTIES\n\
         \tMAP_IMPORTED_CONFIG_RELEASE MinSizeRel\n\
         \tMAP_IMPORTED_CONFIG_DEBUG RelWithDebInfo\n\
         )"
    )
}

fn source_subdirectory(engine: &str) -> String {
    format!(
        "include(${{CMAKE_BINARY_DIR}}/conan_paths.cmake)\n\
         include_directories(\"{engine}/include\")\n\
         add_subdirectory(\"{engine}\" \"${{CMAKE_BINARY_DIR}}/engine\")\n\
         set_target_properties(Engine PROPERTIES\n\
         \tMAP_IMPORTED_CONFIG_DEBUG RelWithDebInfo)"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "project(###PROJECT_NAME### VERSION ###PROJECT_VERSION### DESCRIPTION \"###PROJECT_DESCRIPTION###\")\n\
        ###NOVELRT_FIND_PACKAGE###\n\
        ###NOVELRT_ENGINE_SUBDIR###\n\
        target_link_libraries(###PROJECT_NAME### ###NOVELRT_ENGINE_LIB###)\n\
        ###NOVELRT_ENGINE_SOURCE_CBP###\n\
        ###NOVELRT_ENGINE_SRC_DEPENDENCIES###\n";

    fn values() -> ProjectValues {
        ProjectValues::for_project("demo")
    }

    #[test]
    fn test_project_values() {
        let v = values();
        assert_eq!(v.description, "demo app");
        assert_eq!(v.version, "0.0.1");
        let out = apply_project_values(TEMPLATE, &v);
        assert!(out.starts_with("project(demo VERSION 0.0.1 DESCRIPTION \"demo app\")"));
    }

    #[test]
    fn test_from_source_resolves_every_token() {
        let out = apply_build_tokens(
            TEMPLATE,
            &values(),
            GenerationMode::FromSource,
            Path::new("/src/NovelRT"),
        );
        assert!(!out.contains("###"));
        assert!(!out.contains("find_package"));
        assert!(out.contains("target_link_libraries(demo Engine)"));
        assert!(out.contains("add_subdirectory(\"/src/NovelRT\""));
        assert!(out.contains("include_directories(\"/src/NovelRT/include\")"));
        assert!(out.contains("copy_build_products(demo"));
        assert!(out.contains("add_dependencies(demo Resources)"));
    }

    #[test]
    fn test_prebuilt_finds_every_package() {
        let out = apply_build_tokens(
            TEMPLATE,
            &values(),
            GenerationMode::Prebuilt,
            Path::new("/opt/engine-v0.1.0"),
        );
        assert!(!out.contains("###"));
        for package in ENGINE_PACKAGES {
            assert!(out.contains(&format!("find_package({} REQUIRED)", package)));
        }
        assert!(out.contains("include(\"/opt/engine-v0.1.0/lib/NovelRT.cmake\")"));
        assert!(out.contains("NovelRT::Engine"));
        assert!(out.contains("MAP_IMPORTED_CONFIG_RELEASE MinSizeRel"));
        assert!(out.contains("MAP_IMPORTED_CONFIG_DEBUG RelWithDebInfo"));
        assert!(!out.contains("add_subdirectory"));
    }

    #[test]
    fn test_windows_paths_use_forward_slashes() {
        let out = apply_build_tokens(
            "###NOVELRT_ENGINE_SUBDIR###",
            &values(),
            GenerationMode::Prebuilt,
            Path::new("C:\\NovelRT\\v0.1.0"),
        );
        assert_eq!(out, "include(\"C:/NovelRT/v0.1.0/lib/NovelRT.cmake\")");
    }
}
