//! Project template materialization
//!
//! This module provides:
//! - Recursive copying with create/overwrite semantics
//! - Placeholder tokens and their mode-dependent replacements
//! - The generator that turns the CMake template into a named project

pub mod copier;
pub mod generator;
pub mod substitution;

pub use copier::{copy_dir, CopyMode};
pub use generator::{project_name_for, ProjectTemplateEngine};
pub use substitution::{ProjectValues, INITIAL_PROJECT_VERSION};
