//! External tool supervision
//!
//! This module provides:
//! - A streaming process runner for cmake and conan
//! - Pure classification of their output lines
//! - Tool detection with minimum version checks

pub mod check;
pub mod output;
pub mod process;

pub use check::{check_tool, cmake_requirement, conan_requirement, ToolInfo, ToolRequirement};
pub use output::{emit, OutputEvent, ProfileSet};
pub use process::{Stream, ToolCommand};
