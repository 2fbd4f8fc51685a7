//! # Tool Path Resolver
//!
//! This module finds the external encoder binaries (`ffmpeg`, `ffprobe`):
//! - Directory named by `MOV2GIF_TOOLS_DIR`
//! - `tools/` under the installation root
//! - System `PATH`

use crate::config::install_root;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable pointing at a directory of bundled tools
pub const TOOLS_DIR_ENV: &str = "MOV2GIF_TOOLS_DIR";

/// Tool path resolver for bundled and system-installed binaries
#[derive(Debug, Clone)]
pub struct ToolPathResolver {
    /// Directories searched before `PATH`
    tools_dirs: Vec<PathBuf>,
}

pub type ToolResolver = ToolPathResolver;

impl ToolPathResolver {
    /// Create a new path resolver
    pub fn new() -> Self {
        let mut tools_dirs = Vec::new();

        if let Some(dir) = env::var_os(TOOLS_DIR_ENV).filter(|v| !v.is_empty()) {
            tools_dirs.push(PathBuf::from(dir));
        }
        tools_dirs.push(install_root().join("tools"));

        Self::with_dirs(tools_dirs)
    }

    /// Resolver searching the given directories, then `PATH`
    pub fn with_dirs(tools_dirs: Vec<PathBuf>) -> Self {
        Self { tools_dirs }
    }

    /// Platform executable name (`ffmpeg.exe` on Windows)
    pub fn executable_name(tool_name: &str) -> String {
        let extension = if cfg!(windows) { ".exe" } else { "" };
        format!("{}{}", tool_name, extension)
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let executable = Self::executable_name(tool_name);

        for dir in &self.tools_dirs {
            let bundled_path = dir.join(&executable);
            if bundled_path.is_file() {
                debug!("Using bundled tool: {} -> {:?}", tool_name, bundled_path);
                return Some(bundled_path);
            }
        }

        let system_path = Self::find_in_system_path(&executable);
        match &system_path {
            Some(path) => debug!("Using system tool: {} -> {:?}", tool_name, path),
            None => debug!("Tool not found: {}", tool_name),
        }
        system_path
    }

    /// Find tool in system PATH
    fn find_in_system_path(executable: &str) -> Option<PathBuf> {
        env::split_paths(&env::var_os("PATH")?)
            .map(|dir| Path::new(&dir).join(executable))
            .find(|path| path.is_file())
    }

    /// Check if a specific tool is available
    pub fn is_tool_available(&self, tool_name: &str) -> bool {
        self.resolve_tool(tool_name).is_some()
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}
