//! Renderer configuration.

use std::path::{Path, PathBuf};

/// Name of the shader directory next to the application binary.
pub const SHADER_DIR_NAME: &str = "shaders";

/// File extension of vertex shader sources.
pub const VERTEX_EXTENSION: &str = "vert";
/// File extension of fragment shader sources.
pub const FRAGMENT_EXTENSION: &str = "frag";
/// File extension of program definitions.
pub const PROGRAM_EXTENSION: &str = "prog";

/// Configuration for a [`Renderer`](crate::Renderer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Directory scanned by [`Renderer::update_shaders`](crate::Renderer::update_shaders).
    pub shader_dir: PathBuf,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            shader_dir: default_shader_dir(),
        }
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load shaders from `dir` instead of the install location.
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = dir.into();
        self
    }

    pub fn shader_dir(&self) -> &Path {
        &self.shader_dir
    }
}

/// `<directory of the running executable>/shaders`, or `./shaders` if the
/// executable path is unknown.
pub fn default_shader_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SHADER_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dir_ends_with_shaders() {
        let config = RendererConfig::default();
        assert!(config.shader_dir().ends_with(SHADER_DIR_NAME));
    }

    #[test]
    fn test_with_shader_dir() {
        let config = RendererConfig::new().with_shader_dir("/tmp/nif");
        assert_eq!(config.shader_dir(), Path::new("/tmp/nif"));
    }
}
