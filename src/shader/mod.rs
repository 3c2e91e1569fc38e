//! Shader and program objects.
//!
//! A [`Shader`] wraps one compiled stage read from a `.vert` or `.frag`
//! file. A [`Program`] links shaders together and carries the conditions
//! and texture coordinate bindings declared in its `.prog` file (see
//! [`format`] for the directives).
//!
//! Both keep a `status` flag. Loading never aborts the registry scan; a
//! failed object stays registered with `status == false` and is skipped
//! at draw time.

pub mod format;
mod program;

use std::fs;
use std::path::Path;

pub use format::TexCoordSource;
pub use program::Program;

use crate::backend::{GlApi, ShaderHandle, GLenum, GL_FRAGMENT_SHADER_ARB, GL_VERTEX_SHADER_ARB};
use crate::config::{FRAGMENT_EXTENSION, VERTEX_EXTENSION};
use crate::error::ShaderError;

/// Pipeline stage of a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn to_gl(self) -> GLenum {
        match self {
            ShaderStage::Vertex => GL_VERTEX_SHADER_ARB,
            ShaderStage::Fragment => GL_FRAGMENT_SHADER_ARB,
        }
    }

    /// Stage for a shader file extension (`vert` or `frag`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            VERTEX_EXTENSION => Some(ShaderStage::Vertex),
            FRAGMENT_EXTENSION => Some(ShaderStage::Fragment),
            _ => None,
        }
    }
}

/// A single compiled shader stage.
#[derive(Debug)]
pub struct Shader {
    name: String,
    handle: ShaderHandle,
    stage: ShaderStage,
    status: bool,
}

impl Shader {
    /// Create the native shader object. Nothing is compiled yet.
    pub fn new<G: GlApi + ?Sized>(gl: &mut G, name: impl Into<String>, stage: ShaderStage) -> Self {
        Self {
            name: name.into(),
            handle: gl.create_shader(stage),
            stage,
            status: false,
        }
    }

    /// Read `path` and compile it.
    pub fn load<G: GlApi + ?Sized>(&mut self, gl: &mut G, path: &Path) -> Result<(), ShaderError> {
        let source = match fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(source) => {
                self.status = false;
                let err = ShaderError::Io {
                    path: path.to_path_buf(),
                    source,
                };
                log::warn!("error loading shader {}: {err}", self.name);
                return Err(err);
            }
        };
        self.compile_source(gl, &source)
    }

    /// Submit `source` to the driver and compile it.
    ///
    /// The driver log is captured on failure. Compiling twice reuses the
    /// same native object.
    pub fn compile_source<G: GlApi + ?Sized>(
        &mut self,
        gl: &mut G,
        source: &str,
    ) -> Result<(), ShaderError> {
        gl.shader_source(self.handle, source);
        gl.compile_shader(self.handle);
        self.status = gl.compile_status(self.handle);

        if self.status {
            log::debug!("compiled shader {}", self.name);
            Ok(())
        } else {
            let err = ShaderError::Compile {
                name: self.name.clone(),
                log: gl.shader_info_log(self.handle),
            };
            log::warn!("{err}");
            Err(err)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> ShaderHandle {
        self.handle
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Whether the last compile succeeded.
    pub fn status(&self) -> bool {
        self.status
    }

    /// Release the native object.
    pub(crate) fn destroy<G: GlApi + ?Sized>(self, gl: &mut G) {
        gl.delete_shader(self.handle);
    }
}
