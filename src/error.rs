//! Error types for shader loading and capability probing.
//!
//! None of these cross the draw-time selection API: the renderer logs them
//! where they occur and keeps a status flag on the affected object.

use std::path::PathBuf;

use thiserror::Error;

/// The driver cannot run the programmable pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("OpenGL extension {0} not supported")]
    MissingExtension(String),
    #[error("OpenGL entry point {0} was not found")]
    MissingEntryPoint(String),
}

/// Malformed directive in a program file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("mismatching checkgroup end tag")]
    MismatchedCheckgroupEnd,
    #[error("expected begin or end after checkgroup")]
    ExpectedBeginOrEnd,
    #[error("malformed texcoord tag '{0}'")]
    MalformedTexcoords(String),
    #[error("texcoord tag refers to unknown texture id '{0}'")]
    UnknownTextureId(String),
    #[error("texture unit {0} is assigned twice")]
    DuplicateTextureUnit(u32),
    #[error("{0} checkgroup(s) not closed at end of file")]
    UnclosedCheckgroup(usize),
}

/// Failure to load or compile a single shader stage.
#[derive(Error, Debug)]
pub enum ShaderError {
    #[error("couldn't open {} for read access: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error compiling shader {name}:\n{log}")]
    Compile { name: String, log: String },
}

/// Failure to load or link a program.
#[derive(Error, Debug)]
pub enum ProgramError {
    #[error("couldn't open {} for read access: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("shader {0} not found")]
    ShaderNotFound(String),
    #[error("depends on shader {0} which was not compiled successfully")]
    ShaderNotCompiled(String),
    #[error("line {line}: {source}")]
    Format {
        line: usize,
        #[source]
        source: FormatError,
    },
    #[error("error linking program {name}:\n{log}")]
    Link { name: String, log: String },
}

impl ProgramError {
    /// Whether this error comes from a missing or broken shader dependency.
    pub fn is_dependency(&self) -> bool {
        matches!(
            self,
            ProgramError::ShaderNotFound(_) | ProgramError::ShaderNotCompiled(_)
        )
    }
}
