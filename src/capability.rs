//! Driver capability probe for the programmable pipeline.
//!
//! The probe runs once per [`Renderer`](crate::Renderer), before any shader
//! is compiled. A failed probe is final: the renderer stays on the
//! fixed-function path for its whole lifetime.

use crate::backend::GlApi;
use crate::error::CapabilityError;

/// Extensions that must all be advertised for shaders to be used.
pub const REQUIRED_EXTENSIONS: [&str; 4] = [
    "GL_ARB_shading_language_100",
    "GL_ARB_shader_objects",
    "GL_ARB_vertex_shader",
    "GL_ARB_fragment_shader",
];

/// Entry points that must all resolve for shaders to be used.
pub const SHADER_ENTRY_POINTS: [&str; 13] = [
    "glCreateProgramObjectARB",
    "glDeleteObjectARB",
    "glUseProgramObjectARB",
    "glCreateShaderObjectARB",
    "glShaderSourceARB",
    "glCompileShaderARB",
    "glGetObjectParameterivARB",
    "glAttachObjectARB",
    "glGetInfoLogARB",
    "glLinkProgramARB",
    "glGetUniformLocationARB",
    "glUniform4fARB",
    "glUniform1iARB",
];

/// Shader support state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capability {
    /// Not probed yet.
    #[default]
    Uninitialized,
    /// Extensions and entry points present.
    Ready,
    /// Probed and unsupported; never probed again.
    Unavailable,
}

impl Capability {
    pub fn is_ready(self) -> bool {
        self == Capability::Ready
    }

    pub fn is_probed(self) -> bool {
        self != Capability::Uninitialized
    }
}

/// Check the extension string, then resolve every shader entry point.
///
/// All entry points are resolved even after one fails so the backend ends
/// up with everything the driver offers; the first missing one is reported.
pub fn probe<G: GlApi + ?Sized>(gl: &mut G) -> Result<(), CapabilityError> {
    let extensions = gl.extensions();
    if let Some(missing) = REQUIRED_EXTENSIONS
        .iter()
        .find(|ext| !has_extension(&extensions, ext))
    {
        return Err(CapabilityError::MissingExtension(missing.to_string()));
    }

    let mut first_missing = None;
    for name in SHADER_ENTRY_POINTS {
        if !gl.resolve_entry_point(name) && first_missing.is_none() {
            first_missing = Some(name);
        }
    }
    match first_missing {
        Some(name) => Err(CapabilityError::MissingEntryPoint(name.to_string())),
        None => Ok(()),
    }
}

/// Whole-token match against a space separated extension list.
pub fn has_extension(extensions: &str, name: &str) -> bool {
    extensions.split_whitespace().any(|ext| ext == name)
}
