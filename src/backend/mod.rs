//! Graphics API abstraction layer.
//!
//! The renderer never calls OpenGL directly. Every native call goes through
//! the [`GlApi`] trait so the selection logic can run against different
//! implementations.
//!
//! # Available Backends
//!
//! - [`DummyGl`]: records calls and simulates compile/link results, used for
//!   testing and headless hosts
//! - [`NativeGl`] (`native` feature): OpenGL entry points resolved through a
//!   loader function supplied by the windowing layer

pub mod dummy;
#[cfg(feature = "native")]
pub mod native;
pub mod types;

pub use dummy::{DummyGl, GlCall};
#[cfg(feature = "native")]
pub use native::NativeGl;
pub use types::*;

use crate::shader::ShaderStage;

/// Upper bound on queued errors drained per check, in case a lost context
/// keeps reporting the same error.
const MAX_DRAINED_ERRORS: usize = 32;

/// The native graphics calls made by the renderer.
///
/// All calls must happen on the thread that owns the current GL context.
pub trait GlApi {
    /// Space separated list of supported extensions (`GL_EXTENSIONS`).
    fn extensions(&self) -> String;

    /// Resolve a driver entry point by name. Returns `false` if the driver
    /// does not export it.
    fn resolve_entry_point(&mut self, name: &str) -> bool;

    /// Pop the oldest recorded error, `GL_NO_ERROR` when none is pending.
    fn get_error(&mut self) -> GLenum;

    /// Number of fixed-function texture units.
    fn max_texture_units(&self) -> u32;

    // Shader objects

    fn create_shader(&mut self, stage: ShaderStage) -> ShaderHandle;
    fn shader_source(&mut self, shader: ShaderHandle, source: &str);
    fn compile_shader(&mut self, shader: ShaderHandle);
    fn compile_status(&self, shader: ShaderHandle) -> bool;
    fn shader_info_log(&self, shader: ShaderHandle) -> String;
    fn delete_shader(&mut self, shader: ShaderHandle);

    // Program objects

    fn create_program(&mut self) -> ProgramHandle;
    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);
    fn link_program(&mut self, program: ProgramHandle);
    fn link_status(&self, program: ProgramHandle) -> bool;
    fn program_info_log(&self, program: ProgramHandle) -> String;
    fn delete_program(&mut self, program: ProgramHandle);

    /// Make `program` current, or return to the fixed pipeline with `None`.
    fn use_program(&mut self, program: Option<ProgramHandle>);

    /// Location of an active uniform, `None` if the program does not use it.
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<GLint>;
    fn uniform_1i(&mut self, location: GLint, value: GLint);

    // Fixed-function state

    fn enable(&mut self, cap: GlCap);
    fn disable(&mut self, cap: GlCap);
    fn is_enabled(&self, cap: GlCap) -> bool;

    fn enable_client_state(&mut self, array: ClientArray);
    fn disable_client_state(&mut self, array: ClientArray);
    fn is_client_state_enabled(&self, array: ClientArray) -> bool;

    /// Select the server-side texture unit (`GL_TEXTURE0 + unit`).
    fn active_texture(&mut self, unit: u32);
    /// Select the client-side texture unit (`GL_TEXTURE0 + unit`).
    fn client_active_texture(&mut self, unit: u32);

    /// Point the active unit's texture coordinate array at `data`.
    ///
    /// The driver keeps the pointer, so `data` must stay alive until the
    /// draw call using it has been issued.
    fn tex_coord_pointer(&mut self, components: GLint, data: &[GLfloat]);

    /// Load the identity into the active unit's texture matrix.
    fn reset_texture_matrix(&mut self);

    fn tex_env_i(&mut self, pname: GLenum, param: GLenum);
    fn tex_env_f(&mut self, pname: GLenum, param: GLfloat);
}

/// Drain and log pending GL errors. Returns the number of errors found.
pub fn log_errors<G: GlApi + ?Sized>(gl: &mut G, tag: &str) -> usize {
    let mut count = 0;
    while count < MAX_DRAINED_ERRORS {
        let err = gl.get_error();
        if err == GL_NO_ERROR {
            break;
        }
        log::warn!("GL ERROR ({tag}): 0x{err:04X}");
        count += 1;
    }
    count
}
