//! OpenGL backend using driver entry points resolved at runtime.
//!
//! The windowing layer owns the context and passes a loader function
//! (`wglGetProcAddress`, `glXGetProcAddress`, `eglGetProcAddress`, ...).
//! Fixed-function and multitexture entry points are resolved up front;
//! `GL_ARB_shader_objects` entry points are resolved by the capability
//! probe through [`GlApi::resolve_entry_point`].

use std::ffi::{c_void, CStr, CString};

use crate::shader::ShaderStage;

use super::types::*;
use super::GlApi;

macro_rules! gl_functions {
    ($($field:ident => fn($($arg:ty),*) $(-> $ret:ty)?;)*) => {
        #[allow(non_snake_case, dead_code)]
        #[derive(Default)]
        struct Functions {
            $($field: Option<unsafe extern "system" fn($($arg),*) $(-> $ret)?>,)*
        }

        impl Functions {
            /// Store `ptr` as the entry point `name`. Returns `false` for a null
            /// pointer or a name this backend does not use.
            fn store(&mut self, name: &str, ptr: *const c_void) -> bool {
                if ptr.is_null() {
                    return false;
                }
                match name {
                    $(stringify!($field) => {
                        // SAFETY: the loader returned the address of `name`,
                        // whose signature is declared above.
                        self.$field = Some(unsafe {
                            std::mem::transmute::<*const c_void, unsafe extern "system" fn($($arg),*) $(-> $ret)?>(ptr)
                        });
                        true
                    })*
                    _ => false,
                }
            }
        }
    };
}

gl_functions! {
    // OpenGL 1.1
    glGetString => fn(GLenum) -> *const u8;
    glGetError => fn() -> GLenum;
    glGetIntegerv => fn(GLenum, *mut GLint);
    glEnable => fn(GLenum);
    glDisable => fn(GLenum);
    glIsEnabled => fn(GLenum) -> GLboolean;
    glEnableClientState => fn(GLenum);
    glDisableClientState => fn(GLenum);
    glTexCoordPointer => fn(GLint, GLenum, GLsizei, *const c_void);
    glMatrixMode => fn(GLenum);
    glLoadIdentity => fn();
    glTexEnvi => fn(GLenum, GLenum, GLint);
    glTexEnvf => fn(GLenum, GLenum, GLfloat);

    // OpenGL 1.3 / GL_ARB_multitexture
    glActiveTexture => fn(GLenum);
    glClientActiveTexture => fn(GLenum);

    // GL_ARB_shader_objects
    glCreateProgramObjectARB => fn() -> GLhandleARB;
    glDeleteObjectARB => fn(GLhandleARB);
    glUseProgramObjectARB => fn(GLhandleARB);
    glCreateShaderObjectARB => fn(GLenum) -> GLhandleARB;
    glShaderSourceARB => fn(GLhandleARB, GLsizei, *const *const GLchar, *const GLint);
    glCompileShaderARB => fn(GLhandleARB);
    glGetObjectParameterivARB => fn(GLhandleARB, GLenum, *mut GLint);
    glAttachObjectARB => fn(GLhandleARB, GLhandleARB);
    glGetInfoLogARB => fn(GLhandleARB, GLsizei, *mut GLsizei, *mut GLchar);
    glLinkProgramARB => fn(GLhandleARB);
    glGetUniformLocationARB => fn(GLhandleARB, *const GLchar) -> GLint;
    glUniform4fARB => fn(GLint, GLfloat, GLfloat, GLfloat, GLfloat);
    glUniform1iARB => fn(GLint, GLint);
}

/// Entry points resolved when the backend is created.
const FIXED_ENTRY_POINTS: [&str; 13] = [
    "glGetString",
    "glGetError",
    "glGetIntegerv",
    "glEnable",
    "glDisable",
    "glIsEnabled",
    "glEnableClientState",
    "glDisableClientState",
    "glTexCoordPointer",
    "glMatrixMode",
    "glLoadIdentity",
    "glTexEnvi",
    "glTexEnvf",
];

/// Call a resolved entry point, or evaluate to the fallback when missing.
macro_rules! call {
    ($self:ident . $name:ident ( $($arg:expr),* ) else $fallback:expr) => {
        match $self.fns.$name {
            // SAFETY: the pointer was resolved for the current context and
            // `load_with` requires that context to stay current.
            Some(f) => unsafe { f($($arg),*) },
            None => $fallback,
        }
    };
    ($self:ident . $name:ident ( $($arg:expr),* )) => {
        call!($self.$name($($arg),*) else ())
    };
}

/// OpenGL backend resolving entry points through a loader function.
pub struct NativeGl {
    loader: Box<dyn FnMut(&str) -> *const c_void>,
    fns: Functions,
    max_texture_units: u32,
}

impl std::fmt::Debug for NativeGl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeGl")
            .field("max_texture_units", &self.max_texture_units)
            .finish_non_exhaustive()
    }
}

impl NativeGl {
    /// Create the backend for the current context.
    ///
    /// # Safety
    ///
    /// `loader` must return valid entry points (or null) for the context that
    /// is current on this thread, and that context must remain current on
    /// this thread for every call made through the backend.
    pub unsafe fn load_with<F>(loader: F) -> Self
    where
        F: FnMut(&str) -> *const c_void + 'static,
    {
        let mut gl = Self {
            loader: Box::new(loader),
            fns: Functions::default(),
            max_texture_units: 1,
        };

        for name in FIXED_ENTRY_POINTS {
            if !gl.load(name) {
                log::warn!("OpenGL entry point {name} was not found");
            }
        }

        let multitexture = (gl.load("glActiveTexture")
            || gl.load_as("glActiveTextureARB", "glActiveTexture"))
            && (gl.load("glClientActiveTexture")
                || gl.load_as("glClientActiveTextureARB", "glClientActiveTexture"));

        if multitexture {
            let mut units: GLint = 0;
            call!(gl.glGetIntegerv(GL_MAX_TEXTURE_UNITS, &mut units));
            gl.max_texture_units = units.max(1) as u32;
        }
        log::debug!("NativeGl: {} texture units", gl.max_texture_units);

        gl
    }

    fn load(&mut self, name: &str) -> bool {
        let ptr = (self.loader)(name);
        self.fns.store(name, ptr)
    }

    /// Resolve `symbol` and store it as the entry point `name`.
    fn load_as(&mut self, symbol: &str, name: &str) -> bool {
        let ptr = (self.loader)(symbol);
        self.fns.store(name, ptr)
    }

    fn object_param(&self, object: GLhandleARB, pname: GLenum) -> GLint {
        let mut value: GLint = 0;
        call!(self.glGetObjectParameterivARB(object, pname, &mut value));
        value
    }

    fn info_log(&self, object: GLhandleARB) -> String {
        let len = self.object_param(object, GL_OBJECT_INFO_LOG_LENGTH_ARB);
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u8; len as usize];
        let mut written: GLsizei = 0;
        call!(self.glGetInfoLogARB(object, len, &mut written, buf.as_mut_ptr() as *mut GLchar));
        buf.truncate(written.clamp(0, len) as usize);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl GlApi for NativeGl {
    fn extensions(&self) -> String {
        let ptr = call!(self.glGetString(GL_EXTENSIONS) else std::ptr::null());
        if ptr.is_null() {
            return String::new();
        }
        // SAFETY: glGetString returns a static NUL-terminated string.
        unsafe { CStr::from_ptr(ptr as *const GLchar) }
            .to_string_lossy()
            .into_owned()
    }

    fn resolve_entry_point(&mut self, name: &str) -> bool {
        self.load(name)
    }

    fn get_error(&mut self) -> GLenum {
        call!(self.glGetError() else GL_NO_ERROR)
    }

    fn max_texture_units(&self) -> u32 {
        self.max_texture_units
    }

    fn create_shader(&mut self, stage: ShaderStage) -> ShaderHandle {
        ShaderHandle(call!(self.glCreateShaderObjectARB(stage.to_gl()) else 0))
    }

    fn shader_source(&mut self, shader: ShaderHandle, source: &str) {
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        call!(self.glShaderSourceARB(shader.0, 1, &ptr, &len));
    }

    fn compile_shader(&mut self, shader: ShaderHandle) {
        call!(self.glCompileShaderARB(shader.0));
    }

    fn compile_status(&self, shader: ShaderHandle) -> bool {
        self.object_param(shader.0, GL_OBJECT_COMPILE_STATUS_ARB) == GL_TRUE
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        self.info_log(shader.0)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        if shader.0 != 0 {
            call!(self.glDeleteObjectARB(shader.0));
        }
    }

    fn create_program(&mut self) -> ProgramHandle {
        ProgramHandle(call!(self.glCreateProgramObjectARB() else 0))
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        call!(self.glAttachObjectARB(program.0, shader.0));
    }

    fn link_program(&mut self, program: ProgramHandle) {
        call!(self.glLinkProgramARB(program.0));
    }

    fn link_status(&self, program: ProgramHandle) -> bool {
        self.object_param(program.0, GL_OBJECT_LINK_STATUS_ARB) == GL_TRUE
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        self.info_log(program.0)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if program.0 != 0 {
            call!(self.glDeleteObjectARB(program.0));
        }
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        call!(self.glUseProgramObjectARB(program.map_or(0, |p| p.0)));
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<GLint> {
        let name = CString::new(name).ok()?;
        let location = call!(self.glGetUniformLocationARB(program.0, name.as_ptr()) else -1);
        (location >= 0).then_some(location)
    }

    fn uniform_1i(&mut self, location: GLint, value: GLint) {
        call!(self.glUniform1iARB(location, value));
    }

    fn enable(&mut self, cap: GlCap) {
        call!(self.glEnable(cap.to_gl()));
    }

    fn disable(&mut self, cap: GlCap) {
        call!(self.glDisable(cap.to_gl()));
    }

    fn is_enabled(&self, cap: GlCap) -> bool {
        call!(self.glIsEnabled(cap.to_gl()) else 0) != 0
    }

    fn enable_client_state(&mut self, array: ClientArray) {
        call!(self.glEnableClientState(array.to_gl()));
    }

    fn disable_client_state(&mut self, array: ClientArray) {
        call!(self.glDisableClientState(array.to_gl()));
    }

    fn is_client_state_enabled(&self, array: ClientArray) -> bool {
        call!(self.glIsEnabled(array.to_gl()) else 0) != 0
    }

    fn active_texture(&mut self, unit: u32) {
        call!(self.glActiveTexture(GL_TEXTURE0 + unit));
    }

    fn client_active_texture(&mut self, unit: u32) {
        call!(self.glClientActiveTexture(GL_TEXTURE0 + unit));
    }

    fn tex_coord_pointer(&mut self, components: GLint, data: &[GLfloat]) {
        call!(self.glTexCoordPointer(components, GL_FLOAT, 0, data.as_ptr() as *const c_void));
    }

    fn reset_texture_matrix(&mut self) {
        call!(self.glMatrixMode(GL_TEXTURE));
        call!(self.glLoadIdentity());
        call!(self.glMatrixMode(GL_MODELVIEW));
    }

    fn tex_env_i(&mut self, pname: GLenum, param: GLenum) {
        call!(self.glTexEnvi(GL_TEXTURE_ENV, pname, param as GLint));
    }

    fn tex_env_f(&mut self, pname: GLenum, param: GLfloat) {
        call!(self.glTexEnvf(GL_TEXTURE_ENV, pname, param));
    }
}
