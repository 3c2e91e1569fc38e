//! Dummy graphics backend for testing and headless use.
//!
//! This backend doesn't talk to a driver. It keeps just enough state to
//! answer the queries the renderer makes and records every state-changing
//! call as a [`GlCall`], so tests can assert on what the renderer did.
//!
//! Simulated driver behaviour:
//! - a shader fails to compile when its source contains `#error`
//! - a program fails to link when one of its shaders contains `#link_error`
//! - a uniform is active when an attached shader declares it on a line
//!   starting with `uniform`

use std::collections::{HashMap, HashSet, VecDeque};

use crate::capability::REQUIRED_EXTENSIONS;
use crate::shader::ShaderStage;

use super::types::*;
use super::GlApi;

/// Marker that makes a dummy shader fail to compile.
pub const COMPILE_ERROR_MARKER: &str = "#error";
/// Marker that makes a dummy program fail to link.
pub const LINK_ERROR_MARKER: &str = "#link_error";

/// A state-changing call recorded by [`DummyGl`].
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader(ShaderHandle, ShaderStage),
    CompileShader(ShaderHandle),
    DeleteShader(ShaderHandle),
    CreateProgram(ProgramHandle),
    AttachShader(ProgramHandle, ShaderHandle),
    LinkProgram(ProgramHandle),
    DeleteProgram(ProgramHandle),
    UseProgram(Option<ProgramHandle>),
    Uniform1i(GLint, GLint),
    Enable(GlCap),
    Disable(GlCap),
    EnableClientState(ClientArray),
    DisableClientState(ClientArray),
    ActiveTexture(u32),
    ClientActiveTexture(u32),
    TexCoordPointer { components: GLint, len: usize },
    ResetTextureMatrix,
    TexEnvi(GLenum, GLenum),
    TexEnvf(GLenum, GLfloat),
}

#[derive(Debug, Default)]
struct DummyShader {
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
struct DummyProgram {
    shaders: Vec<ShaderHandle>,
    linked: bool,
    uniforms: Vec<String>,
}

/// Dummy graphics backend.
#[derive(Debug)]
pub struct DummyGl {
    extensions: String,
    missing_entry_points: HashSet<String>,
    max_texture_units: u32,
    errors: VecDeque<GLenum>,
    next_handle: GLhandleARB,
    shaders: HashMap<ShaderHandle, DummyShader>,
    programs: HashMap<ProgramHandle, DummyProgram>,
    current_program: Option<ProgramHandle>,
    caps: HashSet<GlCap>,
    client_arrays: HashSet<ClientArray>,
    active_unit: u32,
    calls: Vec<GlCall>,
}

impl Default for DummyGl {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyGl {
    /// Create a backend advertising every extension the shader path needs.
    pub fn new() -> Self {
        let mut extensions = REQUIRED_EXTENSIONS.join(" ");
        extensions.push_str(" GL_ARB_multitexture GL_ARB_texture_env_combine");
        Self {
            extensions,
            missing_entry_points: HashSet::new(),
            max_texture_units: 8,
            errors: VecDeque::new(),
            next_handle: 1,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            current_program: None,
            caps: HashSet::new(),
            client_arrays: HashSet::new(),
            active_unit: 0,
            calls: Vec::new(),
        }
    }

    /// Replace the advertised extension string.
    pub fn with_extensions(mut self, extensions: impl Into<String>) -> Self {
        self.extensions = extensions.into();
        self
    }

    /// Pretend the driver does not export `name`.
    pub fn without_entry_point(mut self, name: impl Into<String>) -> Self {
        self.missing_entry_points.insert(name.into());
        self
    }

    pub fn with_max_texture_units(mut self, units: u32) -> Self {
        self.max_texture_units = units;
        self
    }

    /// Enable a client array, as the mesh drawing code would before setup.
    pub fn with_client_state(mut self, array: ClientArray) -> Self {
        self.client_arrays.insert(array);
        self
    }

    /// Queue an error for the next `get_error` calls.
    pub fn push_error(&mut self, err: GLenum) {
        self.errors.push_back(err);
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Forget recorded calls, keeping object and state tables.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    pub fn active_unit(&self) -> u32 {
        self.active_unit
    }

    /// Number of live shader objects.
    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    /// Number of live program objects.
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    fn next_handle(&mut self) -> GLhandleARB {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn record(&mut self, call: GlCall) {
        log::trace!("DummyGl: {call:?}");
        self.calls.push(call);
    }
}

/// Names declared by `uniform <type> <name>;` lines.
fn declared_uniforms(source: &str) -> impl Iterator<Item = &str> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("uniform "))
        .flat_map(|line| {
            line.split(|c: char| c.is_whitespace() || c == ';' || c == ',')
                .filter(|token| !token.is_empty())
                .skip(2)
        })
}

impl GlApi for DummyGl {
    fn extensions(&self) -> String {
        self.extensions.clone()
    }

    fn resolve_entry_point(&mut self, name: &str) -> bool {
        !self.missing_entry_points.contains(name)
    }

    fn get_error(&mut self) -> GLenum {
        self.errors.pop_front().unwrap_or(GL_NO_ERROR)
    }

    fn max_texture_units(&self) -> u32 {
        self.max_texture_units
    }

    fn create_shader(&mut self, stage: ShaderStage) -> ShaderHandle {
        let handle = ShaderHandle(self.next_handle());
        self.shaders.insert(handle, DummyShader::default());
        self.record(GlCall::CreateShader(handle, stage));
        handle
    }

    fn shader_source(&mut self, shader: ShaderHandle, source: &str) {
        if let Some(entry) = self.shaders.get_mut(&shader) {
            entry.source = source.to_string();
        }
    }

    fn compile_shader(&mut self, shader: ShaderHandle) {
        if let Some(entry) = self.shaders.get_mut(&shader) {
            entry.compiled = !entry.source.contains(COMPILE_ERROR_MARKER);
        }
        self.record(GlCall::CompileShader(shader));
    }

    fn compile_status(&self, shader: ShaderHandle) -> bool {
        self.shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        match self.shaders.get(&shader) {
            Some(s) if !s.compiled => format!("ERROR: 0:1: '{COMPILE_ERROR_MARKER}' : directive"),
            _ => String::new(),
        }
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&mut self) -> ProgramHandle {
        let handle = ProgramHandle(self.next_handle());
        self.programs.insert(handle, DummyProgram::default());
        self.record(GlCall::CreateProgram(handle));
        handle
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        if let Some(entry) = self.programs.get_mut(&program) {
            entry.shaders.push(shader);
        }
        self.record(GlCall::AttachShader(program, shader));
    }

    fn link_program(&mut self, program: ProgramHandle) {
        if let Some(entry) = self.programs.get_mut(&program) {
            let sources: Vec<&str> = entry
                .shaders
                .iter()
                .filter_map(|s| self.shaders.get(s))
                .map(|s| s.source.as_str())
                .collect();
            entry.linked = !sources.iter().any(|s| s.contains(LINK_ERROR_MARKER));
            entry.uniforms.clear();
            for source in sources {
                for name in declared_uniforms(source) {
                    if !entry.uniforms.iter().any(|u| u == name) {
                        entry.uniforms.push(name.to_string());
                    }
                }
            }
        }
        self.record(GlCall::LinkProgram(program));
    }

    fn link_status(&self, program: ProgramHandle) -> bool {
        self.programs.get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        match self.programs.get(&program) {
            Some(p) if !p.linked => "ERROR: Linker error".to_string(),
            _ => String::new(),
        }
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.record(GlCall::DeleteProgram(program));
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.current_program = program;
        self.record(GlCall::UseProgram(program));
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<GLint> {
        let entry = self.programs.get(&program).filter(|p| p.linked)?;
        entry
            .uniforms
            .iter()
            .position(|u| u == name)
            .map(|i| i as GLint)
    }

    fn uniform_1i(&mut self, location: GLint, value: GLint) {
        self.record(GlCall::Uniform1i(location, value));
    }

    fn enable(&mut self, cap: GlCap) {
        self.caps.insert(cap);
        self.record(GlCall::Enable(cap));
    }

    fn disable(&mut self, cap: GlCap) {
        self.caps.remove(&cap);
        self.record(GlCall::Disable(cap));
    }

    fn is_enabled(&self, cap: GlCap) -> bool {
        self.caps.contains(&cap)
    }

    fn enable_client_state(&mut self, array: ClientArray) {
        self.client_arrays.insert(array);
        self.record(GlCall::EnableClientState(array));
    }

    fn disable_client_state(&mut self, array: ClientArray) {
        self.client_arrays.remove(&array);
        self.record(GlCall::DisableClientState(array));
    }

    fn is_client_state_enabled(&self, array: ClientArray) -> bool {
        self.client_arrays.contains(&array)
    }

    fn active_texture(&mut self, unit: u32) {
        self.active_unit = unit;
        self.record(GlCall::ActiveTexture(unit));
    }

    fn client_active_texture(&mut self, unit: u32) {
        self.record(GlCall::ClientActiveTexture(unit));
    }

    fn tex_coord_pointer(&mut self, components: GLint, data: &[GLfloat]) {
        self.record(GlCall::TexCoordPointer {
            components,
            len: data.len(),
        });
    }

    fn reset_texture_matrix(&mut self) {
        self.record(GlCall::ResetTextureMatrix);
    }

    fn tex_env_i(&mut self, pname: GLenum, param: GLenum) {
        self.record(GlCall::TexEnvi(pname, param));
    }

    fn tex_env_f(&mut self, pname: GLenum, param: GLfloat) {
        self.record(GlCall::TexEnvf(pname, param));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_marker() {
        let mut gl = DummyGl::new();
        let good = gl.create_shader(ShaderStage::Vertex);
        gl.shader_source(good, "void main() {}");
        gl.compile_shader(good);
        assert!(gl.compile_status(good));
        assert!(gl.shader_info_log(good).is_empty());

        let bad = gl.create_shader(ShaderStage::Fragment);
        gl.shader_source(bad, "#error broken\nvoid main() {}");
        gl.compile_shader(bad);
        assert!(!gl.compile_status(bad));
        assert!(!gl.shader_info_log(bad).is_empty());
    }

    #[test]
    fn test_uniforms_from_attached_sources() {
        let mut gl = DummyGl::new();
        let shader = gl.create_shader(ShaderStage::Fragment);
        gl.shader_source(
            shader,
            "uniform sampler2D BaseMap;\nuniform sampler2D NormalMap;\nvoid main() {}",
        );
        gl.compile_shader(shader);
        let program = gl.create_program();
        gl.attach_shader(program, shader);
        gl.link_program(program);

        assert!(gl.link_status(program));
        assert_eq!(gl.uniform_location(program, "BaseMap"), Some(0));
        assert_eq!(gl.uniform_location(program, "NormalMap"), Some(1));
        assert_eq!(gl.uniform_location(program, "GlowMap"), None);
    }

    #[test]
    fn test_link_marker() {
        let mut gl = DummyGl::new();
        let shader = gl.create_shader(ShaderStage::Vertex);
        gl.shader_source(shader, "// #link_error\nvoid main() {}");
        gl.compile_shader(shader);
        let program = gl.create_program();
        gl.attach_shader(program, shader);
        gl.link_program(program);
        assert!(!gl.link_status(program));
        assert_eq!(gl.uniform_location(program, "BaseMap"), None);
    }

    #[test]
    fn test_missing_entry_point() {
        let mut gl = DummyGl::new().without_entry_point("glLinkProgramARB");
        assert!(gl.resolve_entry_point("glCompileShaderARB"));
        assert!(!gl.resolve_entry_point("glLinkProgramARB"));
    }

    #[test]
    fn test_state_tracking() {
        let mut gl = DummyGl::new().with_client_state(ClientArray::Normal);
        assert!(gl.is_client_state_enabled(ClientArray::Normal));
        gl.enable(GlCap::Lighting);
        assert!(gl.is_enabled(GlCap::Lighting));
        gl.disable(GlCap::Lighting);
        assert!(!gl.is_enabled(GlCap::Lighting));
        assert_eq!(
            gl.calls(),
            &[GlCall::Enable(GlCap::Lighting), GlCall::Disable(GlCap::Lighting)]
        );
    }
}
