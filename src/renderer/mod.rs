//! Shader registry and draw-time program selection.
//!
//! # Overview
//!
//! A [`Renderer`] owns the graphics backend, the capability state and the
//! shader and program registry. Typical use from a viewer:
//!
//! ```ignore
//! let mut renderer = Renderer::new(gl, RendererConfig::default());
//! renderer.initialize();
//! renderer.update_shaders();
//!
//! // per mesh, every frame
//! let selection = renderer.setup_program(&mesh, hint);
//! mesh.draw();
//! renderer.stop_program();
//! ```
//!
//! # Registry order
//!
//! Programs are tried in file name order. A hint naming a program moves it
//! to the front for that draw only.

mod setup;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub use setup::{BASE_MAP_UNIFORM, NORMAL_MAP_UNIFORM};

use crate::backend::{log_errors, GlApi};
use crate::capability::{probe, Capability};
use crate::config::{RendererConfig, PROGRAM_EXTENSION};
use crate::fixed::setup_fixed_function;
use crate::mesh::{candidate_blocks, Mesh};
use crate::shader::{Program, Shader, ShaderStage};
use crate::texture::reset_texture_units;

/// Outcome of [`Renderer::setup_program`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Named program is bound.
    Program(String),
    /// The fixed pipeline is configured.
    FixedFunction,
}

impl Selection {
    pub const FIXED_FUNCTION_NAME: &'static str = "fixed function pipeline";

    pub fn name(&self) -> &str {
        match self {
            Selection::Program(name) => name.as_str(),
            Selection::FixedFunction => Self::FIXED_FUNCTION_NAME,
        }
    }

    pub fn is_fixed_function(&self) -> bool {
        matches!(self, Selection::FixedFunction)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shader registry and program selector.
///
/// Must live on the thread owning the GL context. Dropping it deletes all
/// shader and program objects.
pub struct Renderer<G: GlApi> {
    gl: G,
    config: RendererConfig,
    capability: Capability,
    shaders: BTreeMap<String, Shader>,
    programs: BTreeMap<String, Program>,
}

impl<G: GlApi> Renderer<G> {
    pub fn new(gl: G, config: RendererConfig) -> Self {
        Self {
            gl,
            config,
            capability: Capability::Uninitialized,
            shaders: BTreeMap::new(),
            programs: BTreeMap::new(),
        }
    }

    pub fn gl(&self) -> &G {
        &self.gl
    }

    pub fn gl_mut(&mut self) -> &mut G {
        &mut self.gl
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Probe shader support. Only the first call does anything.
    pub fn initialize(&mut self) -> Capability {
        if self.capability.is_probed() {
            return self.capability;
        }

        self.capability = match probe(&mut self.gl) {
            Ok(()) => {
                log::info!("OpenGL shader objects available");
                Capability::Ready
            }
            Err(err) => {
                log::warn!("{err}, shaders disabled");
                Capability::Unavailable
            }
        };
        self.capability
    }

    /// Rebuild the registry from the shader directory.
    ///
    /// Probes the driver first if that hasn't happened yet. Vertex shaders
    /// are loaded first, then fragment shaders, then programs, each group
    /// in file name order. A file that fails to load is still registered
    /// with a failed status.
    pub fn update_shaders(&mut self) {
        self.release_shaders();

        if !self.initialize().is_ready() {
            log::debug!("shader objects unavailable, registry left empty");
            return;
        }

        let dir = self.config.shader_dir().to_path_buf();
        let files = match list_files(&dir) {
            Ok(files) => files,
            Err(err) => {
                log::warn!("couldn't read shader directory {}: {err}", dir.display());
                return;
            }
        };

        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            for (name, path) in files.iter().filter(|(_, p)| stage_of(p) == Some(stage)) {
                let mut shader = Shader::new(&mut self.gl, name.clone(), stage);
                let _ = shader.load(&mut self.gl, path);
                self.shaders.insert(name.clone(), shader);
            }
        }

        for (name, path) in files.iter().filter(|(_, p)| has_extension(p, PROGRAM_EXTENSION)) {
            let mut program = Program::new(&mut self.gl, name.clone());
            let _ = program.load(&mut self.gl, path, &self.shaders);
            self.programs.insert(name.clone(), program);
        }

        log::info!(
            "loaded {} shader(s) and {} program(s) from {}",
            self.shaders.len(),
            self.programs.len(),
            dir.display()
        );
    }

    /// Delete every program, then every shader.
    pub fn release_shaders(&mut self) {
        for (_, program) in std::mem::take(&mut self.programs) {
            program.destroy(&mut self.gl);
        }
        for (_, shader) in std::mem::take(&mut self.shaders) {
            shader.destroy(&mut self.gl);
        }
    }

    pub fn shader(&self, name: &str) -> Option<&Shader> {
        self.shaders.get(name)
    }

    pub fn shaders(&self) -> impl Iterator<Item = &Shader> {
        self.shaders.values()
    }

    pub fn program(&self, name: &str) -> Option<&Program> {
        self.programs.get(name)
    }

    /// Programs in registry order.
    pub fn programs(&self) -> impl Iterator<Item = &Program> {
        self.programs.values()
    }

    /// Pick and bind a program for `mesh`, or set up the fixed pipeline.
    ///
    /// A non-empty `hint` naming a loaded program is tried first. Never
    /// fails: when nothing matches, the fixed pipeline is configured.
    pub fn setup_program<M: Mesh>(&mut self, mesh: &M, hint: &str) -> Selection {
        log_errors(&mut self.gl, "setup");
        self.initialize();

        let blocks = candidate_blocks(mesh);

        if !self.capability.is_ready() || !mesh.shading_enabled() {
            setup_fixed_function(&mut self.gl, mesh);
            return Selection::FixedFunction;
        }

        if !hint.is_empty() {
            if let Some(program) = self.programs.get(hint) {
                if program.status() && setup::apply_program(&mut self.gl, program, mesh, &blocks) {
                    log::debug!("selected hinted program {hint}");
                    return Selection::Program(hint.to_string());
                }
            }
        }

        for program in self.programs.values() {
            if program.status() && setup::apply_program(&mut self.gl, program, mesh, &blocks) {
                log::debug!("selected program {}", program.name());
                return Selection::Program(program.name().to_string());
            }
        }

        log::debug!("no program matches, using fixed function pipeline");
        self.stop_program();
        setup_fixed_function(&mut self.gl, mesh);
        Selection::FixedFunction
    }

    /// Unbind the current program and reset every texture unit.
    pub fn stop_program(&mut self) {
        if self.capability.is_ready() {
            self.gl.use_program(None);
        }
        reset_texture_units(&mut self.gl);
    }
}

impl<G: GlApi> Drop for Renderer<G> {
    fn drop(&mut self) {
        self.release_shaders();
    }
}

impl<G: GlApi + fmt::Debug> fmt::Debug for Renderer<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("gl", &self.gl)
            .field("capability", &self.capability)
            .field("shaders", &self.shaders.len())
            .field("programs", &self.programs.len())
            .finish()
    }
}

/// Files in `dir` as (file name, path), sorted by name.
///
/// Symlinks are followed. Entries that can't be read are skipped.
fn list_files(dir: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable entry in {}: {err}", dir.display());
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => files.push((name.to_string(), path)),
            None => log::warn!("skipping non UTF-8 file name {}", path.display()),
        }
    }
    files.sort();
    Ok(files)
}

fn stage_of(path: &Path) -> Option<ShaderStage> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ShaderStage::from_extension)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DummyGl, GlCall};

    #[test]
    fn test_initialize_once() {
        let mut renderer = Renderer::new(DummyGl::new(), RendererConfig::default());
        assert_eq!(renderer.capability(), Capability::Uninitialized);
        assert_eq!(renderer.initialize(), Capability::Ready);
        assert_eq!(renderer.initialize(), Capability::Ready);
    }

    #[test]
    fn test_unavailable_is_final() {
        let gl = DummyGl::new().with_extensions("GL_ARB_multitexture");
        let mut renderer = Renderer::new(gl, RendererConfig::default());
        assert_eq!(renderer.initialize(), Capability::Unavailable);
        *renderer.gl_mut() = DummyGl::new();
        assert_eq!(renderer.initialize(), Capability::Unavailable);
    }

    #[test]
    fn test_update_initializes_once() {
        let mut renderer = Renderer::new(DummyGl::new(), RendererConfig::default());
        renderer.update_shaders();
        assert_eq!(renderer.capability(), Capability::Ready);

        // a second update doesn't probe the new backend
        *renderer.gl_mut() = DummyGl::new().with_extensions("GL_ARB_multitexture");
        renderer.update_shaders();
        assert_eq!(renderer.capability(), Capability::Ready);
    }

    #[test]
    fn test_update_with_unavailable_capability_leaves_registry_empty() {
        let gl = DummyGl::new().with_extensions("GL_ARB_multitexture");
        let mut renderer = Renderer::new(gl, RendererConfig::default());
        renderer.update_shaders();
        assert_eq!(renderer.capability(), Capability::Unavailable);
        assert_eq!(renderer.programs().count(), 0);
        assert_eq!(renderer.gl().shader_count(), 0);
    }

    #[test]
    fn test_list_files_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.frag"), "").unwrap();
        fs::write(dir.path().join("a.vert"), "").unwrap();
        fs::create_dir(dir.path().join("c.prog")).unwrap();

        let names: Vec<String> = list_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["a.vert", "b.frag"]);
    }

    #[test]
    fn test_stop_program() {
        let gl = DummyGl::new().with_max_texture_units(2);
        let mut renderer = Renderer::new(gl, RendererConfig::default());
        renderer.stop_program();
        assert!(!renderer
            .gl()
            .calls()
            .iter()
            .any(|call| matches!(call, GlCall::UseProgram(_))));

        renderer.initialize();
        renderer.gl_mut().clear_calls();
        renderer.stop_program();
        assert_eq!(renderer.gl().calls()[0], GlCall::UseProgram(None));
        assert_eq!(renderer.gl().active_unit(), 0);
    }

    #[test]
    fn test_selection_name() {
        assert_eq!(Selection::FixedFunction.to_string(), "fixed function pipeline");
        assert_eq!(Selection::Program("a.prog".into()).name(), "a.prog");
        assert!(Selection::FixedFunction.is_fixed_function());
    }
}
