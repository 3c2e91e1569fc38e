use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::backend::{GlApi, ProgramHandle, GLint};
use crate::condition::ConditionGroup;
use crate::error::ProgramError;

use super::format::{parse_directive, Directive, ProgramBuilder, TexCoordSource};
use super::Shader;

/// A linked shader program guarded by conditions.
#[derive(Debug)]
pub struct Program {
    name: String,
    handle: ProgramHandle,
    status: bool,
    conditions: ConditionGroup,
    texcoords: BTreeMap<u32, TexCoordSource>,
}

impl Program {
    /// Create the native program object. Nothing is attached yet.
    pub fn new<G: GlApi + ?Sized>(gl: &mut G, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: gl.create_program(),
            status: false,
            conditions: ConditionGroup::default(),
            texcoords: BTreeMap::new(),
        }
    }

    /// Read a program file and link it against `shaders`.
    pub fn load<G: GlApi + ?Sized>(
        &mut self,
        gl: &mut G,
        path: &Path,
        shaders: &BTreeMap<String, Shader>,
    ) -> Result<(), ProgramError> {
        match fs::read_to_string(path) {
            Ok(source) => self.load_source(gl, &source, shaders),
            Err(source) => self.fail(ProgramError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parse program text, attach its shaders and link.
    ///
    /// The first failing line aborts loading; shaders attached before it
    /// stay attached but the program is never linked.
    pub fn load_source<G: GlApi + ?Sized>(
        &mut self,
        gl: &mut G,
        source: &str,
        shaders: &BTreeMap<String, Shader>,
    ) -> Result<(), ProgramError> {
        match self.parse_and_link(gl, source, shaders) {
            Ok(()) => {
                self.status = true;
                log::debug!(
                    "linked program {} ({} condition(s), {} texcoord unit(s))",
                    self.name,
                    self.conditions.len(),
                    self.texcoords.len()
                );
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    fn parse_and_link<G: GlApi + ?Sized>(
        &mut self,
        gl: &mut G,
        source: &str,
        shaders: &BTreeMap<String, Shader>,
    ) -> Result<(), ProgramError> {
        let mut builder = ProgramBuilder::new();

        for (number, line) in source.lines().enumerate() {
            let format_err = |source| ProgramError::Format {
                line: number + 1,
                source,
            };
            match parse_directive(line).map_err(format_err)? {
                Some(Directive::Shaders(names)) => {
                    for name in names {
                        let shader = shaders
                            .get(&name)
                            .ok_or_else(|| ProgramError::ShaderNotFound(name.clone()))?;
                        if !shader.status() {
                            return Err(ProgramError::ShaderNotCompiled(name));
                        }
                        gl.attach_shader(self.handle, shader.handle());
                    }
                }
                Some(directive) => builder.apply(directive).map_err(format_err)?,
                None => {}
            }
        }

        let line_count = source.lines().count();
        let (conditions, texcoords) = builder.finish().map_err(|source| ProgramError::Format {
            line: line_count,
            source,
        })?;
        self.conditions = conditions;
        self.texcoords = texcoords;

        gl.link_program(self.handle);
        if !gl.link_status(self.handle) {
            return Err(ProgramError::Link {
                name: self.name.clone(),
                log: gl.program_info_log(self.handle),
            });
        }
        Ok(())
    }

    fn fail(&mut self, err: ProgramError) -> Result<(), ProgramError> {
        self.status = false;
        log::warn!("error loading shader program {}: {err}", self.name);
        Err(err)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Whether loading and linking succeeded.
    pub fn status(&self) -> bool {
        self.status
    }

    /// Root condition group. Empty until the program loads successfully.
    pub fn conditions(&self) -> &ConditionGroup {
        &self.conditions
    }

    /// Texture coordinate sources by texture unit, in unit order.
    pub fn texcoords(&self) -> &BTreeMap<u32, TexCoordSource> {
        &self.texcoords
    }

    pub(crate) fn uniform_location<G: GlApi + ?Sized>(&self, gl: &G, name: &str) -> Option<GLint> {
        gl.uniform_location(self.handle, name)
    }

    /// Release the native object.
    pub(crate) fn destroy<G: GlApi + ?Sized>(self, gl: &mut G) {
        gl.delete_program(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DummyGl, GlCall};
    use crate::error::FormatError;
    use crate::shader::ShaderStage;
    use crate::texture::TextureSlot;

    fn compiled(gl: &mut DummyGl, name: &str, stage: ShaderStage, source: &str) -> Shader {
        let mut shader = Shader::new(gl, name, stage);
        let _ = shader.compile_source(gl, source);
        shader
    }

    fn registry(gl: &mut DummyGl) -> BTreeMap<String, Shader> {
        let mut shaders = BTreeMap::new();
        for shader in [
            compiled(gl, "ok.vert", ShaderStage::Vertex, "void main() {}"),
            compiled(gl, "ok.frag", ShaderStage::Fragment, "uniform sampler2D BaseMap;"),
            compiled(gl, "bad.frag", ShaderStage::Fragment, "#error"),
            compiled(gl, "nolink.vert", ShaderStage::Vertex, "// #link_error"),
        ] {
            shaders.insert(shader.name().to_string(), shader);
        }
        shaders
    }

    #[test]
    fn test_load_source() {
        let mut gl = DummyGl::new();
        let shaders = registry(&mut gl);
        let mut program = Program::new(&mut gl, "base.prog");

        let source = "shaders ok.vert ok.frag\n\
                      check NiTexturingProperty\n\
                      checkgroup begin or\n\
                      check NiAlphaProperty\n\
                      checkgroup end\n\
                      texcoords 0 base\n\
                      texcoords 1 tangents\n";
        program.load_source(&mut gl, source, &shaders).unwrap();

        assert!(program.status());
        assert_eq!(program.conditions().len(), 2);
        assert_eq!(
            program.texcoords().get(&0),
            Some(&TexCoordSource::Slot(TextureSlot::Base))
        );
        assert_eq!(program.texcoords().get(&1), Some(&TexCoordSource::Tangents));
        assert_eq!(program.uniform_location(&gl, "BaseMap"), Some(0));
    }

    #[test]
    fn test_duplicate_unit_fails() {
        let mut gl = DummyGl::new();
        let shaders = registry(&mut gl);
        let mut program = Program::new(&mut gl, "dup.prog");

        let err = program
            .load_source(&mut gl, "texcoords 0 basetexture\ntexcoords 0 glow", &shaders)
            .unwrap_err();
        assert!(matches!(
            err,
            ProgramError::Format {
                line: 2,
                source: FormatError::DuplicateTextureUnit(0)
            }
        ));
        assert!(!program.status());
    }

    #[test]
    fn test_failed_dependency_never_links() {
        let mut gl = DummyGl::new();
        let shaders = registry(&mut gl);
        let mut program = Program::new(&mut gl, "broken.prog");
        gl.clear_calls();

        let err = program
            .load_source(&mut gl, "shaders ok.vert bad.frag", &shaders)
            .unwrap_err();
        assert!(err.is_dependency());
        assert!(matches!(err, ProgramError::ShaderNotCompiled(ref name) if name == "bad.frag"));
        assert!(!program.status());
        assert!(!gl
            .calls()
            .iter()
            .any(|call| matches!(call, GlCall::LinkProgram(_))));
        // ok.vert was attached before the failure
        assert_eq!(
            gl.calls()
                .iter()
                .filter(|call| matches!(call, GlCall::AttachShader(..)))
                .count(),
            1
        );
    }

    #[test]
    fn test_unknown_shader() {
        let mut gl = DummyGl::new();
        let shaders = registry(&mut gl);
        let mut program = Program::new(&mut gl, "missing.prog");
        let err = program
            .load_source(&mut gl, "shaders nothere.vert", &shaders)
            .unwrap_err();
        assert!(matches!(err, ProgramError::ShaderNotFound(ref name) if name == "nothere.vert"));
    }

    #[test]
    fn test_link_failure() {
        let mut gl = DummyGl::new();
        let shaders = registry(&mut gl);
        let mut program = Program::new(&mut gl, "nolink.prog");
        let err = program
            .load_source(&mut gl, "shaders nolink.vert ok.frag", &shaders)
            .unwrap_err();
        assert!(matches!(err, ProgramError::Link { .. }));
        assert!(!program.status());
    }

    #[test]
    fn test_unclosed_group_reports_last_line() {
        let mut gl = DummyGl::new();
        let shaders = registry(&mut gl);
        let mut program = Program::new(&mut gl, "open.prog");
        let err = program
            .load_source(&mut gl, "checkgroup begin\ncheck NiTriShape", &shaders)
            .unwrap_err();
        assert!(matches!(
            err,
            ProgramError::Format {
                line: 2,
                source: FormatError::UnclosedCheckgroup(1)
            }
        ));
    }

    #[test]
    fn test_empty_program_links() {
        let mut gl = DummyGl::new();
        let shaders = BTreeMap::new();
        let mut program = Program::new(&mut gl, "empty.prog");
        program.load_source(&mut gl, "", &shaders).unwrap();
        assert!(program.status());
        assert!(program.conditions().is_empty());
    }
}
