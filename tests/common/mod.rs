//! Common utilities for renderer integration tests.
//!
//! Provides an in-memory scene model, a mesh with properties and a
//! texturing property that records what the renderer asked it to bind.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;

use glam::{Vec2, Vec3};
use nifgl::{
    DummyGl, Mesh, NifValue, PropertyList, PropertyState, Renderer, RendererConfig, SceneModel,
    TextureSlot, TexturingProperty,
};
use tempfile::TempDir;

/// Install the test logger once.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Scene Model
// ============================================================================

/// Address of a block, or of a named value inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeIndex {
    pub block: usize,
    pub path: Option<String>,
}

#[derive(Debug, Default)]
struct FakeBlock {
    types: Vec<String>,
    values: HashMap<String, NifValue>,
}

/// Scene model made of flat blocks with typed values.
#[derive(Debug, Default)]
pub struct FakeModel {
    blocks: Vec<FakeBlock>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block. `types` lists the block type followed by its ancestors.
    pub fn add_block(&mut self, types: &[&str], values: Vec<(&str, NifValue)>) -> FakeIndex {
        self.blocks.push(FakeBlock {
            types: types.iter().map(|t| t.to_string()).collect(),
            values: values
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        });
        FakeIndex {
            block: self.blocks.len() - 1,
            path: None,
        }
    }
}

impl SceneModel for FakeModel {
    type Index = FakeIndex;

    fn inherits(&self, block: &FakeIndex, type_name: &str) -> bool {
        block.path.is_none()
            && self
                .blocks
                .get(block.block)
                .is_some_and(|b| b.types.iter().any(|t| t == type_name))
    }

    fn child(&self, block: &FakeIndex, path: &str) -> Option<FakeIndex> {
        let entry = self.blocks.get(block.block)?;
        entry.values.contains_key(path).then(|| FakeIndex {
            block: block.block,
            path: Some(path.to_string()),
        })
    }

    fn value(&self, index: &FakeIndex) -> NifValue {
        index
            .path
            .as_ref()
            .and_then(|path| self.blocks.get(index.block)?.values.get(path).cloned())
            .unwrap_or(NifValue::Other)
    }
}

// ============================================================================
// Properties
// ============================================================================

/// Texturing property backed by a slot table.
#[derive(Debug, Default)]
pub struct FakeTexturing {
    /// Slot to (file name, coordinate set).
    slots: HashMap<TextureSlot, (String, usize)>,
    failing: HashSet<TextureSlot>,
    log: RefCell<Vec<String>>,
}

impl FakeTexturing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, slot: TextureSlot, file_name: &str, coord_set: usize) -> Self {
        self.slots.insert(slot, (file_name.to_string(), coord_set));
        self
    }

    /// Make binds of `slot` fail, as for a texture that can't be loaded.
    pub fn with_failing(mut self, slot: TextureSlot) -> Self {
        self.failing.insert(slot);
        self
    }

    /// Binds performed so far.
    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn usable(&self, slot: TextureSlot) -> bool {
        self.slots.contains_key(&slot) && !self.failing.contains(&slot)
    }
}

impl TexturingProperty for FakeTexturing {
    fn bind(&self, slot: TextureSlot) -> bool {
        if !self.usable(slot) {
            return false;
        }
        self.log.borrow_mut().push(format!("bind {slot}"));
        true
    }

    fn bind_file(&self, slot: TextureSlot, file_name: &str) -> bool {
        if !self.usable(slot) || file_name.is_empty() {
            return false;
        }
        self.log.borrow_mut().push(format!("bind {slot} {file_name}"));
        true
    }

    fn bind_coords(&self, slot: TextureSlot, coords: &[Vec<Vec2>], stage: u32) -> bool {
        let Some((_, set)) = self.slots.get(&slot) else {
            return false;
        };
        if self.failing.contains(&slot) || coords.get(*set).map_or(true, |c| c.is_empty()) {
            return false;
        }
        self.log.borrow_mut().push(format!("stage {stage} {slot}"));
        true
    }

    fn coord_set(&self, slot: TextureSlot) -> Option<usize> {
        self.slots.get(&slot).map(|(_, set)| *set)
    }

    fn file_name(&self, slot: TextureSlot) -> String {
        self.slots
            .get(&slot)
            .map(|(name, _)| name.clone())
            .unwrap_or_default()
    }
}

/// Property list recording the states it was asked to apply.
#[derive(Debug, Default)]
pub struct FakeProperties {
    pub blocks: Vec<FakeIndex>,
    pub texturing: Option<FakeTexturing>,
    applied: RefCell<Vec<PropertyState>>,
}

impl FakeProperties {
    pub fn applied(&self) -> Vec<PropertyState> {
        self.applied.borrow().clone()
    }

    pub fn clear_applied(&self) {
        self.applied.borrow_mut().clear();
    }
}

impl PropertyList for FakeProperties {
    type Index = FakeIndex;

    fn block_indices(&self) -> Vec<FakeIndex> {
        self.blocks.clone()
    }

    fn texturing(&self) -> Option<&dyn TexturingProperty> {
        self.texturing.as_ref().map(|t| t as &dyn TexturingProperty)
    }

    fn apply(&self, state: PropertyState) {
        self.applied.borrow_mut().push(state);
    }
}

// ============================================================================
// Mesh
// ============================================================================

pub struct FakeMesh {
    pub model: FakeModel,
    pub index: Option<FakeIndex>,
    pub data: Option<FakeIndex>,
    pub properties: FakeProperties,
    pub coords: Vec<Vec<Vec2>>,
    pub tangents: Vec<Vec3>,
    pub shading: bool,
}

impl FakeMesh {
    /// A textured triangle: `NiTriShape` with `NiTriShapeData`, a
    /// `NiTexturingProperty` using `rock_01.dds` as base texture and a
    /// `NiMaterialProperty`.
    pub fn textured() -> Self {
        let mut model = FakeModel::new();
        let index = model.add_block(
            &["NiTriShape", "NiGeometry", "NiAVObject"],
            vec![("Name", NifValue::String("Rock".into()))],
        );
        let data = model.add_block(
            &["NiTriShapeData", "NiGeometryData"],
            vec![("Num Vertices", NifValue::Count(3))],
        );
        let texprop = model.add_block(
            &["NiTexturingProperty", "NiProperty"],
            vec![
                ("Apply Mode", NifValue::Count(2)),
                ("Flags", NifValue::Count(0x1000)),
            ],
        );
        let material = model.add_block(
            &["NiMaterialProperty", "NiProperty"],
            vec![
                ("Alpha", NifValue::Float(1.0)),
                ("Name", NifValue::String("stone".into())),
            ],
        );

        Self {
            model,
            index: Some(index),
            data: Some(data),
            properties: FakeProperties {
                blocks: vec![texprop, material],
                texturing: Some(FakeTexturing::new().with_slot(TextureSlot::Base, "rock_01.dds", 0)),
                applied: RefCell::default(),
            },
            coords: vec![vec![Vec2::ZERO, Vec2::X, Vec2::Y]],
            tangents: vec![Vec3::X; 3],
            shading: true,
        }
    }

    pub fn with_texturing(mut self, texturing: Option<FakeTexturing>) -> Self {
        self.properties.texturing = texturing;
        self
    }

    pub fn texturing(&self) -> &FakeTexturing {
        self.properties
            .texturing
            .as_ref()
            .expect("mesh has a texturing property")
    }
}

impl Mesh for FakeMesh {
    type Model = FakeModel;
    type Properties = FakeProperties;

    fn model(&self) -> Option<&FakeModel> {
        Some(&self.model)
    }

    fn index(&self) -> Option<FakeIndex> {
        self.index.clone()
    }

    fn data_index(&self) -> Option<FakeIndex> {
        self.data.clone()
    }

    fn active_properties(&self) -> &FakeProperties {
        &self.properties
    }

    fn coords(&self) -> &[Vec<Vec2>] {
        &self.coords
    }

    fn tangents(&self) -> &[Vec3] {
        &self.tangents
    }

    fn shading_enabled(&self) -> bool {
        self.shading
    }
}

// ============================================================================
// Shader Directories
// ============================================================================

/// Vertex shader without uniforms.
pub const PLAIN_VERT: &str = "void main() { gl_Position = ftransform(); }\n";
/// Fragment shader without uniforms.
pub const PLAIN_FRAG: &str = "void main() { gl_FragColor = gl_Color; }\n";
/// Fragment shader sampling the base texture.
pub const BASE_FRAG: &str = "uniform sampler2D BaseMap;\nvoid main() {}\n";
/// Fragment shader sampling base and normal maps.
pub const NORMAL_FRAG: &str =
    "uniform sampler2D BaseMap;\nuniform sampler2D NormalMap;\nvoid main() {}\n";
/// Fragment shader the driver rejects.
pub const BROKEN_FRAG: &str = "#error unsupported\n";

/// Write `files` into a fresh shader directory.
pub fn shader_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).expect("write shader file");
    }
    dir
}

/// Initialized renderer with its registry loaded from `dir`.
pub fn renderer_for(gl: DummyGl, dir: &TempDir) -> Renderer<DummyGl> {
    init_logger();
    let mut renderer = Renderer::new(gl, RendererConfig::new().with_shader_dir(dir.path()));
    renderer.initialize();
    renderer.update_shaders();
    renderer.gl_mut().clear_calls();
    renderer
}
