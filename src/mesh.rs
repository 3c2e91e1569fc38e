//! Collaborator interfaces for meshes and their rendering properties.
//!
//! Geometry storage, texture loading and the per-property GL state live in
//! the host application. The renderer reaches them through these traits:
//!
//! - [`Mesh`] - model block, coordinate sets and tangents of a draw
//! - [`PropertyList`] - the properties active on a mesh
//! - [`TexturingProperty`] - texture binding by slot or file name

use glam::{Vec2, Vec3};

use crate::model::SceneModel;
use crate::texture::TextureSlot;

/// Fixed pipeline state owned by a property object.
///
/// The renderer decides which properties apply and in which order. What
/// each one does to the GL state is up to the property itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyState {
    /// Alpha blending and alpha test.
    Alpha,
    /// Vertex color mode. `color_array` tells whether a color array is bound.
    VertexColor { color_array: bool },
    /// Material combined with the specular property.
    MaterialSpecular,
    /// Texturing state of the fixed pipeline.
    Texturing,
    ZBuffer,
    Stencil,
    Wireframe,
}

/// Texture binding for the texturing property of a mesh.
pub trait TexturingProperty {
    /// Bind the texture of `slot` to the active texture unit.
    fn bind(&self, slot: TextureSlot) -> bool;

    /// Bind `file_name` in place of the texture of `slot`.
    fn bind_file(&self, slot: TextureSlot, file_name: &str) -> bool;

    /// Bind the texture of `slot` to fixed-function `stage` together with
    /// its coordinate set taken from `coords`.
    fn bind_coords(&self, slot: TextureSlot, coords: &[Vec<Vec2>], stage: u32) -> bool;

    /// Coordinate set used by `slot`, `None` when the slot is unused.
    fn coord_set(&self, slot: TextureSlot) -> Option<usize>;

    /// Texture file name of `slot`, empty when the slot is unused.
    fn file_name(&self, slot: TextureSlot) -> String;
}

/// The active properties of a mesh.
pub trait PropertyList {
    /// Model index type of the property blocks.
    type Index;

    /// Model blocks of the active properties, in property order.
    fn block_indices(&self) -> Vec<Self::Index>;

    /// The texturing property, if one is active.
    fn texturing(&self) -> Option<&dyn TexturingProperty>;

    /// Let the matching property apply its state. Does nothing when no such
    /// property is active.
    fn apply(&self, state: PropertyState);
}

/// A mesh about to be drawn.
pub trait Mesh {
    type Model: SceneModel;
    type Properties: PropertyList<Index = <Self::Model as SceneModel>::Index>;

    /// Model holding the mesh blocks, `None` when the mesh is detached.
    fn model(&self) -> Option<&Self::Model>;

    /// The mesh block.
    fn index(&self) -> Option<<Self::Model as SceneModel>::Index>;

    /// The geometry data block of the mesh.
    fn data_index(&self) -> Option<<Self::Model as SceneModel>::Index>;

    fn active_properties(&self) -> &Self::Properties;

    /// Texture coordinate sets, one `Vec2` per vertex each.
    fn coords(&self) -> &[Vec<Vec2>];

    /// Transformed tangents, one per vertex. Empty when not computed.
    fn tangents(&self) -> &[Vec3];

    /// Whether the scene has shading switched on.
    fn shading_enabled(&self) -> bool;
}

/// Blocks shader conditions are evaluated against: the mesh block, its
/// data block and the block of every active property, in that order.
/// Missing indices are skipped.
pub fn candidate_blocks<M: Mesh>(mesh: &M) -> Vec<<M::Model as SceneModel>::Index> {
    let mut blocks: Vec<_> = mesh.index().into_iter().collect();
    blocks.extend(mesh.data_index());
    blocks.extend(mesh.active_properties().block_indices());
    blocks
}
