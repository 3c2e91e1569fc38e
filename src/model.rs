//! Query interface onto the scene-graph data model.
//!
//! The model itself (blocks, their types and values) lives in the host
//! application. The renderer only needs the three queries below.

/// A value stored in a model block.
#[derive(Debug, Clone, PartialEq)]
pub enum NifValue {
    String(String),
    Count(u32),
    Float(f32),
    /// Any other kind (vectors, colors, links, ...). Never compares true.
    Other,
}

impl NifValue {
    pub fn is_string(&self) -> bool {
        matches!(self, NifValue::String(_))
    }

    pub fn is_count(&self) -> bool {
        matches!(self, NifValue::Count(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, NifValue::Float(_))
    }
}

/// Scene-graph model queries used by shader conditions.
pub trait SceneModel {
    /// Address of a block or of a value inside a block.
    type Index: Clone;

    /// Whether `block` is of type `type_name` or derives from it.
    fn inherits(&self, block: &Self::Index, type_name: &str) -> bool;

    /// Resolve a `/` separated child path relative to `block`.
    fn child(&self, block: &Self::Index, path: &str) -> Option<Self::Index>;

    /// Value stored at `index`.
    fn value(&self, index: &Self::Index) -> NifValue;
}
