//! nifgl - shader selection for a NIF model viewer
//!
//! Picks, per draw call, either a GLSL program whose conditions match the
//! mesh being drawn or a fixed-function configuration that approximates
//! the same look with multitexturing.
//!
//! # Features
//! - Condition engine over scene-graph blocks ([`condition`])
//! - Shader and program objects loaded from `.vert`, `.frag` and `.prog`
//!   files ([`shader`])
//! - One-time driver capability probe ([`capability`])
//! - Draw-time program selection with hint fast path ([`Renderer`])
//! - Fixed-function multitexture fallback ([`fixed`])
//!
//! All native calls go through the [`GlApi`] trait. [`DummyGl`] records
//! calls for tests and headless hosts; [`NativeGl`] (feature `native`)
//! talks to a real driver through a loader function.
//!
//! # Example
//!
//! ```
//! use nifgl::{Capability, DummyGl, Renderer, RendererConfig};
//!
//! let mut renderer = Renderer::new(DummyGl::new(), RendererConfig::default());
//! assert_eq!(renderer.initialize(), Capability::Ready);
//! ```

pub mod backend;
pub mod capability;
pub mod condition;
pub mod config;
pub mod error;
pub mod fixed;
pub mod mesh;
pub mod model;
pub mod renderer;
pub mod shader;
pub mod texture;

pub use backend::{DummyGl, GlApi, GlCall};
#[cfg(feature = "native")]
pub use backend::NativeGl;
pub use capability::Capability;
pub use condition::{Comparator, Condition, ConditionGroup, ConditionSingle};
pub use config::RendererConfig;
pub use error::{CapabilityError, FormatError, ProgramError, ShaderError};
pub use mesh::{Mesh, PropertyList, PropertyState, TexturingProperty};
pub use model::{NifValue, SceneModel};
pub use renderer::{Renderer, Selection};
pub use shader::{Program, Shader, ShaderStage, TexCoordSource};
pub use texture::TextureSlot;
