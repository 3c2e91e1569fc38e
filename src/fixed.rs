//! Fixed-function fallback.
//!
//! Used when shaders are unavailable, shading is switched off or no
//! program matches a mesh. Property objects set up lighting, blending,
//! material and depth state; the textures are stacked with
//! `GL_ARB_texture_env_combine`, one texture stage per bound slot.

use crate::backend::{
    log_errors, ClientArray, GlApi, GlCap, GL_ADD, GL_COMBINE_ALPHA_ARB, GL_COMBINE_ARB,
    GL_COMBINE_RGB_ARB, GL_INTERPOLATE_ARB, GL_MODULATE, GL_OPERAND0_ALPHA_ARB,
    GL_OPERAND0_RGB_ARB, GL_OPERAND1_ALPHA_ARB, GL_OPERAND1_RGB_ARB, GL_OPERAND2_RGB_ARB,
    GL_PREVIOUS_ARB, GL_REPLACE, GL_RGB_SCALE_ARB, GL_SOURCE0_ALPHA_ARB, GL_SOURCE0_RGB_ARB,
    GL_SOURCE1_ALPHA_ARB, GL_SOURCE1_RGB_ARB, GL_SOURCE2_RGB_ARB, GL_SRC_ALPHA, GL_SRC_COLOR,
    GL_TEXTURE, GL_TEXTURE_ENV_MODE,
};
use crate::mesh::{Mesh, PropertyList, PropertyState};
use crate::texture::TextureSlot;

/// RGB combine function of a texture stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineRgb {
    /// previous * texture
    Modulate,
    /// mix(previous, texture, texture alpha)
    Interpolate,
    /// previous + texture
    Add,
}

/// Alpha combine function of a texture stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineAlpha {
    /// previous * texture
    Modulate,
    /// previous
    Replace,
}

/// One texture stage of the multitexture emulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultitextureStage {
    pub slot: TextureSlot,
    pub rgb: CombineRgb,
    pub alpha: CombineAlpha,
    pub rgb_scale: f32,
}

impl MultitextureStage {
    const fn new(slot: TextureSlot, rgb: CombineRgb, alpha: CombineAlpha, rgb_scale: f32) -> Self {
        Self {
            slot,
            rgb,
            alpha,
            rgb_scale,
        }
    }

    /// Program the texture environment of the active unit.
    pub fn configure<G: GlApi + ?Sized>(&self, gl: &mut G) {
        gl.tex_env_i(GL_TEXTURE_ENV_MODE, GL_COMBINE_ARB);

        match self.rgb {
            CombineRgb::Modulate | CombineRgb::Add => {
                let func = if self.rgb == CombineRgb::Add {
                    GL_ADD
                } else {
                    GL_MODULATE
                };
                gl.tex_env_i(GL_COMBINE_RGB_ARB, func);
                gl.tex_env_i(GL_SOURCE0_RGB_ARB, GL_PREVIOUS_ARB);
                gl.tex_env_i(GL_OPERAND0_RGB_ARB, GL_SRC_COLOR);
                gl.tex_env_i(GL_SOURCE1_RGB_ARB, GL_TEXTURE);
                gl.tex_env_i(GL_OPERAND1_RGB_ARB, GL_SRC_COLOR);
            }
            CombineRgb::Interpolate => {
                gl.tex_env_i(GL_COMBINE_RGB_ARB, GL_INTERPOLATE_ARB);
                gl.tex_env_i(GL_SOURCE0_RGB_ARB, GL_TEXTURE);
                gl.tex_env_i(GL_OPERAND0_RGB_ARB, GL_SRC_COLOR);
                gl.tex_env_i(GL_SOURCE1_RGB_ARB, GL_PREVIOUS_ARB);
                gl.tex_env_i(GL_OPERAND1_RGB_ARB, GL_SRC_COLOR);
                gl.tex_env_i(GL_SOURCE2_RGB_ARB, GL_TEXTURE);
                gl.tex_env_i(GL_OPERAND2_RGB_ARB, GL_SRC_ALPHA);
            }
        }

        match self.alpha {
            CombineAlpha::Modulate => {
                gl.tex_env_i(GL_COMBINE_ALPHA_ARB, GL_MODULATE);
                gl.tex_env_i(GL_SOURCE0_ALPHA_ARB, GL_PREVIOUS_ARB);
                gl.tex_env_i(GL_OPERAND0_ALPHA_ARB, GL_SRC_ALPHA);
                gl.tex_env_i(GL_SOURCE1_ALPHA_ARB, GL_TEXTURE);
                gl.tex_env_i(GL_OPERAND1_ALPHA_ARB, GL_SRC_ALPHA);
            }
            CombineAlpha::Replace => {
                gl.tex_env_i(GL_COMBINE_ALPHA_ARB, GL_REPLACE);
                gl.tex_env_i(GL_SOURCE0_ALPHA_ARB, GL_PREVIOUS_ARB);
                gl.tex_env_i(GL_OPERAND0_ALPHA_ARB, GL_SRC_ALPHA);
            }
        }

        gl.tex_env_f(GL_RGB_SCALE_ARB, self.rgb_scale);
    }
}

/// Texture stages in the order they are stacked.
pub const MULTITEXTURE_STAGES: [MultitextureStage; 6] = [
    MultitextureStage::new(TextureSlot::Dark, CombineRgb::Modulate, CombineAlpha::Modulate, 1.0),
    MultitextureStage::new(TextureSlot::Base, CombineRgb::Modulate, CombineAlpha::Modulate, 1.0),
    MultitextureStage::new(TextureSlot::Detail, CombineRgb::Modulate, CombineAlpha::Modulate, 2.0),
    MultitextureStage::new(TextureSlot::Decal0, CombineRgb::Interpolate, CombineAlpha::Replace, 1.0),
    MultitextureStage::new(TextureSlot::Decal1, CombineRgb::Interpolate, CombineAlpha::Replace, 1.0),
    MultitextureStage::new(TextureSlot::Glow, CombineRgb::Add, CombineAlpha::Replace, 1.0),
];

/// Configure the fixed pipeline for `mesh`.
///
/// Returns the number of texture stages in use. A slot that fails to bind
/// is skipped and the next one takes its stage.
pub fn setup_fixed_function<G: GlApi + ?Sized, M: Mesh>(gl: &mut G, mesh: &M) -> u32 {
    let props = mesh.active_properties();

    gl.enable(GlCap::Lighting);
    props.apply(PropertyState::Alpha);
    props.apply(PropertyState::VertexColor {
        color_array: gl.is_client_state_enabled(ClientArray::Color),
    });
    props.apply(PropertyState::MaterialSpecular);
    props.apply(PropertyState::Texturing);
    props.apply(PropertyState::ZBuffer);
    props.apply(PropertyState::Stencil);
    props.apply(PropertyState::Wireframe);

    if gl.is_client_state_enabled(ClientArray::Normal) {
        gl.enable(GlCap::Normalize);
    } else {
        gl.disable(GlCap::Normalize);
    }

    let mut stage = 0;
    if let Some(texturing) = props.texturing() {
        for entry in &MULTITEXTURE_STAGES {
            if texturing.bind_coords(entry.slot, mesh.coords(), stage) {
                log::trace!("texture stage {stage}: {}", entry.slot);
                entry.configure(gl);
                stage += 1;
            }
        }
    }

    log_errors(gl, "fixed");
    stage
}
