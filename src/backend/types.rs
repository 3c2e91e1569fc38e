//! OpenGL types and constants used by the renderer.
//!
//! Only the subset needed for shader objects (`GL_ARB_shader_objects`),
//! multitexturing and the `GL_ARB_texture_env_combine` fixed-function path.

#![allow(non_camel_case_types)]

pub type GLenum = u32;
pub type GLboolean = u8;
pub type GLint = i32;
pub type GLuint = u32;
pub type GLsizei = i32;
pub type GLfloat = f32;
pub type GLchar = std::os::raw::c_char;
pub type GLhandleARB = u32;

pub const GL_TRUE: GLint = 1;
pub const GL_NO_ERROR: GLenum = 0;
pub const GL_EXTENSIONS: GLenum = 0x1F03;
pub const GL_FLOAT: GLenum = 0x1406;

// Capabilities
pub const GL_LIGHTING: GLenum = 0x0B50;
pub const GL_NORMALIZE: GLenum = 0x0BA1;
pub const GL_TEXTURE_2D: GLenum = 0x0DE1;

// Client arrays
pub const GL_NORMAL_ARRAY: GLenum = 0x8075;
pub const GL_COLOR_ARRAY: GLenum = 0x8076;
pub const GL_TEXTURE_COORD_ARRAY: GLenum = 0x8078;

// Matrices and texture units
pub const GL_MODELVIEW: GLenum = 0x1700;
pub const GL_TEXTURE: GLenum = 0x1702;
pub const GL_TEXTURE0: GLenum = 0x84C0;
pub const GL_MAX_TEXTURE_UNITS: GLenum = 0x84E2;

// Texture environment
pub const GL_TEXTURE_ENV: GLenum = 0x2300;
pub const GL_TEXTURE_ENV_MODE: GLenum = 0x2200;
pub const GL_ADD: GLenum = 0x0104;
pub const GL_REPLACE: GLenum = 0x1E01;
pub const GL_MODULATE: GLenum = 0x2100;
pub const GL_SRC_COLOR: GLenum = 0x0300;
pub const GL_SRC_ALPHA: GLenum = 0x0302;
pub const GL_COMBINE_ARB: GLenum = 0x8570;
pub const GL_COMBINE_RGB_ARB: GLenum = 0x8571;
pub const GL_COMBINE_ALPHA_ARB: GLenum = 0x8572;
pub const GL_RGB_SCALE_ARB: GLenum = 0x8573;
pub const GL_INTERPOLATE_ARB: GLenum = 0x8575;
pub const GL_PREVIOUS_ARB: GLenum = 0x8578;
pub const GL_SOURCE0_RGB_ARB: GLenum = 0x8580;
pub const GL_SOURCE1_RGB_ARB: GLenum = 0x8581;
pub const GL_SOURCE2_RGB_ARB: GLenum = 0x8582;
pub const GL_SOURCE0_ALPHA_ARB: GLenum = 0x8588;
pub const GL_SOURCE1_ALPHA_ARB: GLenum = 0x8589;
pub const GL_OPERAND0_RGB_ARB: GLenum = 0x8590;
pub const GL_OPERAND1_RGB_ARB: GLenum = 0x8591;
pub const GL_OPERAND2_RGB_ARB: GLenum = 0x8592;
pub const GL_OPERAND0_ALPHA_ARB: GLenum = 0x8598;
pub const GL_OPERAND1_ALPHA_ARB: GLenum = 0x8599;

// Shader objects
pub const GL_FRAGMENT_SHADER_ARB: GLenum = 0x8B30;
pub const GL_VERTEX_SHADER_ARB: GLenum = 0x8B31;
pub const GL_OBJECT_COMPILE_STATUS_ARB: GLenum = 0x8B81;
pub const GL_OBJECT_LINK_STATUS_ARB: GLenum = 0x8B82;
pub const GL_OBJECT_INFO_LOG_LENGTH_ARB: GLenum = 0x8B84;

/// Server-side capability toggled with `glEnable`/`glDisable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlCap {
    Lighting,
    Normalize,
    Texture2D,
}

impl GlCap {
    pub fn to_gl(self) -> GLenum {
        match self {
            GlCap::Lighting => GL_LIGHTING,
            GlCap::Normalize => GL_NORMALIZE,
            GlCap::Texture2D => GL_TEXTURE_2D,
        }
    }
}

/// Client-side vertex array toggled with `glEnableClientState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientArray {
    Normal,
    Color,
    TexCoord,
}

impl ClientArray {
    pub fn to_gl(self) -> GLenum {
        match self {
            ClientArray::Normal => GL_NORMAL_ARRAY,
            ClientArray::Color => GL_COLOR_ARRAY,
            ClientArray::TexCoord => GL_TEXTURE_COORD_ARRAY,
        }
    }
}

/// Native shader object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub GLhandleARB);

/// Native program object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub GLhandleARB);
