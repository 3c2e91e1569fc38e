//! Texture slots and texture unit management.

use std::fmt;

use crate::backend::{ClientArray, GlApi, GlCap};

/// Texture slots of a texturing property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureSlot {
    Base,
    Dark,
    Detail,
    Gloss,
    Glow,
    BumpMap,
    Decal0,
    Decal1,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 8] = [
        TextureSlot::Base,
        TextureSlot::Dark,
        TextureSlot::Detail,
        TextureSlot::Gloss,
        TextureSlot::Glow,
        TextureSlot::BumpMap,
        TextureSlot::Decal0,
        TextureSlot::Decal1,
    ];

    /// Slot number within the texturing property.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Identifier used in program files.
    pub fn name(self) -> &'static str {
        match self {
            TextureSlot::Base => "base",
            TextureSlot::Dark => "dark",
            TextureSlot::Detail => "detail",
            TextureSlot::Gloss => "gloss",
            TextureSlot::Glow => "glow",
            TextureSlot::BumpMap => "bumpmap",
            TextureSlot::Decal0 => "decal0",
            TextureSlot::Decal1 => "decal1",
        }
    }

    /// Look up a slot by identifier, ignoring case. The long form with a
    /// `texture` suffix (`basetexture`, `glowtexture`, ...) is accepted too.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        let short = name.strip_suffix("texture").unwrap_or(&name);
        Self::ALL.into_iter().find(|slot| slot.name() == short)
    }
}

impl fmt::Display for TextureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Companion normal map file for a base texture.
///
/// Everything from the first `_` on is replaced by `_n.dds`; without an
/// underscore `_n` goes in front of the extension. Returns `None` for an
/// empty name.
pub fn normal_map_name(base: &str) -> Option<String> {
    if base.is_empty() {
        return None;
    }
    if let Some(pos) = base.find('_') {
        return Some(format!("{}_n.dds", &base[..pos]));
    }
    let mut name = base.to_string();
    if let Some(pos) = base.rfind('.') {
        name.insert_str(pos, "_n");
    }
    Some(name)
}

/// Select `unit` for both texture state and texture coordinate arrays.
pub fn activate_texture_unit<G: GlApi + ?Sized>(gl: &mut G, unit: u32) -> bool {
    let available = gl.max_texture_units();
    if available <= 1 {
        return unit == 0;
    }
    if unit < available {
        gl.active_texture(unit);
        gl.client_active_texture(unit);
        true
    } else {
        log::warn!("texture unit {unit} requested but only {available} available");
        false
    }
}

/// Disable texturing on every unit, highest first, leaving unit 0 active.
pub fn reset_texture_units<G: GlApi + ?Sized>(gl: &mut G) {
    let available = gl.max_texture_units();
    if available <= 1 {
        gl.disable(GlCap::Texture2D);
        gl.reset_texture_matrix();
        gl.disable_client_state(ClientArray::TexCoord);
        return;
    }
    for unit in (0..available).rev() {
        gl.active_texture(unit);
        gl.disable(GlCap::Texture2D);
        gl.reset_texture_matrix();
        gl.client_active_texture(unit);
        gl.disable_client_state(ClientArray::TexCoord);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DummyGl, GlCall};

    #[test]
    fn test_slot_names() {
        assert_eq!(TextureSlot::from_name("glow"), Some(TextureSlot::Glow));
        assert_eq!(TextureSlot::from_name("BaseTexture"), Some(TextureSlot::Base));
        assert_eq!(TextureSlot::from_name("DECAL1"), Some(TextureSlot::Decal1));
        assert_eq!(TextureSlot::from_name("tangents"), None);
        assert_eq!(TextureSlot::from_name(""), None);
        for slot in TextureSlot::ALL {
            assert_eq!(TextureSlot::from_index(slot.index()), Some(slot));
        }
    }

    #[test]
    fn test_normal_map_name() {
        assert_eq!(normal_map_name("rock_01.dds").as_deref(), Some("rock_n.dds"));
        assert_eq!(normal_map_name("rock.dds").as_deref(), Some("rock_n.dds"));
        assert_eq!(
            normal_map_name("textures/wall.tga").as_deref(),
            Some("textures/wall_n.tga")
        );
        assert_eq!(normal_map_name("noext").as_deref(), Some("noext"));
        assert_eq!(normal_map_name(""), None);
    }

    #[test]
    fn test_activate_texture_unit() {
        let mut gl = DummyGl::new().with_max_texture_units(4);
        assert!(activate_texture_unit(&mut gl, 3));
        assert_eq!(gl.active_unit(), 3);
        assert!(!activate_texture_unit(&mut gl, 4));
        assert_eq!(
            gl.calls(),
            &[GlCall::ActiveTexture(3), GlCall::ClientActiveTexture(3)]
        );
    }

    #[test]
    fn test_single_unit_only_accepts_zero() {
        let mut gl = DummyGl::new().with_max_texture_units(1);
        assert!(activate_texture_unit(&mut gl, 0));
        assert!(!activate_texture_unit(&mut gl, 1));
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn test_reset_texture_units_descends() {
        let mut gl = DummyGl::new().with_max_texture_units(2);
        reset_texture_units(&mut gl);
        let units: Vec<u32> = gl
            .calls()
            .iter()
            .filter_map(|call| match call {
                GlCall::ActiveTexture(unit) => Some(*unit),
                _ => None,
            })
            .collect();
        assert_eq!(units, vec![1, 0]);
        assert_eq!(gl.active_unit(), 0);
    }
}
