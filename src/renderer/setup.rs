//! Per-program draw setup.

use crate::backend::{log_errors, ClientArray, GLint, GlApi, GlCap};
use crate::mesh::{Mesh, PropertyList, PropertyState, TexturingProperty};
use crate::model::SceneModel;
use crate::shader::{Program, TexCoordSource};
use crate::texture::{activate_texture_unit, normal_map_name, TextureSlot};

/// Sampler uniform fed with the base texture.
pub const BASE_MAP_UNIFORM: &str = "BaseMap";
/// Sampler uniform fed with the normal map derived from the base texture.
pub const NORMAL_MAP_UNIFORM: &str = "NormalMap";

/// Property state applied on the programmable path, in order. Vertex
/// colors and fixed texturing are left to the shaders.
const PROGRAM_STATES: [PropertyState; 5] = [
    PropertyState::Alpha,
    PropertyState::MaterialSpecular,
    PropertyState::ZBuffer,
    PropertyState::Stencil,
    PropertyState::Wireframe,
];

/// Try to draw `mesh` with `program`.
///
/// Returns `false` when the conditions don't match or a texture or
/// coordinate source is missing. State changed before the failure is left
/// as is; the next candidate overwrites it.
pub(crate) fn apply_program<G, M>(
    gl: &mut G,
    program: &Program,
    mesh: &M,
    blocks: &[<M::Model as SceneModel>::Index],
) -> bool
where
    G: GlApi + ?Sized,
    M: Mesh,
{
    let Some(model) = mesh.model() else {
        return false;
    };
    if mesh.index().is_none() || !program.conditions().eval(model, blocks) {
        return false;
    }

    gl.use_program(Some(program.handle()));

    let props = mesh.active_properties();
    let texturing = props.texturing();
    let mut texunit = 0;

    if let Some(location) = program.uniform_location(gl, BASE_MAP_UNIFORM) {
        let Some(tex) = texturing else {
            return false;
        };
        if !activate_texture_unit(gl, texunit) || !tex.bind(TextureSlot::Base) {
            return false;
        }
        gl.uniform_1i(location, texunit as GLint);
        texunit += 1;
    }

    if let Some(location) = program.uniform_location(gl, NORMAL_MAP_UNIFORM) {
        let Some(tex) = texturing else {
            return false;
        };
        let Some(file_name) = normal_map_name(&tex.file_name(TextureSlot::Base)) else {
            return false;
        };
        if !activate_texture_unit(gl, texunit) || !tex.bind_file(TextureSlot::Base, &file_name) {
            return false;
        }
        gl.uniform_1i(location, texunit as GLint);
    }

    for (&unit, source) in program.texcoords() {
        if !activate_texture_unit(gl, unit) || !bind_texcoords(gl, mesh, texturing, *source) {
            return false;
        }
    }

    gl.enable(GlCap::Lighting);
    for state in PROGRAM_STATES {
        props.apply(state);
    }

    log_errors(gl, "prog");
    true
}

/// Point the active unit's coordinate array at the data for `source`.
fn bind_texcoords<G, M>(
    gl: &mut G,
    mesh: &M,
    texturing: Option<&dyn TexturingProperty>,
    source: TexCoordSource,
) -> bool
where
    G: GlApi + ?Sized,
    M: Mesh,
{
    match source {
        TexCoordSource::Tangents => {
            let tangents = mesh.tangents();
            if tangents.is_empty() {
                return false;
            }
            gl.enable_client_state(ClientArray::TexCoord);
            gl.tex_coord_pointer(3, bytemuck::cast_slice(tangents));
            true
        }
        TexCoordSource::Slot(slot) => {
            let coords = texturing
                .and_then(|tex| tex.coord_set(slot))
                .and_then(|set| mesh.coords().get(set))
                .filter(|coords| !coords.is_empty());
            match coords {
                Some(coords) => {
                    gl.enable_client_state(ClientArray::TexCoord);
                    gl.tex_coord_pointer(2, bytemuck::cast_slice(coords.as_slice()));
                    true
                }
                None => false,
            }
        }
    }
}
