//! Scene renderers: the gravity-well grid, the sun, and lit bodies, plus the
//! meshes they draw.

pub mod bodies;
pub mod grid;
pub mod mesh;
pub mod sun;

pub use bodies::{AMBIENT, BodyMaterial, BodyObject, BodyRenderer, BodyUniforms};
pub use grid::{
    GRID_SHADER_SOURCE, GravityGridRenderer, GravityGridUniforms, GridError, GridPlane, GridStyle,
    GridUniformState, MAX_SUBDIVISIONS,
};
pub use mesh::{MeshData, MeshError, icosphere};
pub use sun::{SUN_COLOR, SunRenderer, SunUniforms};

/// Parse and validate WGSL on the CPU, so shader tests do not need an
/// adapter.
#[cfg(test)]
pub(crate) fn validate_wgsl(source: &str) -> Result<naga::Module, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| format!("{e:?}"))?;
    Ok(module)
}

#[cfg(test)]
pub(crate) fn entry_point_names(module: &naga::Module) -> Vec<(naga::ShaderStage, &str)> {
    module
        .entry_points
        .iter()
        .map(|ep| (ep.stage, ep.name.as_str()))
        .collect()
}
