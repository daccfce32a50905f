//! Gravity-well grid: a dense plane displaced per vertex by the sun and earth.
//!
//! The vertex shader re-evaluates the softened inverse-square field every
//! frame from the uniform block, so moving a body only rewrites 96 bytes.
//! The fragment shader draws anti-aliased lines scaled by `fwidth` and fades
//! them with distance from a reference point (the spacecraft, or the origin
//! while no spacecraft exists).

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use orrery_field::{BodyId, FadeParameters, GravityField, MassSet};
use orrery_render::{DepthBuffer, MeshBuffer, ShaderLibrary, VertexPosition};
use wgpu::util::DeviceExt;

/// Upper bound on plane subdivisions; 4096² quads is already ~200 MB of
/// index data.
pub const MAX_SUBDIVISIONS: u32 = 4096;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("grid size must be positive, got {0}")]
    NonPositiveSize(f32),

    #[error("grid needs at least one subdivision")]
    ZeroSubdivisions,

    #[error("grid subdivisions {0} exceed the maximum of {MAX_SUBDIVISIONS}")]
    TooManySubdivisions(u32),

    #[error("line spacing must be positive, got {0}")]
    NonPositiveLineSpacing(f32),

    #[error("opacity must be within [0, 1], got {0}")]
    InvalidOpacity(f32),

    #[error("mass set has no {0:?}")]
    MissingBody(BodyId),
}

/// Flat square mesh on y = 0 centred at the origin.
#[derive(Clone, Debug)]
pub struct GridPlane {
    pub vertices: Vec<VertexPosition>,
    pub indices: Vec<u32>,
    size: f32,
    subdivisions: u32,
}

impl GridPlane {
    /// `(subdivisions + 1)²` vertices spaced `size / subdivisions` apart.
    pub fn new(size: f32, subdivisions: u32) -> Result<Self, GridError> {
        if !(size.is_finite() && size > 0.0) {
            return Err(GridError::NonPositiveSize(size));
        }
        if subdivisions == 0 {
            return Err(GridError::ZeroSubdivisions);
        }
        if subdivisions > MAX_SUBDIVISIONS {
            return Err(GridError::TooManySubdivisions(subdivisions));
        }

        let side = subdivisions + 1;
        let step = size / subdivisions as f32;
        let half = size * 0.5;

        let mut vertices = Vec::with_capacity((side * side) as usize);
        for row in 0..side {
            for col in 0..side {
                vertices.push(VertexPosition {
                    position: [col as f32 * step - half, 0.0, row as f32 * step - half],
                });
            }
        }

        let mut indices = Vec::with_capacity((subdivisions * subdivisions * 6) as usize);
        for row in 0..subdivisions {
            for col in 0..subdivisions {
                let i0 = row * side + col;
                let i1 = i0 + 1;
                let i2 = i0 + side;
                let i3 = i2 + 1;
                // Counter-clockwise seen from +Y.
                indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
            }
        }

        Ok(Self {
            vertices,
            indices,
            size,
            subdivisions,
        })
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn subdivisions(&self) -> u32 {
        self.subdivisions
    }
}

/// Uniform block read by both grid shader stages. Layout matches
/// `GravityGrid` in [`GRID_SHADER_SOURCE`].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GravityGridUniforms {
    pub sun_position: [f32; 4],
    pub earth_position: [f32; 4],
    /// Fade centre; the origin when there is no spacecraft.
    pub reference_position: [f32; 4],
    /// rgb plus overall opacity.
    pub color: [f32; 4],
    pub gravity: f32,
    pub sun_mass: f32,
    pub earth_mass: f32,
    pub falloff: f32,
    pub fade_start: f32,
    pub fade_end: f32,
    pub line_spacing: f32,
    pub _pad: f32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<GravityGridUniforms>(), 96);
static_assertions::const_assert_eq!(std::mem::size_of::<GravityGridUniforms>() % 16, 0);

/// Line appearance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridStyle {
    pub color: [f32; 3],
    pub opacity: f32,
    pub line_spacing: f32,
}

/// Host copy of the grid uniforms.
///
/// Field constants and masses are copied once at construction. Body
/// positions are not stored here: [`GridUniformState::sync_masses`] copies
/// them from the scene's [`MassSet`] every frame.
#[derive(Clone, Debug)]
pub struct GridUniformState {
    uniforms: GravityGridUniforms,
    fade: FadeParameters,
    reference: Option<Vec3>,
}

impl GridUniformState {
    /// `masses` must contain both [`BodyId::Sun`] and [`BodyId::Earth`].
    pub fn new(
        field: &GravityField,
        masses: &MassSet,
        fade: FadeParameters,
        style: GridStyle,
    ) -> Result<Self, GridError> {
        if !(style.line_spacing.is_finite() && style.line_spacing > 0.0) {
            return Err(GridError::NonPositiveLineSpacing(style.line_spacing));
        }
        if !(0.0..=1.0).contains(&style.opacity) {
            return Err(GridError::InvalidOpacity(style.opacity));
        }
        let sun = masses.get(BodyId::Sun).ok_or(GridError::MissingBody(BodyId::Sun))?;
        let earth = masses
            .get(BodyId::Earth)
            .ok_or(GridError::MissingBody(BodyId::Earth))?;

        let [r, g, b] = style.color;
        let uniforms = GravityGridUniforms {
            sun_position: sun.position.extend(1.0).to_array(),
            earth_position: earth.position.extend(1.0).to_array(),
            reference_position: [0.0, 0.0, 0.0, 1.0],
            color: [r, g, b, style.opacity],
            gravity: field.g(),
            sun_mass: sun.mass(),
            earth_mass: earth.mass(),
            falloff: field.falloff(),
            fade_start: fade.start(),
            fade_end: fade.end(),
            line_spacing: style.line_spacing,
            _pad: 0.0,
        };

        Ok(Self {
            uniforms,
            fade,
            reference: None,
        })
    }

    /// Copy the sun and earth positions out of `masses`. Bodies missing from
    /// the set keep their previous position.
    pub fn sync_masses(&mut self, masses: &MassSet) {
        if let Some(sun) = masses.get(BodyId::Sun) {
            self.uniforms.sun_position = sun.position.extend(1.0).to_array();
        }
        if let Some(earth) = masses.get(BodyId::Earth) {
            self.uniforms.earth_position = earth.position.extend(1.0).to_array();
        }
    }

    /// `None` means no spacecraft: the fade is centred on the origin.
    pub fn set_reference_position(&mut self, position: Option<Vec3>) {
        self.reference = position;
        self.uniforms.reference_position = position.unwrap_or(Vec3::ZERO).extend(1.0).to_array();
    }

    pub fn uniforms(&self) -> &GravityGridUniforms {
        &self.uniforms
    }

    pub fn reference_position(&self) -> Option<Vec3> {
        self.reference
    }

    /// Same fade factor the fragment shader applies at `point`.
    pub fn fade_at(&self, point: Vec3) -> f32 {
        self.fade.factor_at(self.reference, point)
    }
}

pub const GRID_SHADER_SOURCE: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

struct GravityGrid {
    sun_position: vec4<f32>,
    earth_position: vec4<f32>,
    reference_position: vec4<f32>,
    color: vec4<f32>,
    gravity: f32,
    sun_mass: f32,
    earth_mass: f32,
    falloff: f32,
    fade_start: f32,
    fade_end: f32,
    line_spacing: f32,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> grid: GravityGrid;

const DISTANCE_EPSILON: f32 = 1e-4;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
};

fn well(query: vec2<f32>, source: vec2<f32>, mass: f32) -> f32 {
    let d = distance(query, source) + DISTANCE_EPSILON;
    return grid.gravity * mass / (d * d + grid.falloff);
}

@vertex
fn vs_grid(@location(0) position: vec3<f32>) -> VertexOutput {
    let xz = position.xz;
    let dip = well(xz, grid.sun_position.xz, grid.sun_mass)
        + well(xz, grid.earth_position.xz, grid.earth_mass);
    let world = vec3<f32>(position.x, position.y - dip, position.z);

    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(world, 1.0);
    out.world_position = world;
    return out;
}

@fragment
fn fs_grid(in: VertexOutput) -> @location(0) vec4<f32> {
    let coord = in.world_position.xz / grid.line_spacing;
    let g = abs(fract(coord - 0.5) - 0.5) / fwidth(coord);
    let line = 1.0 - min(min(g.x, g.y), 1.0);

    let dist = distance(in.world_position.xz, grid.reference_position.xz);
    let fade = 1.0 - smoothstep(grid.fade_start, grid.fade_end, dist);

    let alpha = line * fade * grid.color.a;
    if alpha <= 0.001 {
        discard;
    }
    return vec4<f32>(grid.color.rgb, alpha);
}
"#;

/// Draws the grid with alpha blending after all opaque geometry. Depth is
/// tested so bodies occlude it but never written.
pub struct GravityGridRenderer {
    pipeline: wgpu::RenderPipeline,
    mesh: MeshBuffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl GravityGridRenderer {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        camera_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        plane: &GridPlane,
        state: &GridUniformState,
    ) -> Self {
        let shader = shaders.get_or_load(device, "gravity-grid", GRID_SHADER_SOURCE);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gravity-grid-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<GravityGridUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gravity-grid-pipeline-layout"),
            bind_group_layouts: &[camera_layout, &uniform_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gravity-grid-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_grid"),
                buffers: &[VertexPosition::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::transparent_state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_grid"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let mesh = MeshBuffer::new(device, "gravity-grid", &plane.vertices, &plane.indices);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gravity-grid-uniforms"),
            contents: bytemuck::bytes_of(state.uniforms()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gravity-grid-bind-group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::info!(
            "Gravity grid renderer initialized: {} vertices, {} triangles",
            plane.vertices.len(),
            plane.indices.len() / 3
        );

        Self {
            pipeline,
            mesh,
            uniform_buffer,
            uniform_bind_group,
        }
    }

    /// Upload this frame's body positions and reference point.
    pub fn update(&self, queue: &wgpu::Queue, uniforms: &GravityGridUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(1, &self.uniform_bind_group, &[]);
        self.mesh.draw(pass);
    }
}
