//! Lit meshes lit by a point light at the sun: earth, moon and the spacecraft.
//!
//! One pipeline is shared; every object owns a small uniform buffer with its
//! model matrix, colour and the light position.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use orrery_render::{DepthBuffer, MeshBuffer, ShaderLibrary, VertexPositionNormal};
use wgpu::util::DeviceExt;

use crate::mesh::MeshData;

/// Ambient term so the night side is not pure black.
pub const AMBIENT: f32 = 0.06;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BodyUniforms {
    pub model: [[f32; 4]; 4],
    /// rgb plus surface-pattern strength in `w` (0 = plain).
    pub color: [f32; 4],
    /// xyz light position, `w` ambient.
    pub light: [f32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<BodyUniforms>(), 96);

/// Surface appearance of one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyMaterial {
    pub color: [f32; 3],
    pub pattern: f32,
}

impl BodyMaterial {
    pub const EARTH: Self = Self {
        color: [0.16, 0.36, 0.78],
        pattern: 1.0,
    };
    pub const MOON: Self = Self {
        color: [0.62, 0.6, 0.58],
        pattern: 0.35,
    };
    pub const HULL: Self = Self {
        color: [0.82, 0.84, 0.88],
        pattern: 0.0,
    };
}

impl BodyUniforms {
    /// Uniform scale, then rotation, then translation.
    pub fn new(
        position: Vec3,
        rotation: Quat,
        scale: f32,
        material: BodyMaterial,
        light_position: Vec3,
    ) -> Self {
        let model = Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, position);
        let [r, g, b] = material.color;
        Self {
            model: model.to_cols_array_2d(),
            color: [r, g, b, material.pattern],
            light: light_position.extend(AMBIENT).to_array(),
        }
    }
}

pub const BODY_SHADER_SOURCE: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

struct Body {
    model: mat4x4<f32>,
    color: vec4<f32>,
    light: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> body: Body;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) local_normal: vec3<f32>,
};

@vertex
fn vs_body(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> VertexOutput {
    let world = body.model * vec4<f32>(position, 1.0);
    var out: VertexOutput;
    out.clip_position = camera.view_proj * world;
    out.world_position = world.xyz;
    // Uniform scale only, so the model matrix transforms normals directly.
    out.world_normal = (body.model * vec4<f32>(normal, 0.0)).xyz;
    out.local_normal = normal;
    return out;
}

// Banded pattern in object space so spin is visible.
fn surface_pattern(n: vec3<f32>) -> f32 {
    let a = sin(n.x * 5.3 + sin(n.y * 3.1) * 1.7);
    let b = sin(n.z * 4.7 + sin(n.x * 2.3) * 2.1);
    return smoothstep(0.1, 0.4, a * b);
}

@fragment
fn fs_body(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let to_light = normalize(body.light.xyz - in.world_position);
    let diffuse = max(dot(n, to_light), 0.0);

    let land = surface_pattern(normalize(in.local_normal)) * body.color.w;
    let albedo = mix(body.color.rgb, vec3<f32>(0.24, 0.42, 0.16), land);
    let lit = albedo * (body.light.w + diffuse * (1.0 - body.light.w));
    return vec4<f32>(lit, 1.0);
}
"#;

/// GPU state for one drawable body.
pub struct BodyObject {
    mesh: MeshBuffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl BodyObject {
    pub fn update(&self, queue: &wgpu::Queue, uniforms: &BodyUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }
}

pub struct BodyRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
}

impl BodyRenderer {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        camera_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = shaders.get_or_load(device, "body", BODY_SHADER_SOURCE);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("body-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<BodyUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("body-pipeline-layout"),
            bind_group_layouts: &[camera_layout, &uniform_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("body-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_body"),
                buffers: &[VertexPositionNormal::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::opaque_state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_body"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        log::info!("Body renderer initialized");

        Self {
            pipeline,
            uniform_layout,
        }
    }

    /// Upload `mesh` and allocate its uniform buffer.
    pub fn create_object(&self, device: &wgpu::Device, label: &str, mesh: &MeshData) -> BodyObject {
        let buffer = MeshBuffer::new(device, label, &mesh.vertices, &mesh.indices);
        let initial = BodyUniforms::new(Vec3::ZERO, Quat::IDENTITY, 1.0, BodyMaterial::HULL, Vec3::ZERO);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-uniforms")),
            contents: bytemuck::bytes_of(&initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-bind-group")),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        log::debug!("Created body '{label}' with {} triangles", mesh.triangle_count());

        BodyObject {
            mesh: buffer,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn render(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        camera_bind_group: &wgpu::BindGroup,
        objects: &[&BodyObject],
    ) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        for object in objects {
            pass.set_bind_group(1, &object.bind_group, &[]);
            object.mesh.draw(pass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_applies_scale_rotation_translation() {
        let u = BodyUniforms::new(
            Vec3::new(400.0, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            10.0,
            BodyMaterial::EARTH,
            Vec3::ZERO,
        );
        let model = Mat4::from_cols_array_2d(&u.model);
        // +X rotated a quarter turn about +Y points along -Z.
        let p = model.transform_point3(Vec3::X);
        assert!((p - Vec3::new(400.0, 0.0, -10.0)).length() < 1e-3);
    }

    #[test]
    fn test_material_and_light_packing() {
        let u = BodyUniforms::new(
            Vec3::ZERO,
            Quat::IDENTITY,
            1.0,
            BodyMaterial::MOON,
            Vec3::new(1.0, 2.0, 3.0),
        );
        assert_eq!(u.color[3], BodyMaterial::MOON.pattern);
        assert_eq!(u.light, [1.0, 2.0, 3.0, AMBIENT]);
    }

    #[test]
    fn test_hull_is_plain() {
        assert_eq!(BodyMaterial::HULL.pattern, 0.0);
    }

    #[test]
    fn test_body_shader_validates() {
        let module = crate::validate_wgsl(BODY_SHADER_SOURCE).unwrap();
        let entry_points = crate::entry_point_names(&module);
        assert!(entry_points.contains(&(naga::ShaderStage::Vertex, "vs_body")));
        assert!(entry_points.contains(&(naga::ShaderStage::Fragment, "fs_body")));
    }
}
