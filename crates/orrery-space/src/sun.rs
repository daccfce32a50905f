//! Sun: an emissive sphere with animated surface granulation.
//!
//! The sun is unlit. Colour comes from a few octaves of 3D value noise on the
//! sphere normal, scrolled by a time uniform, with limb darkening toward the
//! silhouette.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use orrery_render::{DepthBuffer, MeshBuffer, ShaderLibrary, VertexPositionNormal};
use wgpu::util::DeviceExt;

use crate::mesh::icosphere;

/// Photosphere base colour in linear RGB.
pub const SUN_COLOR: [f32; 3] = [1.0, 0.72, 0.28];

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SunUniforms {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 3],
    /// Seconds; drives the granulation scroll.
    pub time: f32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<SunUniforms>() % 16, 0);

impl SunUniforms {
    pub fn new(position: Vec3, radius: f32, time: f32) -> Self {
        let model = Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(radius));
        Self {
            model: model.to_cols_array_2d(),
            color: SUN_COLOR,
            time,
        }
    }
}

pub const SUN_SHADER_SOURCE: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

struct Sun {
    model: mat4x4<f32>,
    color: vec3<f32>,
    time: f32,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> sun: Sun;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_sun(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> VertexOutput {
    let world = sun.model * vec4<f32>(position, 1.0);
    var out: VertexOutput;
    out.clip_position = camera.view_proj * world;
    out.world_position = world.xyz;
    out.normal = normal;
    return out;
}

fn hash(p: vec3<f32>) -> f32 {
    let q = fract(p * 0.3183099 + vec3<f32>(0.1, 0.2, 0.3)) * 17.0;
    return fract(q.x * q.y * q.z * (q.x + q.y + q.z));
}

fn value_noise(p: vec3<f32>) -> f32 {
    let i = floor(p);
    let f = fract(p);
    let u = f * f * (3.0 - 2.0 * f);
    return mix(
        mix(
            mix(hash(i + vec3<f32>(0.0, 0.0, 0.0)), hash(i + vec3<f32>(1.0, 0.0, 0.0)), u.x),
            mix(hash(i + vec3<f32>(0.0, 1.0, 0.0)), hash(i + vec3<f32>(1.0, 1.0, 0.0)), u.x),
            u.y
        ),
        mix(
            mix(hash(i + vec3<f32>(0.0, 0.0, 1.0)), hash(i + vec3<f32>(1.0, 0.0, 1.0)), u.x),
            mix(hash(i + vec3<f32>(0.0, 1.0, 1.0)), hash(i + vec3<f32>(1.0, 1.0, 1.0)), u.x),
            u.y
        ),
        u.z
    );
}

fn granulation(p: vec3<f32>, time: f32) -> f32 {
    var sum = 0.0;
    var amplitude = 0.5;
    var frequency = 4.0;
    for (var octave = 0; octave < 4; octave = octave + 1) {
        sum = sum + amplitude * value_noise(p * frequency + vec3<f32>(time * 0.15, time * 0.07, 0.0));
        amplitude = amplitude * 0.5;
        frequency = frequency * 2.0;
    }
    return sum;
}

@fragment
fn fs_sun(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let view_dir = normalize(camera.camera_pos.xyz - in.world_position);
    let limb = pow(max(dot(n, view_dir), 0.0), 0.4);

    let cells = granulation(n, sun.time);
    let hot = sun.color * (0.75 + 0.6 * cells);
    let rim = sun.color * vec3<f32>(1.0, 0.55, 0.3);
    let color = mix(rim, hot, limb);
    return vec4<f32>(color, 1.0);
}
"#;

pub struct SunRenderer {
    pipeline: wgpu::RenderPipeline,
    mesh: MeshBuffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl SunRenderer {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        camera_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = shaders.get_or_load(device, "sun", SUN_SHADER_SOURCE);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sun-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<SunUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sun-pipeline-layout"),
            bind_group_layouts: &[camera_layout, &uniform_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sun-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_sun"),
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
                entry_point: Some("fs_sun"),
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

        let sphere = icosphere(4);
        let mesh = MeshBuffer::new(device, "sun", &sphere.vertices, &sphere.indices);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sun-uniforms"),
            contents: bytemuck::bytes_of(&SunUniforms::new(Vec3::ZERO, 1.0, 0.0)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sun-uniform-bg"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::info!("Sun renderer initialized");

        Self {
            pipeline,
            mesh,
            uniform_buffer,
            uniform_bind_group,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, uniforms: &SunUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(1, &self.uniform_bind_group, &[]);
        self.mesh.draw(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_scales_and_translates() {
        let u = SunUniforms::new(Vec3::new(10.0, 0.0, -5.0), 50.0, 3.0);
        let model = Mat4::from_cols_array_2d(&u.model);
        let surface = model.transform_point3(Vec3::X);
        assert!((surface - Vec3::new(60.0, 0.0, -5.0)).length() < 1e-4);
        assert_eq!(u.time, 3.0);
    }

    #[test]
    fn test_sun_colour_is_warm() {
        let u = SunUniforms::new(Vec3::ZERO, 1.0, 0.0);
        assert!(u.color[0] > u.color[1] && u.color[1] > u.color[2]);
    }

    #[test]
    fn test_uniforms_are_80_bytes() {
        assert_eq!(std::mem::size_of::<SunUniforms>(), 80);
    }

    #[test]
    fn test_sun_shader_validates() {
        let module = crate::validate_wgsl(SUN_SHADER_SOURCE).unwrap();
        let entry_points = crate::entry_point_names(&module);
        assert!(entry_points.contains(&(naga::ShaderStage::Vertex, "vs_sun")));
        assert!(entry_points.contains(&(naga::ShaderStage::Fragment, "fs_sun")));
    }
}
