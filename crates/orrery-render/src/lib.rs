//! wgpu plumbing: device and surface setup, camera, reverse-Z depth, frame
//! encoding, shader cache and mesh buffers.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod shader;
pub mod surface;

pub use buffer::{MeshBuffer, VertexPosition, VertexPositionNormal};
pub use camera::{Camera, CameraBinding, CameraUniform};
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, RenderPassBuilder, SPACE_BLACK, clear_color_from_rgb};
pub use shader::{ShaderError, ShaderLibrary};
pub use surface::{PhysicalSize, SurfaceResizeEvent, SurfaceWrapper};
