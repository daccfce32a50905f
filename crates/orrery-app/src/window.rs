//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]. Every
//! `RedrawRequested` polls the asset loader, runs one scene tick, uploads the
//! frame's uniforms and draws sun, bodies, spacecraft and grid in a single
//! pass. Resizes are applied between ticks.

use std::sync::Arc;

use orrery_config::Config;
use orrery_input::{KeyCode, KeyboardState};
use orrery_render::{
    CameraBinding, DepthBuffer, FrameEncoder, RenderContext, RenderPassBuilder, ShaderLibrary,
    SurfaceError, SurfaceResizeEvent, SurfaceWrapper, clear_color_from_rgb,
    init_render_context_blocking,
};
use orrery_space::{
    BodyMaterial, BodyObject, BodyRenderer, BodyUniforms, GravityGridRenderer, MeshData,
    SunRenderer, SunUniforms, icosphere,
};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::assets::SpacecraftLoader;
use crate::clock::FrameClock;
use crate::scene::{FrameState, SceneContext, SceneError};

/// Subdivisions of the earth and moon spheres.
const BODY_SPHERE_SUBDIVISIONS: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attributes = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attributes
    }
}

fn should_log_frame(frame_count: u64, interval: u64) -> bool {
    interval > 0 && frame_count.is_multiple_of(interval)
}

/// GPU resources for everything drawn in the scene pass.
struct SceneRenderers {
    camera: CameraBinding,
    depth: DepthBuffer,
    sun: SunRenderer,
    bodies: BodyRenderer,
    earth: BodyObject,
    moon: BodyObject,
    hull: Option<BodyObject>,
    grid: GravityGridRenderer,
}

impl SceneRenderers {
    fn new(gpu: &RenderContext, scene: &SceneContext, width: u32, height: u32) -> Self {
        let device = &gpu.device;
        let format = gpu.surface_format;
        let mut shaders = ShaderLibrary::new();

        let camera = CameraBinding::new(device);
        let depth = DepthBuffer::new(device, width, height);
        let sun = SunRenderer::new(device, &mut shaders, &camera.layout, format);
        let bodies = BodyRenderer::new(device, &mut shaders, &camera.layout, format);

        let sphere = icosphere(BODY_SPHERE_SUBDIVISIONS);
        let earth = bodies.create_object(device, "earth", &sphere);
        let moon = bodies.create_object(device, "moon", &sphere);

        let grid = GravityGridRenderer::new(
            device,
            &mut shaders,
            &camera.layout,
            format,
            scene.grid_plane(),
            scene.grid_state(),
        );

        info!("Scene renderers ready ({} shader modules)", shaders.len());

        Self {
            camera,
            depth,
            sun,
            bodies,
            earth,
            moon,
            hull: None,
            grid,
        }
    }

    fn upload(&self, queue: &wgpu::Queue, frame: &FrameState) {
        let light = frame.sun.position;

        self.camera.update(queue, &frame.camera);
        self.sun.update(
            queue,
            &SunUniforms::new(frame.sun.position, frame.sun.scale, frame.sun_time),
        );
        for (object, body, material) in [
            (&self.earth, &frame.earth, BodyMaterial::EARTH),
            (&self.moon, &frame.moon, BodyMaterial::MOON),
        ] {
            object.update(
                queue,
                &BodyUniforms::new(body.position, body.rotation, body.scale, material, light),
            );
        }
        if let (Some(hull), Some(craft)) = (&self.hull, &frame.spacecraft) {
            hull.update(
                queue,
                &BodyUniforms::new(
                    craft.position,
                    craft.rotation,
                    craft.scale,
                    BodyMaterial::HULL,
                    light,
                ),
            );
        }
        self.grid.update(queue, &frame.grid);
    }

    /// Opaque geometry first; the grid blends over it last.
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let camera = &self.camera.bind_group;
        self.sun.render(pass, camera);

        let mut bodies = vec![&self.earth, &self.moon];
        if let Some(hull) = &self.hull {
            bodies.push(hull);
        }
        self.bodies.render(pass, camera, &bodies);

        self.grid.render(pass, camera);
    }
}

fn draw_frame(
    gpu: &RenderContext,
    renderers: &SceneRenderers,
    frame: &FrameState,
    clear_color: wgpu::Color,
) -> Result<(), SurfaceError> {
    renderers.upload(&gpu.queue, frame);

    let surface_texture = gpu.get_current_texture()?;
    let mut frame_encoder = FrameEncoder::new(&gpu.device, Arc::clone(&gpu.queue), surface_texture);
    let builder = RenderPassBuilder::new()
        .clear_color(clear_color)
        .depth(&renderers.depth.view)
        .label("scene-pass");
    if let Some(mut pass) = frame_encoder.begin_render_pass(&builder) {
        renderers.draw(&mut pass);
    }
    frame_encoder.submit();
    Ok(())
}

/// Application state: window, GPU context, renderers and the scene.
pub struct AppState {
    config: Config,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    renderers: Option<SceneRenderers>,
    surface: SurfaceWrapper,
    scene: SceneContext,
    clock: FrameClock,
    keyboard: KeyboardState,
    loader: Option<SpacecraftLoader>,
    /// Hull mesh waiting for the GPU to exist.
    pending_hull: Option<MeshData>,
    clear_color: wgpu::Color,
}

impl AppState {
    /// Builds the scene immediately so configuration errors surface before a
    /// window opens, and starts loading the spacecraft in the background.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let scene = SceneContext::new(&config)?;

        let loader = match SpacecraftLoader::spawn(config.spacecraft.hull_path.clone()) {
            Ok(loader) => Some(loader),
            Err(e) => {
                error!("Spacecraft disabled: {e}");
                None
            }
        };

        Ok(Self {
            surface: SurfaceWrapper::new(config.window.width, config.window.height, 1.0),
            clear_color: clear_color_from_rgb(config.render.clear_color),
            config,
            window: None,
            gpu: None,
            renderers: None,
            scene,
            clock: FrameClock::new(),
            keyboard: KeyboardState::new(),
            loader,
            pending_hull: None,
        })
    }

    pub fn scene(&self) -> &SceneContext {
        &self.scene
    }

    /// Join the spacecraft once its loader reports. Failures leave the scene
    /// without one.
    fn poll_assets(&mut self) {
        let Some(loader) = &mut self.loader else {
            return;
        };
        let Some(result) = loader.poll() else {
            return;
        };
        self.loader = None;

        match result {
            Ok(model) => {
                self.scene.attach_spacecraft(&model);
                self.pending_hull = Some(model.mesh);
            }
            Err(e) => error!("Spacecraft unavailable: {e}"),
        }
    }

    fn upload_pending_hull(&mut self) {
        if let (Some(gpu), Some(renderers)) = (&self.gpu, &mut self.renderers)
            && let Some(mesh) = self.pending_hull.take()
        {
            renderers.hull = Some(renderers.bodies.create_object(&gpu.device, "spacecraft", &mesh));
        }
    }

    fn apply_resize(&mut self, resize: SurfaceResizeEvent) {
        let width = resize.physical.width;
        let height = resize.physical.height;

        self.scene.set_aspect_ratio(width, height);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
        }
        if let (Some(gpu), Some(renderers)) = (&self.gpu, &mut self.renderers) {
            renderers.depth.resize(&gpu.device, width, height);
        }

        info!(
            "Window resized to {}x{} (scale: {:.2})",
            width, height, resize.scale_factor
        );
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.poll_assets();

        let time = self.clock.tick();
        let frame = self.scene.tick(time.elapsed, time.dt, &self.keyboard);
        self.keyboard.end_frame();
        self.upload_pending_hull();

        if should_log_frame(self.clock.frame_count(), self.config.debug.frame_log_interval) {
            info!(
                "Frame {}: t={:.1}s earth=({:.1}, {:.1}) spacecraft={}",
                self.clock.frame_count(),
                frame.elapsed,
                frame.earth.position.x,
                frame.earth.position.z,
                frame.spacecraft.is_some()
            );
        }

        if !self.surface.is_configured() {
            debug!("Surface has no size yet, skipping draw");
        } else {
            let result = match (&self.gpu, &self.renderers) {
                (Some(gpu), Some(renderers)) => {
                    draw_frame(gpu, renderers, &frame, self.clear_color)
                }
                _ => Ok(()),
            };
            match result {
                Ok(()) => {}
                Err(SurfaceError::Lost) => {
                    let size = self.surface.physical_size();
                    if let Some(gpu) = &mut self.gpu {
                        gpu.resize(size.width, size.height);
                    }
                }
                Err(SurfaceError::OutOfMemory) => {
                    error!("GPU out of memory");
                    event_loop.exit();
                    return;
                }
                Err(SurfaceError::Timeout) => {
                    warn!("Surface timeout, skipping frame");
                }
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let inner_size = window.inner_size();
        self.surface = SurfaceWrapper::new(inner_size.width, inner_size.height, window.scale_factor());
        let physical = self.surface.physical_size();
        self.scene.set_aspect_ratio(physical.width, physical.height);
        info!(
            "Surface wrapper initialized: {}x{} (scale: {:.2})",
            physical.width,
            physical.height,
            self.surface.scale_factor()
        );

        match init_render_context_blocking(Arc::clone(&window), self.config.window.vsync) {
            Ok(gpu) => {
                self.renderers = Some(SceneRenderers::new(
                    &gpu,
                    &self.scene,
                    physical.width,
                    physical.height,
                ));
                self.gpu = Some(gpu);
            }
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(resize) = self.surface.handle_resize(new_size.width, new_size.height) {
                    self.apply_resize(resize);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let Some(window) = &self.window else {
                    return;
                };
                let inner = window.inner_size();
                if let Some(resize) =
                    self.surface
                        .handle_scale_factor_changed(scale_factor, inner.width, inner.height)
                {
                    self.apply_resize(resize);
                }
            }
            WindowEvent::Focused(false) => {
                // Release events for keys held while unfocused never arrive.
                self.keyboard.release_all();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.process_event(&event);
                if self.keyboard.just_pressed(KeyCode::Escape) {
                    info!("Escape pressed, shutting down");
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Creates an event loop and runs the application until the window closes.
#[instrument(skip(config))]
pub fn run(config: Config) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config)?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
