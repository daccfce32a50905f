//! Scene coordinator.
//!
//! [`SceneContext`] owns everything that changes per frame: orbital
//! kinematics, the mass set feeding the gravity grid, the optional
//! spacecraft and the camera. Each [`tick`](SceneContext::tick) derives body
//! positions in closed form from elapsed time and returns an immutable
//! [`FrameState`] for the renderer.

use glam::{Quat, Vec2, Vec3};
use orrery_config::Config;
use orrery_field::{BodyId, FadeParameters, FieldError, GravityField, MassSet, PointMass};
use orrery_input::KeyboardState;
use orrery_orbit::{CircularOrbit, OrbitError, SpinningBody, TidallyLocked};
use orrery_render::Camera;
use orrery_space::{GravityGridUniforms, GridError, GridPlane, GridStyle, GridUniformState};
use tracing::info;

use crate::assets::SpacecraftModel;
use crate::ship::{ChaseCamera, ShipConfig, ShipState, update_ship};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("invalid orbit: {0}")]
    Orbit(#[from] OrbitError),

    #[error("invalid gravity field: {0}")]
    Field(#[from] FieldError),

    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),
}

/// Placement of one rendered body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyTransform {
    pub position: Vec3,
    pub rotation: Quat,
    /// Uniform scale (the body radius for unit-sphere meshes).
    pub scale: f32,
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Debug)]
pub struct FrameState {
    pub elapsed: f64,
    pub sun: BodyTransform,
    pub earth: BodyTransform,
    pub moon: BodyTransform,
    pub spacecraft: Option<BodyTransform>,
    pub grid: GravityGridUniforms,
    pub camera: Camera,
    /// Seconds driving the sun's surface animation.
    pub sun_time: f32,
}

struct Spacecraft {
    state: ShipState,
    config: ShipConfig,
}

pub struct SceneContext {
    elapsed: f64,
    sun_position: Vec3,
    earth_orbit: CircularOrbit,
    moon: TidallyLocked,
    earth_spin: SpinningBody,
    radii: [f32; 3],
    field: GravityField,
    masses: MassSet,
    grid: GridUniformState,
    grid_plane: GridPlane,
    spawn_position: Vec3,
    spacecraft: Option<Spacecraft>,
    chase: ChaseCamera,
    camera: Camera,
}

impl SceneContext {
    /// Build the scene from configuration. Every invalid constant is
    /// reported here, before any window or GPU work.
    pub fn new(config: &Config) -> Result<Self, SceneError> {
        let orbit = &config.orbit;
        let gravity = &config.gravity;
        let grid = &config.grid;

        let sun_position = Vec3::ZERO;
        let earth_orbit = CircularOrbit::new(
            orbit.g_orbit,
            f64::from(gravity.sun_mass),
            orbit.earth_orbit_radius,
            orbit.orbit_height,
        )?;
        let moon = TidallyLocked::new(CircularOrbit::new(
            orbit.g_orbit,
            f64::from(gravity.earth_mass),
            orbit.moon_orbit_radius,
            0.0,
        )?);

        let field = GravityField::new(gravity.g, gravity.falloff)?;
        let fade = FadeParameters::new(grid.fade_start, grid.fade_end)?;

        let mut masses = MassSet::new();
        masses.insert(BodyId::Sun, PointMass::new(sun_position, gravity.sun_mass)?);
        masses.insert(BodyId::Earth, PointMass::new(Vec3::ZERO, gravity.earth_mass)?);

        let grid_state = GridUniformState::new(
            &field,
            &masses,
            fade,
            GridStyle {
                color: grid.color,
                opacity: grid.opacity,
                line_spacing: grid.line_spacing,
            },
        )?;
        let grid_plane = GridPlane::new(grid.size, grid.subdivisions)?;

        info!(
            "Scene built: earth period {:.1}s, moon period {:.1}s, grid {}x{}",
            earth_orbit.period(),
            moon.orbit().period(),
            grid.subdivisions,
            grid.subdivisions
        );

        let mut camera = Camera::new(
            config.render.fov_y_degrees,
            config.window.width as f32 / config.window.height.max(1) as f32,
            config.render.near,
            config.render.far,
        );
        let chase = ChaseCamera::new(
            config.spacecraft.chase_distance,
            config.spacecraft.chase_height,
        );
        chase.place(&mut camera, None);

        Ok(Self {
            elapsed: 0.0,
            sun_position,
            earth_orbit,
            moon,
            earth_spin: SpinningBody::new(orbit.earth_spin_rate),
            radii: [orbit.sun_radius, orbit.earth_radius, orbit.moon_radius],
            field,
            masses,
            grid: grid_state,
            grid_plane,
            spawn_position: Vec3::from_array(config.spacecraft.spawn_position),
            spacecraft: None,
            chase,
            camera,
        })
    }

    /// Advance to `elapsed` seconds. `dt` only drives the spacecraft
    /// integrator; everything orbital is a function of `elapsed` alone.
    pub fn tick(&mut self, elapsed: f64, dt: f64, keyboard: &KeyboardState) -> FrameState {
        self.elapsed = elapsed;

        let earth = self.sun_position.as_dvec3() + self.earth_orbit.position_at(elapsed);
        let moon = self.moon.world_position(earth, elapsed);
        let earth_position = earth.as_vec3();

        self.masses.set_position(BodyId::Sun, self.sun_position);
        self.masses.set_position(BodyId::Earth, earth_position);
        self.grid.sync_masses(&self.masses);

        let reference = match &mut self.spacecraft {
            Some(craft) => {
                update_ship(&mut craft.state, &craft.config, dt as f32, keyboard);
                Some(craft.state.position)
            }
            None => None,
        };
        self.grid.set_reference_position(reference);

        self.chase
            .place(&mut self.camera, self.spacecraft.as_ref().map(|c| &c.state));

        let [sun_radius, earth_radius, moon_radius] = self.radii;
        FrameState {
            elapsed,
            sun: BodyTransform {
                position: self.sun_position,
                rotation: Quat::IDENTITY,
                scale: sun_radius,
            },
            earth: BodyTransform {
                position: earth_position,
                rotation: self.earth_spin.spin_rotation(elapsed).as_quat(),
                scale: earth_radius,
            },
            moon: BodyTransform {
                position: moon.as_vec3(),
                rotation: self.moon.spin_rotation(elapsed).as_quat(),
                scale: moon_radius,
            },
            spacecraft: self.spacecraft.as_ref().map(|c| BodyTransform {
                position: c.state.position,
                rotation: c.state.orientation,
                scale: 1.0,
            }),
            grid: *self.grid.uniforms(),
            camera: self.camera.clone(),
            sun_time: elapsed as f32,
        }
    }

    /// Join the loaded spacecraft. It appears at the configured spawn point
    /// on the next tick.
    pub fn attach_spacecraft(&mut self, model: &SpacecraftModel) {
        info!(
            "Spacecraft attached ({} triangles) at {:?}",
            model.mesh.triangle_count(),
            self.spawn_position
        );
        self.spacecraft = Some(Spacecraft {
            state: ShipState::new(self.spawn_position),
            config: ShipConfig::default(),
        });
    }

    pub fn has_spacecraft(&self) -> bool {
        self.spacecraft.is_some()
    }

    pub fn spacecraft(&self) -> Option<&ShipState> {
        self.spacecraft.as_ref().map(|c| &c.state)
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_ratio(width as f32, height as f32);
    }

    pub fn field(&self) -> &GravityField {
        &self.field
    }

    /// Current point masses in insertion order.
    pub fn mass_snapshot(&self) -> Vec<PointMass> {
        self.masses.iter().copied().collect()
    }

    pub fn grid_state(&self) -> &GridUniformState {
        &self.grid
    }

    pub fn grid_plane(&self) -> &GridPlane {
        &self.grid_plane
    }

    /// Grid dip under `query_xz` for the current mass positions.
    pub fn displacement_at(&self, query_xz: Vec2) -> f32 {
        self.field.displacement(query_xz, self.masses.iter())
    }
}
