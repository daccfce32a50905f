//! Player spacecraft: a damped thrust model and the chase camera.
//!
//! The ship flies in the scene's units. Thrust is applied in the ship's
//! local frame: W/S along the nose, R/F vertically, A/D yaw about world +Y.
//! Shift multiplies thrust. Velocity persists between ticks and decays
//! through linear damping.

use glam::{Quat, Vec3};
use orrery_input::{KeyCode, KeyboardState};
use orrery_render::Camera;

/// Where the camera sits while no spacecraft exists.
pub const OVERVIEW_POSITION: Vec3 = Vec3::new(0.0, 650.0, 950.0);

#[derive(Debug, Clone, PartialEq)]
pub struct ShipConfig {
    /// Thrust force in scene units.
    pub thrust: f32,
    /// Thrust multiplier while Shift is held.
    pub boost_multiplier: f32,
    /// Applied as `velocity *= 1 - damping * dt` each tick.
    pub linear_damping: f32,
    pub mass: f32,
    /// Yaw rate in radians per second.
    pub turn_rate: f32,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            thrust: 60.0,
            boost_multiplier: 4.0,
            linear_damping: 0.6,
            mass: 1.0,
            turn_rate: 1.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShipState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
}

impl ShipState {
    /// A stationary ship with its nose along -Z.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Nose direction (local -Z).
    pub fn forward(&self) -> Vec3 {
        self.orientation * -Vec3::Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }
}

fn boosting(keyboard: &KeyboardState) -> bool {
    keyboard.is_held(KeyCode::ShiftLeft) || keyboard.is_held(KeyCode::ShiftRight)
}

/// Advance the ship by `dt` seconds. Non-positive or non-finite steps are
/// ignored.
pub fn update_ship(ship: &mut ShipState, config: &ShipConfig, dt: f32, keyboard: &KeyboardState) {
    if !(dt.is_finite() && dt > 0.0) {
        return;
    }

    // Yaw about world up so the ship never rolls.
    let yaw = keyboard.axis(KeyCode::KeyD, KeyCode::KeyA) * config.turn_rate * dt;
    if yaw != 0.0 {
        ship.orientation = (Quat::from_rotation_y(yaw) * ship.orientation).normalize();
    }

    let mut thrust_local = Vec3::new(
        0.0,
        keyboard.axis(KeyCode::KeyF, KeyCode::KeyR),
        -keyboard.axis(KeyCode::KeyS, KeyCode::KeyW),
    );
    // Diagonal thrust is no stronger than straight thrust.
    thrust_local = thrust_local.normalize_or_zero();

    let magnitude = if boosting(keyboard) {
        config.thrust * config.boost_multiplier
    } else {
        config.thrust
    };

    let acceleration = ship.orientation * (thrust_local * magnitude) / config.mass;
    ship.velocity += acceleration * dt;
    ship.velocity *= (1.0 - config.linear_damping * dt).max(0.0);
    ship.position += ship.velocity * dt;
}

/// Camera rig that trails the ship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseCamera {
    pub distance: f32,
    pub height: f32,
}

impl ChaseCamera {
    pub fn new(distance: f32, height: f32) -> Self {
        Self { distance, height }
    }

    /// Eye and target for the current frame.
    ///
    /// Behind and above the ship, looking at it. The offset uses the nose
    /// direction projected onto the horizontal plane so climbing does not
    /// swing the camera under the hull. With no ship, an overview of the
    /// whole system centred on the origin.
    pub fn eye_and_target(&self, ship: Option<&ShipState>) -> (Vec3, Vec3) {
        match ship {
            Some(ship) => {
                let flat = Vec3::new(ship.forward().x, 0.0, ship.forward().z);
                let back = -flat.try_normalize().unwrap_or(-Vec3::Z);
                let eye = ship.position + back * self.distance + Vec3::Y * self.height;
                (eye, ship.position)
            }
            None => (OVERVIEW_POSITION, Vec3::ZERO),
        }
    }

    pub fn place(&self, camera: &mut Camera, ship: Option<&ShipState>) {
        let (eye, target) = self.eye_and_target(ship);
        camera.look_at(eye, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_input::RawKeyEvent;
    use winit::event::ElementState;

    const DT: f32 = 1.0 / 60.0;

    fn holding(keys: &[KeyCode]) -> KeyboardState {
        let mut kb = KeyboardState::new();
        for &key in keys {
            kb.process_raw(RawKeyEvent {
                key,
                state: ElementState::Pressed,
                repeat: false,
            });
        }
        kb
    }

    fn undamped() -> ShipConfig {
        ShipConfig {
            linear_damping: 0.0,
            ..ShipConfig::default()
        }
    }

    #[test]
    fn test_ship_starts_stationary() {
        let ship = ShipState::new(Vec3::new(0.0, 60.0, 600.0));
        assert_eq!(ship.speed(), 0.0);
        assert!((ship.forward() - -Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_no_input_keeps_velocity_without_damping() {
        let mut ship = ShipState::new(Vec3::ZERO);
        ship.velocity = Vec3::new(10.0, 0.0, 0.0);
        update_ship(&mut ship, &undamped(), DT, &KeyboardState::new());
        assert!((ship.speed() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_forward_thrust_moves_along_nose() {
        let kb = holding(&[KeyCode::KeyW]);
        let mut ship = ShipState::new(Vec3::ZERO);
        for _ in 0..60 {
            update_ship(&mut ship, &undamped(), DT, &kb);
        }
        assert!(ship.speed() > 0.0);
        assert!(ship.velocity.normalize().dot(ship.forward()) > 0.99);
        assert!(ship.position.z < 0.0);
    }

    #[test]
    fn test_reverse_thrust() {
        let kb = holding(&[KeyCode::KeyS]);
        let mut ship = ShipState::new(Vec3::ZERO);
        update_ship(&mut ship, &undamped(), DT, &kb);
        assert!(ship.velocity.z > 0.0);
    }

    #[test]
    fn test_vertical_thrust() {
        let mut ship = ShipState::new(Vec3::ZERO);
        update_ship(&mut ship, &undamped(), DT, &holding(&[KeyCode::KeyR]));
        assert!(ship.velocity.y > 0.0);

        let mut ship = ShipState::new(Vec3::ZERO);
        update_ship(&mut ship, &undamped(), DT, &holding(&[KeyCode::KeyF]));
        assert!(ship.velocity.y < 0.0);
    }

    #[test]
    fn test_yaw_left_turns_nose_toward_minus_x() {
        let kb = holding(&[KeyCode::KeyA]);
        let mut ship = ShipState::new(Vec3::ZERO);
        for _ in 0..30 {
            update_ship(&mut ship, &undamped(), DT, &kb);
        }
        assert!(ship.forward().x < 0.0);
        // Yaw only: the nose stays level and no thrust was applied.
        assert!(ship.forward().y.abs() < 1e-5);
        assert_eq!(ship.speed(), 0.0);
    }

    #[test]
    fn test_boost_multiplies_thrust() {
        let config = undamped();
        let mut normal = ShipState::new(Vec3::ZERO);
        let mut boosted = ShipState::new(Vec3::ZERO);
        update_ship(&mut normal, &config, DT, &holding(&[KeyCode::KeyW]));
        update_ship(
            &mut boosted,
            &config,
            DT,
            &holding(&[KeyCode::KeyW, KeyCode::ShiftLeft]),
        );
        let ratio = boosted.speed() / normal.speed();
        assert!((ratio - config.boost_multiplier).abs() < 1e-3);
    }

    #[test]
    fn test_diagonal_thrust_is_normalized() {
        let config = undamped();
        let mut straight = ShipState::new(Vec3::ZERO);
        let mut diagonal = ShipState::new(Vec3::ZERO);
        update_ship(&mut straight, &config, DT, &holding(&[KeyCode::KeyW]));
        update_ship(
            &mut diagonal,
            &config,
            DT,
            &holding(&[KeyCode::KeyW, KeyCode::KeyR]),
        );
        assert!((straight.speed() - diagonal.speed()).abs() < 1e-5);
    }

    #[test]
    fn test_damping_slows_ship() {
        let config = ShipConfig {
            linear_damping: 1.0,
            ..ShipConfig::default()
        };
        let mut ship = ShipState::new(Vec3::ZERO);
        ship.velocity = Vec3::new(100.0, 0.0, 0.0);
        for _ in 0..600 {
            update_ship(&mut ship, &config, DT, &KeyboardState::new());
        }
        assert!(ship.speed() < 1.0, "speed {}", ship.speed());
    }

    #[test]
    fn test_position_integrates_velocity() {
        let mut ship = ShipState::new(Vec3::ZERO);
        ship.velocity = Vec3::new(60.0, 0.0, 0.0);
        for _ in 0..60 {
            update_ship(&mut ship, &undamped(), DT, &KeyboardState::new());
        }
        assert!((ship.position.x - 60.0).abs() < 0.01);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let kb = holding(&[KeyCode::KeyW]);
        for dt in [0.0, -1.0, f32::NAN] {
            let mut ship = ShipState::new(Vec3::ZERO);
            update_ship(&mut ship, &undamped(), dt, &kb);
            assert_eq!(ship, ShipState::new(Vec3::ZERO));
        }
    }

    #[test]
    fn test_chase_camera_sits_behind_and_above() {
        let rig = ChaseCamera::new(30.0, 8.0);
        let ship = ShipState::new(Vec3::new(0.0, 60.0, 600.0));
        let (eye, target) = rig.eye_and_target(Some(&ship));
        assert_eq!(target, ship.position);
        // Nose is -Z, so behind is +Z.
        assert!((eye - Vec3::new(0.0, 68.0, 630.0)).length() < 1e-4);
    }

    #[test]
    fn test_chase_camera_follows_yaw() {
        let rig = ChaseCamera::new(30.0, 0.0);
        let mut ship = ShipState::new(Vec3::ZERO);
        ship.orientation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let (eye, _) = rig.eye_and_target(Some(&ship));
        // Nose now points along -X; the camera trails along +X.
        assert!((eye - Vec3::new(30.0, 0.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_overview_without_ship() {
        let rig = ChaseCamera::new(30.0, 8.0);
        let mut camera = Camera::default();
        rig.place(&mut camera, None);
        assert_eq!(camera.position, OVERVIEW_POSITION);
        assert_eq!(camera.target, Vec3::ZERO);
    }
}
