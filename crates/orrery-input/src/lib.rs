//! Keyboard input for the spacecraft controls.

pub mod keyboard;

pub use keyboard::{KeyboardState, RawKeyEvent};
pub use winit::keyboard::KeyCode;
