//! Orrery application: scene coordination, the spacecraft, asset loading,
//! the window loop and headless heightmap export.

pub mod assets;
pub mod clock;
pub mod export;
pub mod platform;
pub mod scene;
pub mod ship;
pub mod window;

pub use assets::{AssetError, HullDescriptor, SpacecraftLoader, SpacecraftModel};
pub use clock::{FrameClock, FrameTime, MAX_FRAME_DT};
pub use export::{ExportError, export_heightmap};
pub use scene::{BodyTransform, FrameState, SceneContext, SceneError};
pub use window::{AppError, AppState, run};
