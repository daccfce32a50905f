//! Window size tracking between the windowing system and the GPU surface.
//!
//! Wayland reports 0×0 before the compositor assigns a size and HiDPI
//! displays change scale factor when the window moves, so the renderer only
//! ever reads clamped physical pixels from here.

/// Minimum surface dimension. wgpu panics on zero-sized surfaces.
pub const MIN_SURFACE_DIMENSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Emitted when the physical size actually changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceResizeEvent {
    pub physical: PhysicalSize,
    pub scale_factor: f64,
}

pub struct SurfaceWrapper {
    width: u32,
    height: u32,
    scale_factor: f64,
    configured: bool,
}

impl SurfaceWrapper {
    /// Zero dimensions are clamped to 1 and the wrapper starts unconfigured
    /// until the first real resize arrives.
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        Self {
            width: physical_width.max(MIN_SURFACE_DIMENSION),
            height: physical_height.max(MIN_SURFACE_DIMENSION),
            scale_factor,
            configured: physical_width > 0 && physical_height > 0,
        }
    }

    /// Idempotent: returns `None` when the clamped size is unchanged, so
    /// repeated resize events never rebuild the surface or depth buffer.
    pub fn handle_resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        let width = physical_width.max(MIN_SURFACE_DIMENSION);
        let height = physical_height.max(MIN_SURFACE_DIMENSION);

        if width == self.width && height == self.height {
            return None;
        }

        self.width = width;
        self.height = height;
        self.configured = true;

        Some(SurfaceResizeEvent {
            physical: self.physical_size(),
            scale_factor: self.scale_factor,
        })
    }

    /// Moving between monitors changes both scale and physical size.
    pub fn handle_scale_factor_changed(
        &mut self,
        scale_factor: f64,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        self.scale_factor = scale_factor;
        self.handle_resize(physical_width, physical_height)
    }

    pub fn physical_size(&self) -> PhysicalSize {
        PhysicalSize {
            width: self.width,
            height: self.height,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.physical_size().aspect_ratio()
    }

    /// Whether a real, non-zero size has been seen.
    pub fn is_configured(&self) -> bool {
        self.configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_is_clamped_and_unconfigured() {
        let mut wrapper = SurfaceWrapper::new(0, 0, 1.0);
        assert!(!wrapper.is_configured());
        assert_eq!(
            wrapper.physical_size(),
            PhysicalSize {
                width: 1,
                height: 1
            }
        );

        let event = wrapper.handle_resize(1280, 720).unwrap();
        assert_eq!(event.physical.width, 1280);
        assert_eq!(event.physical.height, 720);
        assert!(wrapper.is_configured());
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut wrapper = SurfaceWrapper::new(1280, 720, 1.0);
        assert!(wrapper.handle_resize(1280, 720).is_none());
        assert!(wrapper.handle_resize(1600, 900).is_some());
        assert!(wrapper.handle_resize(1600, 900).is_none());
    }

    #[test]
    fn test_minimize_clamps_to_one_pixel() {
        let mut wrapper = SurfaceWrapper::new(800, 600, 1.0);
        let event = wrapper.handle_resize(0, 0).unwrap();
        assert_eq!(event.physical, PhysicalSize { width: 1, height: 1 });
        assert!(wrapper.handle_resize(0, 0).is_none());
    }

    #[test]
    fn test_scale_factor_change() {
        let mut wrapper = SurfaceWrapper::new(1280, 720, 1.0);
        let event = wrapper
            .handle_scale_factor_changed(2.0, 2560, 1440)
            .unwrap();
        assert_eq!(event.scale_factor, 2.0);
        assert_eq!(wrapper.scale_factor(), 2.0);
        assert_eq!(wrapper.physical_size().width, 2560);
    }

    #[test]
    fn test_aspect_ratio() {
        let wrapper = SurfaceWrapper::new(1920, 1080, 1.0);
        assert!((wrapper.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }
}
