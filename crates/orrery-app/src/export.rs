//! Headless export of the gravity well as a 16-bit grayscale PNG.
//!
//! The scene is advanced to the requested time without a window, the field
//! is sampled over the grid plane, and the samples are rescaled so the
//! deepest point is black and the flattest is white.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use orrery_config::Config;
use orrery_field::{FieldError, GridSampler, Heightmap};
use orrery_input::KeyboardState;
use tracing::info;

use crate::scene::{SceneContext, SceneError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("export time must be finite and >= 0, got {0}")]
    InvalidTime(f64),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("invalid sampling grid: {0}")]
    Sampling(#[from] FieldError),

    #[error("failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),
}

/// What was written.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportSummary {
    pub resolution: u32,
    /// Deepest and shallowest displacement before rescaling.
    pub range: (f32, f32),
}

/// Sample the field at `time` seconds with `resolution` pixels per side.
pub fn sample_heightmap(
    config: &Config,
    time: f64,
    resolution: u32,
) -> Result<Heightmap, ExportError> {
    if !(time.is_finite() && time >= 0.0) {
        return Err(ExportError::InvalidTime(time));
    }
    let mut scene = SceneContext::new(config)?;
    scene.tick(time, 0.0, &KeyboardState::new());

    let sampler = GridSampler::new(*scene.field(), config.grid.size, resolution)?;
    Ok(sampler.heightmap(&scene.mass_snapshot()))
}

/// Write `heightmap` as a big-endian 16-bit grayscale PNG.
pub fn write_png(heightmap: &Heightmap, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        heightmap.resolution,
        heightmap.resolution,
    );
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Sixteen);

    let bytes: Vec<u8> = heightmap
        .to_u16()
        .into_iter()
        .flat_map(u16::to_be_bytes)
        .collect();

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&bytes)?;
    writer.finish()?;
    Ok(())
}

pub fn export_heightmap(
    config: &Config,
    time: f64,
    resolution: u32,
    path: &Path,
) -> Result<ExportSummary, ExportError> {
    let heightmap = sample_heightmap(config, time, resolution)?;
    write_png(&heightmap, path)?;

    let range = heightmap.range();
    info!(
        "Wrote {}x{} heightmap at t={time}s to {} (displacement {:.2}..{:.2})",
        resolution,
        resolution,
        path.display(),
        range.0,
        range.1
    );
    Ok(ExportSummary { resolution, range })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.grid.subdivisions = 4;
        config
    }

    fn read_png(path: &Path) -> (png::OutputInfo, Vec<u16>) {
        let decoder = png::Decoder::new(File::open(path).unwrap());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        let pixels = buf[..info.buffer_size()]
            .chunks_exact(2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .collect();
        (info, pixels)
    }

    #[test]
    fn test_export_writes_sixteen_bit_grayscale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("well.png");
        let summary = export_heightmap(&small_config(), 0.0, 33, &path).unwrap();
        assert_eq!(summary.resolution, 33);
        assert!(summary.range.0 < summary.range.1);

        let (info, pixels) = read_png(&path);
        assert_eq!((info.width, info.height), (33, 33));
        assert_eq!(info.color_type, png::ColorType::Grayscale);
        assert_eq!(info.bit_depth, png::BitDepth::Sixteen);
        assert_eq!(pixels.len(), 33 * 33);

        // The sun sits at the centre sample and is the deepest point.
        assert_eq!(pixels[16 * 33 + 16], 0);
        assert_eq!(pixels.iter().copied().max(), Some(u16::MAX));
    }

    #[test]
    fn test_earth_dip_moves_with_time() {
        let config = small_config();
        let at_start = sample_heightmap(&config, 0.0, 65).unwrap();
        let later = sample_heightmap(&config, 60.0, 65).unwrap();
        assert_ne!(at_start.values, later.values);

        // At t = 0 the earth is at (+400, 0): a dip right of centre, mirrored
        // by nothing on the left.
        let step = config.grid.size / 64.0;
        let col = 32 + (400.0 / step).round() as u32;
        let mirror = 32 - (400.0 / step).round() as u32;
        assert!(at_start.get(col, 32).unwrap() < at_start.get(mirror, 32).unwrap());
    }

    #[test]
    fn test_bad_resolution_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = export_heightmap(&small_config(), 0.0, 1, &dir.path().join("x.png"));
        assert!(matches!(
            result,
            Err(ExportError::Sampling(FieldError::InvalidSampling { .. }))
        ));
    }

    #[test]
    fn test_time_must_be_finite_and_not_negative() {
        let config = small_config();
        assert!(matches!(
            sample_heightmap(&config, f64::NAN, 9),
            Err(ExportError::InvalidTime(t)) if t.is_nan()
        ));
        assert!(matches!(
            sample_heightmap(&config, f64::INFINITY, 9),
            Err(ExportError::InvalidTime(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("well.png");
        assert!(matches!(
            export_heightmap(&config, -100.0, 9, &path),
            Err(ExportError::InvalidTime(t)) if t == -100.0
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_resolution_above_cap_is_rejected() {
        assert!(matches!(
            sample_heightmap(&small_config(), 0.0, orrery_field::MAX_RESOLUTION + 1),
            Err(ExportError::Sampling(FieldError::InvalidSampling { .. }))
        ));
    }

    #[test]
    fn test_exported_samples_are_finite() {
        let map = sample_heightmap(&small_config(), 1234.5, 17).unwrap();
        assert!(map.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_invalid_scene_is_rejected() {
        let mut config = small_config();
        config.gravity.falloff = -1.0;
        assert!(matches!(
            sample_heightmap(&config, 0.0, 8),
            Err(ExportError::Scene(SceneError::Field(_)))
        ));
    }

    #[test]
    fn test_unwritable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("well.png");
        assert!(matches!(
            export_heightmap(&small_config(), 0.0, 8, &path),
            Err(ExportError::Io { .. })
        ));
    }
}
