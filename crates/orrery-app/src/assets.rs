//! Spacecraft hull loading on a background thread.
//!
//! A hull is a small RON description: a scale and an indexed triangle list.
//! The loader thread reads and meshes it, then hands the result back over a
//! channel that the frame loop polls without blocking. The scene runs with
//! no spacecraft until the result arrives.

use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, TryRecvError, bounded};
use glam::Vec3;
use orrery_space::{MeshData, MeshError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read hull {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse hull {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("hull scale must be positive, got {0}")]
    InvalidScale(f32),

    #[error("invalid hull mesh: {0}")]
    Mesh(#[from] MeshError),

    #[error("failed to start the asset loader thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("asset loader stopped without delivering a result")]
    Disconnected,
}

/// On-disk hull description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullDescriptor {
    /// Uniform scale applied to `vertices`.
    #[serde(default = "default_scale")]
    pub scale: f32,
    pub vertices: Vec<[f32; 3]>,
    /// Counter-clockwise seen from outside.
    pub triangles: Vec<[u32; 3]>,
}

fn default_scale() -> f32 {
    1.0
}

impl HullDescriptor {
    /// A small dart with its nose along -Z.
    pub fn builtin() -> Self {
        Self {
            scale: 3.0,
            vertices: vec![
                [0.0, 0.0, -2.0],  // nose
                [-1.2, 0.0, 1.0],  // left wing
                [1.2, 0.0, 1.0],   // right wing
                [0.0, 0.5, 0.8],   // dorsal
                [0.0, -0.3, 0.8],  // ventral
            ],
            triangles: vec![
                [0, 1, 3],
                [0, 3, 2],
                [0, 4, 1],
                [0, 2, 4],
                [1, 4, 3],
                [2, 3, 4],
            ],
        }
    }

    pub fn from_ron_str(source: &str, path: &Path) -> Result<Self, AssetError> {
        ron::from_str(source).map_err(|source| AssetError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Flat-shaded mesh with the scale baked into the positions.
    pub fn to_mesh(&self) -> Result<MeshData, AssetError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(AssetError::InvalidScale(self.scale));
        }
        let positions: Vec<Vec3> = self
            .vertices
            .iter()
            .map(|&v| Vec3::from_array(v) * self.scale)
            .collect();
        Ok(MeshData::from_triangles(&positions, &self.triangles)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HullSource {
    BuiltIn,
    File(PathBuf),
}

/// A hull ready for upload.
#[derive(Debug, Clone)]
pub struct SpacecraftModel {
    pub mesh: MeshData,
    pub source: HullSource,
}

/// Load synchronously. A path that does not exist falls back to the
/// built-in hull; any other read failure is an error.
pub fn load_spacecraft(path: Option<&Path>) -> Result<SpacecraftModel, AssetError> {
    let Some(path) = path else {
        return builtin_model();
    };

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Hull {} not found, using the built-in hull", path.display());
            return builtin_model();
        }
        Err(source) => {
            return Err(AssetError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mesh = HullDescriptor::from_ron_str(&contents, path)?.to_mesh()?;
    Ok(SpacecraftModel {
        mesh,
        source: HullSource::File(path.to_path_buf()),
    })
}

fn builtin_model() -> Result<SpacecraftModel, AssetError> {
    Ok(SpacecraftModel {
        mesh: HullDescriptor::builtin().to_mesh()?,
        source: HullSource::BuiltIn,
    })
}

/// Handle to a spacecraft load running on its own thread.
pub struct SpacecraftLoader {
    receiver: Receiver<Result<SpacecraftModel, AssetError>>,
    finished: bool,
}

impl SpacecraftLoader {
    pub fn spawn(path: Option<PathBuf>) -> Result<Self, AssetError> {
        let (sender, receiver) = bounded(1);

        std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                let start = std::time::Instant::now();
                let result = load_spacecraft(path.as_deref());
                debug!(
                    "Spacecraft load finished in {:.1}ms",
                    start.elapsed().as_secs_f64() * 1000.0
                );
                // The receiver is gone if the app shut down first.
                let _ = sender.send(result);
            })
            .map_err(AssetError::Spawn)?;

        info!("Spacecraft loader started");
        Ok(Self {
            receiver,
            finished: false,
        })
    }

    /// Non-blocking. Yields the result exactly once, then `None` forever.
    pub fn poll(&mut self) -> Option<Result<SpacecraftModel, AssetError>> {
        if self.finished {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                self.finished = true;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                Some(Err(AssetError::Disconnected))
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(loader: &mut SpacecraftLoader) -> Result<SpacecraftModel, AssetError> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = loader.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "loader timed out");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_builtin_hull_is_closed_and_faces_outward() {
        let hull = HullDescriptor::builtin();
        let mesh = hull.to_mesh().unwrap();
        assert_eq!(mesh.triangle_count(), 6);
        assert_eq!(mesh.vertices.len(), 18);

        let centroid = hull
            .vertices
            .iter()
            .map(|&v| Vec3::from_array(v) * hull.scale)
            .sum::<Vec3>()
            / hull.vertices.len() as f32;
        for tri in mesh.vertices.chunks_exact(3) {
            let face_centre = tri
                .iter()
                .map(|v| Vec3::from_array(v.position))
                .sum::<Vec3>()
                / 3.0;
            let normal = Vec3::from_array(tri[0].normal);
            assert!(normal.dot(face_centre - centroid) > 0.0);
        }

        // Every edge is shared by exactly two triangles.
        let mut edges = std::collections::HashMap::new();
        for t in &hull.triangles {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                *edges.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        assert!(edges.values().all(|&n| n == 2));
    }

    #[test]
    fn test_builtin_nose_points_forward() {
        let mesh = HullDescriptor::builtin().to_mesh().unwrap();
        let min_z = mesh
            .vertices
            .iter()
            .map(|v| v.position[2])
            .fold(f32::INFINITY, f32::min);
        assert_eq!(min_z, -6.0);
    }

    #[test]
    fn test_scale_is_validated() {
        let hull = HullDescriptor {
            scale: 0.0,
            ..HullDescriptor::builtin()
        };
        assert!(matches!(hull.to_mesh(), Err(AssetError::InvalidScale(_))));
    }

    #[test]
    fn test_bad_triangle_is_a_mesh_error() {
        let hull = HullDescriptor {
            scale: 1.0,
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            triangles: vec![[0, 1, 2]],
        };
        assert!(matches!(
            hull.to_mesh(),
            Err(AssetError::Mesh(MeshError::IndexOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_no_path_loads_builtin() {
        let model = load_spacecraft(None).unwrap();
        assert_eq!(model.source, HullSource::BuiltIn);
        assert_eq!(model.mesh.triangle_count(), 6);
    }

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_spacecraft(Some(&dir.path().join("absent.ron"))).unwrap();
        assert_eq!(model.source, HullSource::BuiltIn);
    }

    #[test]
    fn test_loads_hull_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tetra.ron");
        std::fs::write(
            &path,
            "(scale: 2.0, vertices: [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 0.0, 1.0), (0.0, 1.0, 0.0)], \
             triangles: [(0, 1, 2), (0, 3, 1), (0, 2, 3), (1, 3, 2)])",
        )
        .unwrap();

        let model = load_spacecraft(Some(&path)).unwrap();
        assert_eq!(model.source, HullSource::File(path));
        assert_eq!(model.mesh.triangle_count(), 4);
        assert!((model.mesh.bounding_radius() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_scale_defaults_to_one() {
        let hull: HullDescriptor = ron::from_str(
            "(vertices: [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 0.0, 1.0)], triangles: [(0, 2, 1)])",
        )
        .unwrap();
        assert_eq!(hull.scale, 1.0);
    }

    #[test]
    fn test_unparsable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(&path, "(scale: ").unwrap();
        assert!(matches!(
            load_spacecraft(Some(&path)),
            Err(AssetError::Parse { .. })
        ));
    }

    #[test]
    fn test_loader_delivers_once() {
        let mut loader = SpacecraftLoader::spawn(None).unwrap();
        let model = wait_for(&mut loader).unwrap();
        assert_eq!(model.source, HullSource::BuiltIn);
        assert!(loader.is_finished());
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_loader_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(&path, "not a hull").unwrap();

        let mut loader = SpacecraftLoader::spawn(Some(path)).unwrap();
        assert!(matches!(
            wait_for(&mut loader),
            Err(AssetError::Parse { .. })
        ));
    }
}
