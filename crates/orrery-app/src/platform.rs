//! OS directory resolution.
//!
//! Config and logs live under the platform configuration root (XDG on Linux,
//! Known Folders on Windows, Library on macOS).

use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "orrery";

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("could not determine OS configuration directory")]
    NoConfigDir,

    #[error("platform I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl PlatformDirs {
    /// Resolve without touching the filesystem.
    pub fn resolve() -> Result<Self, PlatformError> {
        let base = dirs::config_dir().ok_or(PlatformError::NoConfigDir)?;
        Ok(Self::resolve_with_root(&base))
    }

    /// Rooted under `root` instead of the OS location.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            config_dir: app_dir.clone(),
            log_dir: app_dir.join("logs"),
        }
    }

    /// `config_override` replaces the config directory, e.g. from `--config`.
    pub fn with_config_override(mut self, config_override: Option<&Path>) -> Self {
        if let Some(dir) = config_override {
            self.config_dir = dir.to_path_buf();
        }
        self
    }

    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_root_layout() {
        let dirs = PlatformDirs::resolve_with_root(Path::new("base"));
        assert_eq!(dirs.config_dir, Path::new("base").join(APP_NAME));
        assert_eq!(dirs.log_dir, Path::new("base").join(APP_NAME).join("logs"));
    }

    #[test]
    fn test_config_override() {
        let dirs = PlatformDirs::resolve_with_root(Path::new("base"))
            .with_config_override(Some(Path::new("elsewhere")));
        assert_eq!(dirs.config_dir, Path::new("elsewhere"));
        assert_eq!(dirs.log_dir, Path::new("base").join(APP_NAME).join("logs"));

        let dirs = PlatformDirs::resolve_with_root(Path::new("base")).with_config_override(None);
        assert_eq!(dirs.config_dir, Path::new("base").join(APP_NAME));
    }

    #[test]
    fn test_directory_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
    }

    #[test]
    fn test_config_file_lands_in_resolved_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();
        let config = orrery_config::Config::load_or_create(&dirs.config_dir).unwrap();
        assert!(dirs.config_dir.join("config.ron").is_file());
        assert_eq!(config, orrery_config::Config::default());
    }

    #[test]
    fn test_no_hardcoded_separators() {
        // Paths are built with `join`, never by formatting separators.
        let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
        for entry in std::fs::read_dir(src).unwrap().flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|e| e != "rs") {
                continue;
            }
            let content = std::fs::read_to_string(&path).unwrap();
            for (n, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if trimmed.starts_with("//") {
                    continue;
                }
                let formats = line.contains("format!");
                let joins = line.contains(concat!("{}", "/", "{}"));
                assert!(
                    !(formats && joins),
                    "{}:{}: {trimmed}",
                    path.display(),
                    n + 1
                );
            }
        }
    }
}
