//! Binary entry point: `orrery`.

use clap::Parser;
use orrery_app::platform::PlatformDirs;
use orrery_config::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();

    let dirs = match PlatformDirs::resolve() {
        Ok(dirs) => dirs.with_config_override(args.config.as_deref()),
        Err(e) => {
            eprintln!("Failed to resolve platform directories: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = dirs.create_dirs() {
        eprintln!("Failed to create platform directories: {e}");
        std::process::exit(1);
    }

    let mut config = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config, using defaults: {e}");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);

    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = config.validate() {
        tracing::error!("{e}");
        std::process::exit(1);
    }

    if let Some(path) = &args.export_heightmap {
        match orrery_app::export_heightmap(&config, args.time, args.resolution, path) {
            Ok(_) => return,
            Err(e) => {
                tracing::error!("Heightmap export failed: {e}");
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = orrery_app::run(config) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
