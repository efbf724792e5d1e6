mod cli;
mod image_ops;
mod locate;
mod logging;
mod settings;
mod version;

use std::process;

use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use crate::cli::Args;
use crate::image_ops::{list_png_files, pick_random, resize_png_file};
use crate::settings::Config;

fn main() {
    let args = match Args::parse_with_env_help() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(1);
        }
    };

    if args.version {
        println!("{}", version::version_report());
        return;
    }

    if let Err(err) = run(args) {
        // Before the logger is up this is the only place the error surfaces.
        if log::log_enabled!(log::Level::Error) {
            log::error!("{err:#}");
        } else {
            eprintln!("error: {err:#}");
        }
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config_path = cli::config_path(args.config);
    let mut config = Config::load(&config_path)?;
    config.apply_env(|key| std::env::var(key).ok())?;

    let explicit_log = args.log.as_deref().or(config.log_path());
    let log_path = logging::log_file_path(explicit_log, &cli::app_dir(), chrono::Local::now().date_naive());
    logging::init(&log_path)?;
    log::info!("loaded config file: {}", config_path.display());
    log::debug!("writing log to {}", log_path.display());

    let source = config
        .resolve_source(locate::default_source_dir)
        .inspect_err(|_| log_source_steps())?;
    let destination = config
        .resolve_destination(locate::default_destination_dir)
        .inspect_err(|_| log_destination_steps())?;
    let settings = config.into_settings(source, destination)?;

    log::info!("source path: {}", settings.source.display());
    log::info!("source recursive: {}", settings.recursive);
    log::info!("destination path: {}", settings.destination.display());
    log::info!("destination size: {}x{}", settings.width, settings.height);

    let files = list_png_files(&settings.source, settings.recursive)?;
    log::debug!("found {} PNG files", files.len());
    let mut rng = ChaChaRng::from_entropy();
    let picked = pick_random(&files, &mut rng)?;
    log::info!("picked file: {}", picked.display());

    let splash = settings.splash_path();
    resize_png_file(&picked, &splash, settings.width, settings.height)?;
    log::info!("resized file saved to: {}", splash.display());
    Ok(())
}

fn log_source_steps() {
    log::error!("failed to obtain source path; tried in order:");
    log::error!("1. environment variable SOURCE_PATH");
    log::error!("2. source.path in the configuration file");
    log::error!("3. the VRChat folder inside the user's Pictures folder");
}

fn log_destination_steps() {
    log::error!("failed to obtain destination path; tried in order:");
    log::error!("1. environment variable DESTINATION_PATH");
    log::error!("2. destination.path in the configuration file");
    log::error!("3. the VRChat install folder in the Steam libraries, if it has an EasyAntiCheat folder");
}
