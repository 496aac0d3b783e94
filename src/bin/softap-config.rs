//! Host utility for inspecting and migrating access point configuration.
//!
//! # Usage
//!
//! ```bash
//! softap-config show <store.json> [--profile <profile.json>]
//! softap-config validate <store.json> [--profile <profile.json>]
//! softap-config migrate <legacy.conf> <store.json> [--profile <profile.json>]
//! ```
//!
//! `show` prints the normalized configuration and writes it back if
//! normalization changed it. `migrate` runs the one-shot legacy migration
//! into a JSON store.

use log::{error, info};
use softap_config::softap::{LegacyFile, LegacySource};
use softap_config::store::{ConfigurationStore, DataSource, JsonFileBackend};
use softap_config::DeviceProfile;
use std::path::{Path, PathBuf};
use std::process;

const USAGE: &str = "Usage:
  softap-config show <store.json> [--profile <profile.json>]
  softap-config validate <store.json> [--profile <profile.json>]
  softap-config migrate <legacy.conf> <store.json> [--profile <profile.json>]";

fn exit_with_usage() -> ! {
    eprintln!("{}", USAGE);
    process::exit(2);
}

/// Split `--profile <path>` out of the positional arguments.
fn parse_args(args: Vec<String>) -> (Vec<String>, Option<PathBuf>) {
    let mut positional = Vec::new();
    let mut profile = None;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--profile" {
            match iter.next() {
                Some(path) => profile = Some(PathBuf::from(path)),
                None => exit_with_usage(),
            }
        } else {
            positional.push(arg);
        }
    }
    (positional, profile)
}

fn load_profile(path: Option<&Path>) -> DeviceProfile {
    let Some(path) = path else {
        return DeviceProfile::default();
    };
    match DeviceProfile::from_json_file(path) {
        Ok(profile) => profile,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

fn flush(store: &mut ConfigurationStore<JsonFileBackend>) {
    let snapshot = store.serialize();
    if let Err(e) = store.backend_mut().flush(&snapshot) {
        error!("Failed to save configuration: {}", e);
        process::exit(1);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (args, profile_path) = parse_args(std::env::args().skip(1).collect());
    let profile = load_profile(profile_path.as_deref());

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["show", store_path] => {
            let mut store =
                ConfigurationStore::with_os_rng(JsonFileBackend::new(store_path), profile, None);
            let config = store.get_configuration();
            flush(&mut store);
            match serde_json::to_string_pretty(&config) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    error!("Failed to encode configuration: {}", e);
                    process::exit(1);
                }
            }
        }
        ["validate", store_path] => {
            let mut store =
                ConfigurationStore::with_os_rng(JsonFileBackend::new(store_path), profile, None);
            let config = store.get_configuration();
            flush(&mut store);
            match config.check() {
                Ok(()) => println!("valid"),
                Err(e) => {
                    println!("invalid: {}", e);
                    process::exit(1);
                }
            }
        }
        ["migrate", legacy_path, store_path] => {
            let legacy = LegacyFile::new(legacy_path);
            if !legacy.exists() {
                error!("No legacy record at {:?}", legacy.path());
                process::exit(1);
            }
            let mut store = ConfigurationStore::with_os_rng(
                JsonFileBackend::new(store_path),
                profile,
                Some(&legacy),
            );
            flush(&mut store);
            // Host files are always ready, so the deferred write follows at once.
            store.on_replay_ready();
            flush(&mut store);
            info!("Migration state: {:?}", store.migration_state());
        }
        _ => exit_with_usage(),
    }
}
