use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use minimap::MinimapConfig;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV_VAR: &str = "MINIMAP_CONFIG";
const DURATION_ENV_VAR: &str = "MINIMAP_DEMO_SECONDS";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path} at {at}: {source}")]
    Parse {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Knobs for the simulated host and the fixed-step loop driving it.
#[derive(Debug, Clone)]
pub(crate) struct DemoConfig {
    pub(crate) tick_rate_hz: u32,
    pub(crate) duration: Duration,
    pub(crate) host_startup_delay: Duration,
    pub(crate) status_log_interval: Duration,
    pub(crate) player_orbit_radius: f32,
    pub(crate) player_orbit_period: Duration,
    pub(crate) poi_spawn_interval: Duration,
    pub(crate) poi_lifetime: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            duration: Duration::from_secs(90),
            host_startup_delay: Duration::from_secs(5),
            status_log_interval: Duration::from_secs(5),
            player_orbit_radius: 60.0,
            player_orbit_period: Duration::from_secs(40),
            poi_spawn_interval: Duration::from_secs(7),
            poi_lifetime: Duration::from_secs(25),
        }
    }
}

pub(crate) struct AppWiring {
    pub(crate) demo: DemoConfig,
    pub(crate) minimap: MinimapConfig,
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!("=== Minimap Demo Startup ===");

    let minimap = match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) => {
            let path = PathBuf::from(path);
            let config = load_minimap_config(&path)?;
            info!(path = %path.display(), "minimap_config_loaded");
            config
        }
        None => MinimapConfig::default(),
    };

    let demo = DemoConfig {
        duration: parse_duration_from_env().unwrap_or(DemoConfig::default().duration),
        ..DemoConfig::default()
    };

    Ok(AppWiring { demo, minimap })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_duration_from_env() -> Option<Duration> {
    std::env::var(DURATION_ENV_VAR)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|seconds| *seconds > 0)
        .map(Duration::from_secs)
}

pub(crate) fn load_minimap_config(path: &Path) -> Result<MinimapConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_minimap_config(&raw, path)
}

fn parse_minimap_config(raw: &str, path: &Path) -> Result<MinimapConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let at = error.path().to_string();
        ConfigError::Parse {
            path: path.to_path_buf(),
            at,
            source: error.into_inner(),
        }
    })
}
