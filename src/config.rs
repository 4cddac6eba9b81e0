//! Application-level configuration loading for round timing and sizing.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BLOCK_RUSH_CONFIG_PATH";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Number of claimable blocks; ids run from 1 to this value inclusive.
    pub grid_size: u32,
    /// Distinct participants required before a round auto-starts.
    pub min_players: usize,
    /// First value of the pre-round countdown (counts down to 0).
    pub countdown_from: u8,
    /// Length of the claim window in seconds.
    pub game_duration_secs: u64,
    /// Period of the claim-batch flush in milliseconds.
    pub flush_interval_ms: u64,
    /// Delay between the winner announcement and the board reset, in seconds.
    pub reset_delay_secs: u64,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// built-in defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        grid_size = config.grid_size,
                        min_players = config.min_players,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Length of the claim window.
    pub fn game_duration(&self) -> Duration {
        Duration::from_secs(self.game_duration_secs)
    }

    /// Period of the claim-batch flush.
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Delay between the winner announcement and the board reset.
    pub fn reset_delay(&self) -> Duration {
        Duration::from_secs(self.reset_delay_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            grid_size: 100,
            min_players: 10,
            countdown_from: 3,
            game_duration_secs: 60,
            flush_interval_ms: 200,
            reset_delay_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file; every field optional.
struct RawConfig {
    grid_size: Option<u32>,
    min_players: Option<usize>,
    countdown_from: Option<u8>,
    game_duration_secs: Option<u64>,
    flush_interval_ms: Option<u64>,
    reset_delay_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            grid_size: raw.grid_size.unwrap_or(defaults.grid_size),
            min_players: raw.min_players.unwrap_or(defaults.min_players),
            countdown_from: raw.countdown_from.unwrap_or(defaults.countdown_from),
            game_duration_secs: raw
                .game_duration_secs
                .unwrap_or(defaults.game_duration_secs),
            flush_interval_ms: raw.flush_interval_ms.unwrap_or(defaults.flush_interval_ms),
            reset_delay_secs: raw.reset_delay_secs.unwrap_or(defaults.reset_delay_secs),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_round_parameters() {
        let config = AppConfig::default();
        assert_eq!(config.grid_size, 100);
        assert_eq!(config.min_players, 10);
        assert_eq!(config.countdown_from, 3);
        assert_eq!(config.game_duration(), Duration::from_secs(60));
        assert_eq!(config.flush_interval(), Duration::from_millis(200));
        assert_eq!(config.reset_delay(), Duration::from_secs(10));
    }

    #[test]
    fn partial_raw_config_keeps_defaults_for_missing_fields() {
        let raw: RawConfig = serde_json::from_str(r#"{"min_players": 4}"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.min_players, 4);
        assert_eq!(config.grid_size, 100);
    }
}
