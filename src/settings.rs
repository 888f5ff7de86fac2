//! Game settings
//!
//! Tuning for the simulation plus where to find the score service. Loaded
//! from LocalStorage on the web and from a JSON file on native; any field
//! left out keeps its default.

use serde::{Deserialize, Serialize};

use crate::consts::MESSAGE_DURATION_MS;
use crate::sim::SimConfig;

/// Environment variable naming a native settings file
pub const SETTINGS_PATH_ENV: &str = "PIPELINE_INVADERS_SETTINGS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Play area and spawn odds
    pub sim: SimConfig,
    /// Seed for the run RNG (random when unset)
    pub seed: Option<u64>,
    /// Score API endpoint
    pub api_base_url: String,
    /// How long power-up messages stay up (ms)
    pub message_duration_ms: u32,
    /// Storage key for the remembered player name
    pub player_name_key: String,
    /// Start with the autopilot driving
    pub idle_mode: bool,
    /// Native only: JSON file the headless runner keeps its leaderboard in
    pub scores_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            seed: None,
            api_base_url: "/api/highscore".to_string(),
            message_duration_ms: MESSAGE_DURATION_MS,
            player_name_key: "playerName".to_string(),
            idle_mode: false,
            scores_file: None,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "pipeline_invaders_settings";

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(err) => log::warn!("Ignoring stored settings: {}", err),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from the file named by `PIPELINE_INVADERS_SETTINGS`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(SETTINGS_PATH_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path);
                    settings
                }
                Err(err) => {
                    log::warn!("Ignoring settings file {}: {}", path, err);
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Could not read settings file {}: {}", path, err);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_defaults_match_constants() {
        let settings = Settings::default();
        assert_eq!(settings.sim.width, PLAY_WIDTH);
        assert_eq!(settings.sim.height, PLAY_HEIGHT);
        assert_eq!(settings.sim.enemy_spawn_chance, ENEMY_SPAWN_CHANCE);
        assert_eq!(settings.message_duration_ms, MESSAGE_DURATION_MS);
        assert_eq!(settings.api_base_url, "/api/highscore");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{"seed": 42, "sim": {"enemy_spawn_chance": 0.5}}"#).unwrap();
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.sim.enemy_spawn_chance, 0.5);
        assert_eq!(settings.sim.width, PLAY_WIDTH);
        assert_eq!(settings.player_name_key, "playerName");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{not json").is_err());
    }
}
