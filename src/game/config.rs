use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::board::MapType;

pub const DEFAULT_DISCARD_LIMIT: u32 = 7;
pub const DEFAULT_TURNS_LIMIT: u32 = 1000;
pub const DEFAULT_VPS_TO_WIN: u8 = 10;

/// Per-game settings. Every field has a default, so a JSON file only needs
/// the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub num_players: usize,
    pub map_type: MapType,
    pub vps_to_win: u8,
    pub discard_limit: u32,
    pub turns_limit: u32,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 4,
            map_type: MapType::Base,
            vps_to_win: DEFAULT_VPS_TO_WIN,
            discard_limit: DEFAULT_DISCARD_LIMIT,
            turns_limit: DEFAULT_TURNS_LIMIT,
            seed: 42,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("num_players must be between 1 and 4, got {0}")]
    InvalidPlayerCount(usize),
    #[error("vps_to_win must be positive")]
    InvalidVictoryPoints,
    #[error("discard_limit must be positive")]
    InvalidDiscardLimit,
    #[error("turns_limit must be positive")]
    InvalidTurnsLimit,
}

impl GameConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=4).contains(&self.num_players) {
            return Err(ConfigError::InvalidPlayerCount(self.num_players));
        }
        if self.vps_to_win == 0 {
            return Err(ConfigError::InvalidVictoryPoints);
        }
        if self.discard_limit == 0 {
            return Err(ConfigError::InvalidDiscardLimit);
        }
        if self.turns_limit == 0 {
            return Err(ConfigError::InvalidTurnsLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = GameConfig::from_json_str(r#"{"num_players": 2, "map_type": "MINI"}"#).unwrap();
        assert_eq!(
            config,
            GameConfig {
                num_players: 2,
                map_type: MapType::Mini,
                ..GameConfig::default()
            }
        );
        assert_eq!(config.discard_limit, 7);
        assert_eq!(config.turns_limit, 1000);
    }

    #[test]
    fn rejects_bad_player_count_and_unknown_keys() {
        assert!(matches!(
            GameConfig::from_json_str(r#"{"num_players": 5}"#),
            Err(ConfigError::InvalidPlayerCount(5))
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{"players": 2}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_zero_limits() {
        assert!(matches!(
            GameConfig::from_json_str(r#"{"discard_limit": 0}"#),
            Err(ConfigError::InvalidDiscardLimit)
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{"turns_limit": 0}"#),
            Err(ConfigError::InvalidTurnsLimit)
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{"vps_to_win": 0}"#),
            Err(ConfigError::InvalidVictoryPoints)
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GameConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
