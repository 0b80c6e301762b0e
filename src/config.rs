use serde::{Deserialize, Serialize};

use crate::ai::AiConfig;
use crate::game::{DEFAULT_DECK_SIZE, MAX_HAND_SIZE, MIN_HAND_SIZE, STARTING_HP};
use crate::scene::{CameraConfig, LodConfig, PerformanceConfig};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum ConfigError {
    #[error("invalid game configuration: {reason}")]
    Invalid { reason: String },
}

/// 整体游戏配置，前端可传入 JSON 覆盖任意字段。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub deck_size: usize,
    pub initial_hand_size: usize,
    pub starting_hp: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub ai: AiConfig,
    pub camera: CameraConfig,
    pub performance: PerformanceConfig,
    pub lod: LodConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            deck_size: DEFAULT_DECK_SIZE,
            initial_hand_size: MAX_HAND_SIZE,
            starting_hp: STARTING_HP,
            seed: None,
            ai: AiConfig::default(),
            camera: CameraConfig::default(),
            performance: PerformanceConfig::default(),
            lod: LodConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 检查开局参数能否满足手牌 [3, 5] 的约束。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_HAND_SIZE..=MAX_HAND_SIZE).contains(&self.initial_hand_size) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "initial_hand_size {} is outside [{}, {}]",
                    self.initial_hand_size, MIN_HAND_SIZE, MAX_HAND_SIZE
                ),
            });
        }
        if self.deck_size < self.initial_hand_size {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "deck_size ({}) is smaller than initial_hand_size ({})",
                    self.deck_size, self.initial_hand_size
                ),
            });
        }
        if self.starting_hp <= 0 {
            return Err(ConfigError::Invalid {
                reason: format!("starting_hp {} must be positive", self.starting_hp),
            });
        }
        self.ai.validate().map_err(|err| ConfigError::Invalid {
            reason: err.to_string(),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "seed": 9, "ai": { "max_play_delay": 2500 } }"#)
            .expect("valid config");
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.ai.max_play_delay, 2500);
        assert_eq!(config.ai.min_play_delay, 1000);
        assert_eq!(config.deck_size, 20);
        assert_eq!(config.performance.window_size, 60);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(GameConfig::from_json("{}").expect("valid"), GameConfig::default());
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn hand_below_minimum_is_rejected() {
        let config =
            GameConfig::from_json(r#"{ "initial_hand_size": 1, "deck_size": 2 }"#).expect("json");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let config = GameConfig {
            initial_hand_size: 6,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deck_smaller_than_hand_is_rejected() {
        let config = GameConfig::from_json(r#"{ "deck_size": 0 }"#).expect("json");
        assert!(config.validate().is_err());

        let config = GameConfig {
            deck_size: 3,
            initial_hand_size: 3,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn bad_ai_or_health_is_rejected() {
        let config = GameConfig {
            starting_hp: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            ai: AiConfig::default().with_delay(9, 1),
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
