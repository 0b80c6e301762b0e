use serde::{Deserialize, Serialize};

use super::performance::PerformanceMonitor;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LodLevel {
    High,
    Medium,
    Low,
}

impl LodLevel {
    fn lowered(self) -> Self {
        match self {
            LodLevel::High => LodLevel::Medium,
            LodLevel::Medium | LodLevel::Low => LodLevel::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    pub medium_distance: f32,
    pub low_distance: f32,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            medium_distance: 10.0,
            low_distance: 20.0,
        }
    }
}

/// 按相机距离选择模型细节，帧率不足时再降一级。
#[derive(Debug, Clone, Default)]
pub struct LodController {
    config: LodConfig,
}

impl LodController {
    pub fn new(config: LodConfig) -> Self {
        Self { config }
    }

    pub fn level_for_distance(&self, distance: f32) -> LodLevel {
        if distance >= self.config.low_distance {
            LodLevel::Low
        } else if distance >= self.config.medium_distance {
            LodLevel::Medium
        } else {
            LodLevel::High
        }
    }

    pub fn evaluate(&self, distance: f32, monitor: &PerformanceMonitor) -> LodLevel {
        let level = self.level_for_distance(distance);
        if monitor.should_reduce_quality() {
            level.lowered()
        } else {
            level
        }
    }
}
