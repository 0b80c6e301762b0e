use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

const IDLE_FPS: f64 = 60.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    pub window_size: usize,
    /// 样本不足时不做降级判断。
    pub min_samples: usize,
    pub fps_threshold: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            window_size: 60,
            min_samples: 30,
            fps_threshold: 55.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FrameTimeStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// 滑动窗口帧时间采样器。
#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    config: PerformanceConfig,
    samples: VecDeque<f64>,
    reducing: bool,
}

impl PerformanceMonitor {
    pub fn new(config: PerformanceConfig) -> Self {
        let window_size = config.window_size.max(1);
        // min_samples 不超过窗口大小
        let min_samples = config.min_samples.min(window_size);
        Self {
            config: PerformanceConfig {
                window_size,
                min_samples,
                ..config
            },
            samples: VecDeque::with_capacity(window_size),
            reducing: false,
        }
    }

    pub fn record_frame_time(&mut self, millis: f64) {
        if !(millis > 0.0) || !millis.is_finite() {
            return;
        }
        if self.samples.len() == self.config.window_size {
            self.samples.pop_front();
        }
        self.samples.push_back(millis);

        let reducing = self.should_reduce_quality();
        if reducing != self.reducing {
            log::debug!(
                "quality reduction {} at {:.1} fps",
                if reducing { "engaged" } else { "released" },
                self.average_fps()
            );
            self.reducing = reducing;
        }
    }

    fn average_frame_time(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    pub fn average_fps(&self) -> f64 {
        match self.average_frame_time() {
            Some(avg) => 1000.0 / avg,
            None => IDLE_FPS,
        }
    }

    pub fn should_reduce_quality(&self) -> bool {
        self.samples.len() >= self.config.min_samples
            && self.average_fps() < self.config.fps_threshold
    }

    pub fn frame_time_stats(&self) -> FrameTimeStats {
        let Some(avg) = self.average_frame_time() else {
            return FrameTimeStats::default();
        };
        let (min, max) = self
            .samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &sample| {
                (min.min(sample), max.max(sample))
            });
        FrameTimeStats { min, max, avg }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.reducing = false;
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(PerformanceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_monitor_reports_sixty() {
        let monitor = PerformanceMonitor::default();
        assert_eq!(monitor.average_fps(), 60.0);
        assert_eq!(monitor.frame_time_stats(), FrameTimeStats::default());
        assert!(!monitor.should_reduce_quality());
    }

    #[test]
    fn constant_frame_time_gives_expected_fps() {
        let mut monitor = PerformanceMonitor::default();
        for _ in 0..60 {
            monitor.record_frame_time(16.67);
        }
        assert!((monitor.average_fps() - 60.0).abs() < 0.1);
    }

    #[test]
    fn non_positive_samples_are_ignored() {
        let mut monitor = PerformanceMonitor::default();
        monitor.record_frame_time(0.0);
        monitor.record_frame_time(-5.0);
        monitor.record_frame_time(f64::NAN);
        assert_eq!(monitor.sample_count(), 0);
    }

    #[test]
    fn window_is_bounded() {
        let mut monitor = PerformanceMonitor::default();
        for _ in 0..60 {
            monitor.record_frame_time(100.0);
        }
        for _ in 0..60 {
            monitor.record_frame_time(10.0);
        }
        assert_eq!(monitor.sample_count(), 60);
        assert_eq!(monitor.frame_time_stats().max, 10.0);
    }

    #[test]
    fn quality_reduction_needs_enough_samples() {
        let mut monitor = PerformanceMonitor::default();
        for _ in 0..29 {
            monitor.record_frame_time(50.0);
        }
        assert!(!monitor.should_reduce_quality());
        monitor.record_frame_time(50.0);
        assert!(monitor.should_reduce_quality());
    }

    #[test]
    fn fast_frames_never_reduce_quality() {
        let mut monitor = PerformanceMonitor::default();
        for _ in 0..60 {
            monitor.record_frame_time(8.0);
        }
        assert!(!monitor.should_reduce_quality());
    }

    #[test]
    fn stats_cover_window() {
        let mut monitor = PerformanceMonitor::default();
        for sample in [10.0, 20.0, 30.0] {
            monitor.record_frame_time(sample);
        }
        assert_eq!(
            monitor.frame_time_stats(),
            FrameTimeStats {
                min: 10.0,
                max: 30.0,
                avg: 20.0
            }
        );
    }

    #[test]
    fn reset_clears_window() {
        let mut monitor = PerformanceMonitor::default();
        for _ in 0..40 {
            monitor.record_frame_time(40.0);
        }
        monitor.reset();
        assert_eq!(monitor.sample_count(), 0);
        assert_eq!(monitor.average_fps(), 60.0);
    }

    #[test]
    fn small_window_can_still_reduce_quality() {
        let mut monitor = PerformanceMonitor::new(PerformanceConfig {
            window_size: 10,
            min_samples: 30,
            fps_threshold: 55.0,
        });
        for _ in 0..10 {
            monitor.record_frame_time(50.0);
        }
        assert_eq!(monitor.sample_count(), 10);
        assert!(monitor.should_reduce_quality());
    }
}
