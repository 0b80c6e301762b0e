use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use glam::Vec3;
use serde::{Deserialize, Serialize};

const SNAP_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub azimuth_angle: f32,
    pub polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// 每秒的指数阻尼系数，越大越快贴近目标。
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 8.0,
            azimuth_angle: 0.0,
            polar_angle: FRAC_PI_3,
            min_distance: 3.0,
            max_distance: 20.0,
            min_polar_angle: 0.1,
            max_polar_angle: FRAC_PI_2 - 0.05,
            damping: 8.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

/// 球坐标下的相机参数。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraState {
    pub distance: f32,
    pub azimuth_angle: f32,
    pub polar_angle: f32,
}

impl CameraState {
    /// `x = r·sinφ·sinθ`, `y = r·cosφ`, `z = r·sinφ·cosθ`.
    pub fn offset(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar_angle.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth_angle.sin_cos();
        Vec3::new(
            self.distance * sin_polar * sin_azimuth,
            self.distance * cos_polar,
            self.distance * sin_polar * cos_azimuth,
        )
    }
}

fn approach(current: f32, target: f32, alpha: f32) -> f32 {
    let next = current + (target - current) * alpha;
    if (target - next).abs() < SNAP_EPSILON {
        target
    } else {
        next
    }
}

/// 绕观察点旋转、缩放的轨道相机，所有输入都经过阻尼平滑。
#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    current: CameraState,
    target: CameraState,
    look_at: Vec3,
    position: Vec3,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        let home = Self::home(&config);
        let mut controller = Self {
            config,
            current: home,
            target: home,
            look_at: Vec3::ZERO,
            position: Vec3::ZERO,
        };
        controller.refresh_position();
        controller
    }

    fn home(config: &CameraConfig) -> CameraState {
        CameraState {
            distance: config
                .distance
                .clamp(config.min_distance, config.max_distance),
            azimuth_angle: config.azimuth_angle,
            polar_angle: config
                .polar_angle
                .clamp(config.min_polar_angle, config.max_polar_angle),
        }
    }

    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.target.azimuth_angle += delta_x * self.config.rotate_speed;
        self.target.polar_angle = (self.target.polar_angle + delta_y * self.config.rotate_speed)
            .clamp(self.config.min_polar_angle, self.config.max_polar_angle);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.target.distance = (self.target.distance + delta * self.config.zoom_speed)
            .clamp(self.config.min_distance, self.config.max_distance);
    }

    /// Eases toward the targets; `dt <= 0` leaves everything untouched.
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        let alpha = 1.0 - (-self.config.damping * dt).exp();
        self.current = CameraState {
            distance: approach(self.current.distance, self.target.distance, alpha),
            azimuth_angle: approach(self.current.azimuth_angle, self.target.azimuth_angle, alpha),
            polar_angle: approach(self.current.polar_angle, self.target.polar_angle, alpha),
        };
        self.refresh_position();
    }

    /// 目标回到初始值，当前值仍按阻尼逐帧靠近。
    pub fn reset(&mut self) {
        self.target = Self::home(&self.config);
    }

    pub fn set_look_at(&mut self, look_at: Vec3) {
        self.look_at = look_at;
        self.refresh_position();
    }

    fn refresh_position(&mut self) {
        self.position = self.look_at + self.current.offset();
    }

    pub fn state(&self) -> CameraState {
        self.current
    }

    pub fn target(&self) -> CameraState {
        self.target
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
