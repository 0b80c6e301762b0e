//! 3D 场景的运行时子系统：轨道相机、帧率监测与细节层级。

pub mod camera;
pub mod lod;
pub mod performance;

pub use camera::{CameraConfig, CameraController, CameraState};
pub use lod::{LodConfig, LodController, LodLevel};
pub use performance::{FrameTimeStats, PerformanceConfig, PerformanceMonitor};
