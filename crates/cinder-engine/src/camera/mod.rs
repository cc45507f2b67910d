//! Perspective camera and keyboard controls.

mod camera;
mod controller;

pub use camera::{Camera, CameraConfig, MatrixLayout};
pub use controller::CameraController;
