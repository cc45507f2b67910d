//! Cinder engine crate.
//!
//! Window runtime, GPU device, frame timing, input and camera plumbing, plus
//! the ring-buffer particle emitter drawn on top of them.

pub mod camera;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod particles;
pub mod render;
pub mod time;
pub mod window;
