//! Ring-buffer particle emitter.
//!
//! [`EmitterState`] holds the CPU simulation (pool, spawn clock, jitter) and is
//! usable without a GPU. [`Emitter`] pairs it with a [`ParticleRenderer`] that
//! streams the pool into a storage buffer and draws the alive span as one or
//! two runs of camera-facing quads.

mod clock;
mod config;
mod draw;
mod emitter;
mod error;
mod particle;
mod pool;
mod renderer;

pub use clock::EmitterClock;
pub use config::{EmitterConfig, RotationRanges};
pub use draw::{quad_indices, DrawPlan, DrawRange, MAX_DRAWS};
pub use emitter::{
    Emitter, EmitterConstants, EmitterState, EmitterStats, ParticleFrame, SpawnSampler,
};
pub use error::{ConfigError, EmitterError};
pub use particle::{Particle, ParticleAppearance};
pub use pool::{AliveSpan, ParticlePool};
pub use renderer::{check_buffer_limits, ParticleRenderer, ParticleRendererConfig, ParticleShader};
