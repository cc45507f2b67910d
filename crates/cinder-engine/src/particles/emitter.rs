use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::Camera;
use crate::render::{RenderCtx, RenderTarget, Texture};

use super::renderer::{ParticleRenderer, ParticleRendererConfig, ParticleShader};
use super::{
    DrawPlan, EmitterClock, EmitterConfig, EmitterError, ConfigError, Particle, ParticlePool,
};

/// Draws the randomized spawn values of new particles.
#[derive(Debug, Clone)]
pub struct SpawnSampler<R> {
    rng: R,
}

impl<R: Rng> SpawnSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// A fresh particle born at `now`.
    ///
    /// Position and velocity get independent `[-1, 1] * jitter` offsets per
    /// axis; each rotation endpoint is uniform within its bounds.
    pub fn sample(&mut self, config: &EmitterConfig, now: f32) -> Particle {
        let position = config.position + self.signed_vec3() * config.position_jitter;
        let velocity = config.velocity + self.signed_vec3() * config.velocity_jitter;

        let rot = config.rotation;
        let rotation_start = self.between(rot.start_min, rot.start_max);
        let rotation_end = self.between(rot.end_min, rot.end_max);

        Particle {
            spawn_time: now,
            start_position: position.to_array(),
            start_velocity: velocity.to_array(),
            rotation_start,
            rotation_end,
            _pad: [0.0; 3],
        }
    }

    fn signed(&mut self) -> f32 {
        self.rng.random::<f32>() * 2.0 - 1.0
    }

    fn signed_vec3(&mut self) -> Vec3 {
        Vec3::new(self.signed(), self.signed(), self.signed())
    }

    // Written as a lerp so reversed or equal bounds are fine.
    fn between(&mut self, min: f32, max: f32) -> f32 {
        self.rng.random::<f32>() * (max - min) + min
    }
}

/// Running totals since the emitter was created.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EmitterStats {
    pub spawned: u64,
    /// Spawns that came due while every slot was alive.
    pub dropped: u64,
    pub retired: u64,
}

/// Constants shared by every draw of one emitter frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EmitterConstants {
    pub acceleration: Vec3,
    pub start_color: [f32; 4],
    pub end_color: [f32; 4],
    pub start_size: f32,
    pub end_size: f32,
    pub lifetime: f32,
    pub current_time: f32,
}

/// Everything the renderer needs for one frame, borrowed from the emitter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleFrame<'a> {
    /// The whole backing array, dead slots included.
    pub records: &'a [Particle],
    pub constants: EmitterConstants,
    pub draws: DrawPlan,
}

/// CPU side of an emitter: pool, spawn clock and random source.
///
/// `update` retires expired particles and then spawns whatever the clock says
/// is due; `frame` snapshots the result for drawing. No GPU objects are
/// involved, so this type is fully testable headless.
#[derive(Debug, Clone)]
pub struct EmitterState<R = StdRng> {
    config: EmitterConfig,
    pool: ParticlePool,
    clock: EmitterClock,
    sampler: SpawnSampler<R>,
    stats: EmitterStats,
}

impl EmitterState<StdRng> {
    /// Creates an emitter seeded from the operating system.
    pub fn new(config: EmitterConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates an emitter whose jitter sequence is reproducible.
    pub fn seeded(config: EmitterConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> EmitterState<R> {
    pub fn with_rng(config: EmitterConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            pool: ParticlePool::new(config.capacity)?,
            clock: EmitterClock::new(config.particles_per_second)?,
            sampler: SpawnSampler::new(rng),
            stats: EmitterStats::default(),
            config,
        })
    }

    /// Advances the emitter by `dt` seconds; `now` is the simulation time of
    /// this frame and becomes the spawn time of every particle born in it.
    pub fn update(&mut self, dt: f32, now: f32) {
        let retired = self.pool.retire_expired(now, self.config.lifetime);
        self.stats.retired += retired as u64;

        let due = self.clock.advance(dt);
        let free = self.pool.capacity() - self.pool.living_count();
        let admitted = (due as usize).min(free);
        for _ in 0..admitted {
            let particle = self.sampler.sample(&self.config, now);
            let stored = self.pool.spawn(particle);
            debug_assert!(stored);
        }
        self.stats.spawned += admitted as u64;

        // Spawns beyond the free slots are never sampled.
        let dropped = u64::from(due) - admitted as u64;
        if dropped > 0 {
            self.stats.dropped += dropped;
            log::trace!(
                "emitter full ({} particles); dropped {dropped} spawn(s)",
                self.pool.capacity()
            );
        }
    }

    /// Snapshot for drawing at simulation time `now`.
    ///
    /// Pure: calling it repeatedly without an `update` in between yields
    /// identical frames.
    pub fn frame(&self, now: f32) -> ParticleFrame<'_> {
        ParticleFrame {
            records: self.pool.records(),
            constants: EmitterConstants {
                acceleration: self.config.acceleration,
                start_color: self.config.start_color,
                end_color: self.config.end_color,
                start_size: self.config.start_size,
                end_size: self.config.end_size,
                lifetime: self.config.lifetime,
                current_time: now,
            },
            draws: DrawPlan::for_pool(&self.pool),
        }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn clock(&self) -> &EmitterClock {
        &self.clock
    }

    pub fn stats(&self) -> EmitterStats {
        self.stats
    }

    #[inline]
    pub fn living_count(&self) -> usize {
        self.pool.living_count()
    }
}

/// A particle emitter with its GPU resources.
///
/// The frame driver calls [`update`](Self::update) and then
/// [`draw`](Self::draw) once per frame, in that order.
pub struct Emitter<R = StdRng> {
    state: EmitterState<R>,
    renderer: ParticleRenderer,
}

impl Emitter<StdRng> {
    /// Validates `config` and allocates the pool and GPU buffers.
    pub fn new(
        config: EmitterConfig,
        ctx: &RenderCtx<'_>,
        shader: &ParticleShader,
        texture: &Texture,
    ) -> Result<Self, EmitterError> {
        let state = EmitterState::new(config)?;
        Self::from_state(state, ctx, shader, texture, ParticleRendererConfig::default())
    }
}

impl<R: Rng> Emitter<R> {
    pub fn from_state(
        state: EmitterState<R>,
        ctx: &RenderCtx<'_>,
        shader: &ParticleShader,
        texture: &Texture,
        renderer_config: ParticleRendererConfig,
    ) -> Result<Self, EmitterError> {
        let renderer =
            ParticleRenderer::new(ctx, state.pool().capacity(), shader, texture, renderer_config)?;

        log::info!(
            "emitter ready: {} slots, {}/s, {}s lifetime",
            state.config().capacity,
            state.config().particles_per_second,
            state.config().lifetime
        );

        Ok(Self { state, renderer })
    }

    pub fn update(&mut self, dt: f32, now: f32) {
        self.state.update(dt, now);
    }

    /// Uploads the pool and records the particle pass into `target`.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        camera: &Camera,
        now: f32,
    ) {
        let frame = self.state.frame(now);
        self.renderer.render(ctx, target, camera, &frame);
    }

    /// Draws flat, untextured quads to show particle extents.
    pub fn set_debug_overlay(&mut self, enabled: bool) {
        self.renderer.set_debug_overlay(enabled);
    }

    pub fn debug_overlay(&self) -> bool {
        self.renderer.debug_overlay()
    }

    pub fn state(&self) -> &EmitterState<R> {
        &self.state
    }
}
