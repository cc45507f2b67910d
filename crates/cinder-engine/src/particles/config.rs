use glam::Vec3;

use super::ConfigError;

/// Inclusive bounds for the random start and end rotation of each particle,
/// in radians.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationRanges {
    pub start_min: f32,
    pub start_max: f32,
    pub end_min: f32,
    pub end_max: f32,
}

impl RotationRanges {
    pub const NONE: Self = Self {
        start_min: 0.0,
        start_max: 0.0,
        end_min: 0.0,
        end_max: 0.0,
    };
}

/// Immutable emitter parameters.
///
/// Colors are straight (non-premultiplied) linear RGBA; the particle pass
/// blends additively with source alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    /// Maximum number of simultaneously living particles.
    pub capacity: usize,
    pub particles_per_second: f32,
    /// Seconds a particle lives.
    pub lifetime: f32,

    pub start_size: f32,
    pub end_size: f32,
    pub start_color: [f32; 4],
    pub end_color: [f32; 4],

    /// Base start velocity, jittered by `[-1, 1] * velocity_jitter` per axis.
    pub velocity: Vec3,
    pub velocity_jitter: Vec3,

    /// Base spawn position, jittered by `[-1, 1] * position_jitter` per axis.
    pub position: Vec3,
    pub position_jitter: Vec3,

    pub rotation: RotationRanges,

    /// Constant acceleration applied to every particle.
    pub acceleration: Vec3,
}

impl EmitterConfig {
    /// Largest capacity whose quad vertex indices (`4 * capacity`) fit in `u32`.
    pub const MAX_CAPACITY: usize = (u32::MAX / 4) as usize;

    /// Rejects parameters the emitter cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_capacity(self.capacity)?;
        validate_spawn_rate(self.particles_per_second)?;
        if !(self.lifetime.is_finite() && self.lifetime > 0.0) {
            return Err(ConfigError::InvalidLifetime(self.lifetime));
        }
        Ok(())
    }

    /// Steady-state number of living particles, ignoring the capacity cap.
    pub fn expected_population(&self) -> f32 {
        self.particles_per_second * self.lifetime
    }
}

pub(crate) fn validate_capacity(capacity: usize) -> Result<(), ConfigError> {
    if capacity == 0 {
        return Err(ConfigError::ZeroCapacity);
    }
    if capacity > EmitterConfig::MAX_CAPACITY {
        return Err(ConfigError::CapacityTooLarge {
            capacity,
            max: EmitterConfig::MAX_CAPACITY,
        });
    }
    Ok(())
}

pub(crate) fn validate_spawn_rate(particles_per_second: f32) -> Result<(), ConfigError> {
    if particles_per_second.is_finite() && particles_per_second > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSpawnRate(particles_per_second))
    }
}

impl Default for EmitterConfig {
    /// Slow grey snowfall drifting down across a 12-unit wide band.
    fn default() -> Self {
        Self {
            capacity: 200,
            particles_per_second: 30.0,
            lifetime: 3.0,
            start_size: 0.75,
            end_size: 0.5,
            start_color: [0.8, 0.8, 0.8, 0.3],
            end_color: [0.3, 0.3, 0.3, 1.0],
            velocity: Vec3::new(0.0, -2.0, 0.0),
            velocity_jitter: Vec3::new(0.5, 0.1, 0.1),
            position: Vec3::new(-2.5, 2.0, 0.0),
            position_jitter: Vec3::new(6.0, 0.0, 0.0),
            rotation: RotationRanges {
                start_min: 0.0,
                start_max: 0.0,
                end_min: -3.0,
                end_max: 3.0,
            },
            acceleration: Vec3::new(0.0, -1.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EmitterConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = EmitterConfig { capacity: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn oversized_capacity_is_rejected() {
        let config = EmitterConfig {
            capacity: EmitterConfig::MAX_CAPACITY + 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::CapacityTooLarge { .. })));
    }

    #[test]
    fn non_positive_or_nan_rate_is_rejected() {
        for rate in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let config = EmitterConfig { particles_per_second: rate, ..Default::default() };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidSpawnRate(_))),
                "rate {rate} accepted"
            );
        }
    }

    #[test]
    fn non_positive_lifetime_is_rejected() {
        let config = EmitterConfig { lifetime: 0.0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::InvalidLifetime(0.0)));
    }

    #[test]
    fn expected_population_is_rate_times_lifetime() {
        assert_eq!(EmitterConfig::default().expected_population(), 90.0);
    }
}
