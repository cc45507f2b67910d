use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use super::EmitterConfig;

/// One particle slot, laid out exactly as the vertex stage reads it.
///
/// Three 16-byte rows:
/// - `spawn_time`, `start_position`
/// - `start_velocity`, `rotation_start`
/// - `rotation_end`, padding
///
/// Only spawn-time values are stored. Position, size, color and rotation at
/// any later moment are derived from the particle's age.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    pub spawn_time: f32,
    pub start_position: [f32; 3],

    pub start_velocity: [f32; 3],
    pub rotation_start: f32,

    pub rotation_end: f32,
    pub _pad: [f32; 3],
}

const _: () = assert!(std::mem::size_of::<Particle>() == 48);

impl Particle {
    #[inline]
    pub fn age(&self, now: f32) -> f32 {
        now - self.spawn_time
    }

    /// Position after `age` seconds under constant `acceleration`.
    #[inline]
    pub fn position_at(&self, age: f32, acceleration: Vec3) -> Vec3 {
        Vec3::from(self.start_position)
            + Vec3::from(self.start_velocity) * age
            + acceleration * (0.5 * age * age)
    }
}

/// Interpolated visual state of a particle; the CPU twin of the vertex stage.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ParticleAppearance {
    pub position: Vec3,
    pub size: f32,
    pub color: Vec4,
    pub rotation: f32,
}

impl ParticleAppearance {
    pub fn at(config: &EmitterConfig, particle: &Particle, now: f32) -> Self {
        let age = particle.age(now);
        let t = (age / config.lifetime).clamp(0.0, 1.0);
        let lerp = |a: f32, b: f32| a + (b - a) * t;

        Self {
            position: particle.position_at(age, config.acceleration),
            size: lerp(config.start_size, config.end_size),
            color: Vec4::from(config.start_color).lerp(Vec4::from(config.end_color), t),
            rotation: lerp(particle.rotation_start, particle.rotation_end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle() -> Particle {
        Particle {
            spawn_time: 1.0,
            start_position: [1.0, 2.0, 3.0],
            start_velocity: [0.0, -2.0, 0.0],
            rotation_start: 0.0,
            rotation_end: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn record_is_three_16_byte_rows() {
        assert_eq!(std::mem::size_of::<Particle>() % 16, 0);
        let p = particle();
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&p));
        assert_eq!(floats[0], 1.0);
        assert_eq!(&floats[1..4], &[1.0, 2.0, 3.0]);
        assert_eq!(&floats[4..7], &[0.0, -2.0, 0.0]);
        assert_eq!(floats[8], 2.0);
    }

    #[test]
    fn position_integrates_velocity_and_acceleration() {
        let p = particle();
        let pos = p.position_at(2.0, Vec3::new(0.0, -1.0, 0.0));
        // y = 2 - 2*2 - 0.5*1*4
        assert!((pos - Vec3::new(1.0, -4.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn appearance_interpolates_over_lifetime() {
        let config = EmitterConfig {
            lifetime: 2.0,
            start_size: 1.0,
            end_size: 0.0,
            start_color: [1.0, 0.0, 0.0, 1.0],
            end_color: [0.0, 0.0, 1.0, 0.0],
            acceleration: Vec3::ZERO,
            ..Default::default()
        };
        let a = ParticleAppearance::at(&config, &particle(), 2.0);
        assert!((a.size - 0.5).abs() < 1e-6);
        assert!((a.rotation - 1.0).abs() < 1e-6);
        assert!((a.color - Vec4::new(0.5, 0.0, 0.5, 0.5)).length() < 1e-6);
    }

    #[test]
    fn appearance_clamps_past_lifetime() {
        let config = EmitterConfig { lifetime: 1.0, ..Default::default() };
        let a = ParticleAppearance::at(&config, &particle(), 10.0);
        assert_eq!(a.size, config.end_size);
    }
}
