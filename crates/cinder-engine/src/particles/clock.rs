use super::config::validate_spawn_rate;
use super::ConfigError;

/// Converts a continuous spawn rate into whole spawn events per frame.
///
/// Elapsed time accumulates across frames and one `seconds_per_particle` is
/// paid out per spawn, so fractional time carries over instead of being
/// rounded away. A slow frame can yield several spawns, a fast one none.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterClock {
    seconds_per_particle: f32,
    time_since_last_spawn: f32,
}

impl EmitterClock {
    pub fn new(particles_per_second: f32) -> Result<Self, ConfigError> {
        validate_spawn_rate(particles_per_second)?;
        Ok(Self {
            seconds_per_particle: 1.0 / particles_per_second,
            time_since_last_spawn: 0.0,
        })
    }

    #[inline]
    pub fn seconds_per_particle(&self) -> f32 {
        self.seconds_per_particle
    }

    /// Accumulated time not yet paid out as a spawn.
    #[inline]
    pub fn time_since_last_spawn(&self) -> f32 {
        self.time_since_last_spawn
    }

    /// Adds `dt` seconds and returns how many particles are due.
    ///
    /// A spawn is due while the accumulator strictly exceeds one period, so an
    /// accumulator sitting exactly on the period waits for the next frame.
    /// Negative or non-finite steps are ignored. The count saturates at
    /// `u32::MAX`; time beyond that is discarded.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !(dt.is_finite() && dt >= 0.0) {
            log::debug!("EmitterClock: ignoring time step {dt}");
            return 0;
        }

        self.time_since_last_spawn += dt;

        if self.time_since_last_spawn <= self.seconds_per_particle * SUBTRACTION_LIMIT {
            let mut due = 0;
            while self.time_since_last_spawn > self.seconds_per_particle {
                self.time_since_last_spawn -= self.seconds_per_particle;
                due += 1;
            }
            return due;
        }

        self.pay_out_by_division()
    }

    // f32 subtraction stops changing the accumulator once the period drops
    // below its precision, so long steps divide in f64 instead.
    fn pay_out_by_division(&mut self) -> u32 {
        let acc = f64::from(self.time_since_last_spawn);
        let spp = f64::from(self.seconds_per_particle);

        let mut periods = (acc / spp).floor();
        let mut remainder = acc - periods * spp;
        if remainder <= 0.0 && periods >= 1.0 {
            periods -= 1.0;
            remainder += spp;
        }

        let due = if periods >= f64::from(u32::MAX) {
            log::debug!("EmitterClock: {periods} spawns due, saturating");
            u32::MAX
        } else {
            periods as u32
        };

        self.time_since_last_spawn = if remainder.is_finite() {
            remainder.clamp(0.0, spp) as f32
        } else {
            0.0
        };
        due
    }
}

/// Above this many periods in the accumulator, spawns are counted by division.
const SUBTRACTION_LIMIT: f32 = 64.0;
