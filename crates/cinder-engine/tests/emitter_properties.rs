//! Emitter behavior over randomized frame histories, through the public API.

use std::collections::VecDeque;

use cinder_engine::particles::{
    DrawPlan, EmitterClock, EmitterConfig, EmitterState, ParticlePool,
};
use proptest::prelude::*;

fn config(capacity: usize, rate: f32, lifetime: f32) -> EmitterConfig {
    EmitterConfig {
        capacity,
        particles_per_second: rate,
        lifetime,
        ..EmitterConfig::default()
    }
}

fn frame_steps() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(0.0f32..0.25, 1..120)
}

proptest! {
    /// The pool holds exactly the spawn times a plain queue would keep: drop
    /// everything at least `lifetime` old, then admit due spawns up to capacity.
    #[test]
    fn living_count_follows_queue_model(
        capacity in 1usize..40,
        rate in 1.0f32..120.0,
        lifetime in 0.05f32..3.0,
        seed in any::<u64>(),
        steps in frame_steps(),
    ) {
        let mut state = EmitterState::seeded(config(capacity, rate, lifetime), seed).unwrap();
        let mut clock = EmitterClock::new(rate).unwrap();
        let mut model: VecDeque<f32> = VecDeque::new();
        let mut now = 0.0f32;

        for dt in steps {
            now += dt;
            state.update(dt, now);

            while model.front().is_some_and(|&t| now - t >= lifetime) {
                model.pop_front();
            }
            for _ in 0..clock.advance(dt) {
                if model.len() < capacity {
                    model.push_back(now);
                }
            }

            prop_assert_eq!(state.living_count(), model.len());
            prop_assert!(state.living_count() <= capacity);

            let pool = state.pool();
            let spawn_times: Vec<f32> = pool.iter_alive().map(|(_, p)| p.spawn_time).collect();
            prop_assert_eq!(spawn_times, model.iter().copied().collect::<Vec<_>>());
        }
    }

    /// Every unit of time is either paid out as a spawn or still in the
    /// accumulator, which never exceeds one period.
    #[test]
    fn spawn_accounting_balances(
        rate in 0.5f32..200.0,
        steps in frame_steps(),
    ) {
        let mut state = EmitterState::seeded(config(8, rate, 0.5), 1).unwrap();
        let mut now = 0.0f32;
        let mut elapsed = 0.0f64;

        for dt in steps {
            now += dt;
            elapsed += f64::from(dt);
            state.update(dt, now);
        }

        let stats = state.stats();
        let clock = state.clock();
        let spp = f64::from(clock.seconds_per_particle());
        let remainder = f64::from(clock.time_since_last_spawn());
        let paid = (stats.spawned + stats.dropped) as f64 * spp;

        prop_assert!(remainder >= 0.0);
        prop_assert!(remainder <= spp + 1e-6);
        let tolerance = 1e-4 * (1.0 + elapsed);
        prop_assert!((paid + remainder - elapsed).abs() <= tolerance,
            "paid {} + remainder {} != elapsed {}", paid, remainder, elapsed);
    }

    /// Draw ranges cover each living slot exactly once and never touch a
    /// dead one.
    #[test]
    fn draw_plan_covers_alive_slots(
        capacity in 1usize..32,
        ops in prop::collection::vec((0usize..8, 0usize..8), 1..40),
    ) {
        let mut pool = ParticlePool::new(capacity).unwrap();
        let mut t = 0.0f32;

        for (spawns, retire_upto) in ops {
            for _ in 0..spawns {
                t += 1.0;
                pool.spawn(cinder_engine::particles::Particle { spawn_time: t, ..Default::default() });
            }
            // Retire everything spawned more than `retire_upto` steps ago.
            pool.retire_expired(t, retire_upto as f32 + 0.5);

            let plan = DrawPlan::for_pool(&pool);
            let mut drawn: Vec<usize> = plan.as_slice().iter().flat_map(|r| r.slots()).collect();
            drawn.sort_unstable();
            let mut alive: Vec<usize> = pool.alive_slots().collect();
            alive.sort_unstable();

            prop_assert_eq!(drawn, alive);
            prop_assert!(plan.as_slice().len() <= 2);
            prop_assert!(plan.as_slice().iter().all(|r| r.quad_count > 0));
        }
    }
}

#[test]
fn default_emitter_settles_near_rate_times_lifetime() {
    let cfg = EmitterConfig::default();
    let expected = cfg.expected_population();
    let mut state = EmitterState::seeded(cfg, 99).unwrap();

    let dt = 1.0 / 60.0;
    let mut now = 0.0f32;
    for _ in 0..600 {
        now += dt;
        state.update(dt, now);
    }

    let living = state.living_count() as f32;
    assert!((living - expected).abs() <= 2.0, "living {living}, expected ~{expected}");
    assert_eq!(state.stats().dropped, 0);
}
