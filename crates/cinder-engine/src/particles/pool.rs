use std::ops::Range;

use super::config::validate_capacity;
use super::{ConfigError, Particle};

/// Shape of the living slots within the ring.
///
/// The span runs from `first_alive` (oldest) up to, but not including,
/// `first_dead` (next slot to fill), wrapping at the end of the array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliveSpan {
    /// No living particles.
    Empty,
    /// `first_alive < first_dead`: one run of slots.
    Contiguous(Range<usize>),
    /// `first_dead < first_alive`: `tail` (the older run, up to the end of the
    /// array) followed by `head` (from slot 0).
    Wrapped { tail: Range<usize>, head: Range<usize> },
    /// `first_alive == first_dead` with every slot alive.
    Full,
}

/// Fixed-capacity ring of particle records.
///
/// Particles are born at `first_dead` and die at `first_alive`. Because every
/// particle shares one lifetime and spawn times never decrease, the oldest
/// particle is always at `first_alive`, so retirement only ever advances that
/// cursor.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    records: Vec<Particle>,
    first_alive: usize,
    first_dead: usize,
    living: usize,
}

impl ParticlePool {
    /// Allocates `capacity` zeroed slots.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        validate_capacity(capacity)?;
        Ok(Self {
            records: vec![Particle::default(); capacity],
            first_alive: 0,
            first_dead: 0,
            living: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn living_count(&self) -> usize {
        self.living
    }

    #[inline]
    pub fn first_alive(&self) -> usize {
        self.first_alive
    }

    #[inline]
    pub fn first_dead(&self) -> usize {
        self.first_dead
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.living == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.living == self.capacity()
    }

    /// Every slot, dead ones included, in memory order.
    pub fn records(&self) -> &[Particle] {
        &self.records
    }

    pub fn span(&self) -> AliveSpan {
        if self.first_alive < self.first_dead {
            AliveSpan::Contiguous(self.first_alive..self.first_dead)
        } else if self.first_dead < self.first_alive {
            AliveSpan::Wrapped {
                tail: self.first_alive..self.capacity(),
                head: 0..self.first_dead,
            }
        } else if self.living == 0 {
            AliveSpan::Empty
        } else {
            AliveSpan::Full
        }
    }

    /// Living slot indices, oldest first.
    pub fn alive_slots(&self) -> impl Iterator<Item = usize> + use<> {
        let (older, newer) = match self.span() {
            AliveSpan::Empty => (0..0, 0..0),
            AliveSpan::Contiguous(run) => (run, 0..0),
            AliveSpan::Wrapped { tail, head } => (tail, head),
            AliveSpan::Full => (self.first_alive..self.capacity(), 0..self.first_alive),
        };
        older.chain(newer)
    }

    /// Living particles, oldest first.
    pub fn iter_alive(&self) -> impl Iterator<Item = (usize, &Particle)> + '_ {
        self.alive_slots().map(|i| (i, &self.records[i]))
    }

    /// Writes `particle` into the next free slot.
    ///
    /// Returns `false` and leaves the pool untouched when every slot is alive.
    pub fn spawn(&mut self, particle: Particle) -> bool {
        if self.is_full() {
            return false;
        }

        self.records[self.first_dead] = particle;
        self.first_dead = (self.first_dead + 1) % self.capacity();
        self.living += 1;
        true
    }

    /// Retires every particle whose age at `now` is at least `lifetime`.
    ///
    /// Walks the span oldest first and stops at the first survivor; everything
    /// after it is younger. Returns the number of retired particles.
    pub fn retire_expired(&mut self, now: f32, lifetime: f32) -> usize {
        let mut retired = 0;
        while self.living > 0 {
            if self.records[self.first_alive].age(now) < lifetime {
                break;
            }
            self.first_alive = (self.first_alive + 1) % self.capacity();
            self.living -= 1;
            retired += 1;
        }
        retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(spawn_time: f32) -> Particle {
        Particle { spawn_time, ..Default::default() }
    }

    fn check_invariants(pool: &ParticlePool) {
        let cap = pool.capacity();
        assert!(pool.first_alive() < cap);
        assert!(pool.first_dead() < cap);
        assert!(pool.living_count() <= cap);
        assert_eq!((pool.first_alive() + pool.living_count()) % cap, pool.first_dead());
        assert_eq!(pool.alive_slots().count(), pool.living_count());
    }

    /// Sweep over the whole span captured at entry, retiring one slot per
    /// expired particle regardless of where it sits.
    fn retire_full_scan(pool: &mut ParticlePool, now: f32, lifetime: f32) {
        let slots: Vec<usize> = match pool.span() {
            AliveSpan::Empty => Vec::new(),
            AliveSpan::Contiguous(run) => run.collect(),
            AliveSpan::Wrapped { tail, head } => tail.chain(head).collect(),
            AliveSpan::Full => (0..pool.capacity()).collect(),
        };
        for i in slots {
            if pool.records[i].age(now) >= lifetime {
                pool.first_alive = (pool.first_alive + 1) % pool.capacity();
                pool.living -= 1;
            }
        }
    }

    // ── construction ─────────────────────────────────────────────────────

    #[test]
    fn new_pool_is_empty() {
        let pool = ParticlePool::new(8).unwrap();
        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.span(), AliveSpan::Empty);
        assert!(pool.records().iter().all(|p| *p == Particle::default()));
        check_invariants(&pool);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(ParticlePool::new(0).unwrap_err(), ConfigError::ZeroCapacity);
    }

    // ── spawn ────────────────────────────────────────────────────────────

    #[test]
    fn spawn_fills_slots_in_order() {
        let mut pool = ParticlePool::new(4).unwrap();
        assert!(pool.spawn(at(0.0)));
        assert!(pool.spawn(at(1.0)));
        assert_eq!(pool.span(), AliveSpan::Contiguous(0..2));
        assert_eq!(pool.records()[1].spawn_time, 1.0);
        check_invariants(&pool);
    }

    #[test]
    fn filling_to_capacity_reaches_full_state() {
        let mut pool = ParticlePool::new(3).unwrap();
        for i in 0..3 {
            assert!(pool.spawn(at(i as f32)));
        }
        assert_eq!(pool.first_dead(), pool.first_alive());
        assert_eq!(pool.living_count(), 3);
        assert_eq!(pool.span(), AliveSpan::Full);

        let before = pool.records().to_vec();
        assert!(!pool.spawn(at(99.0)));
        assert_eq!(pool.records(), &before[..]);
        assert_eq!(pool.living_count(), 3);
        check_invariants(&pool);
    }

    // ── retire ───────────────────────────────────────────────────────────

    #[test]
    fn retire_uses_age_at_least_lifetime() {
        let mut pool = ParticlePool::new(4).unwrap();
        pool.spawn(at(0.0));
        pool.spawn(at(0.5));

        assert_eq!(pool.retire_expired(0.999, 1.0), 0);
        assert_eq!(pool.retire_expired(1.0, 1.0), 1);
        assert_eq!(pool.first_alive(), 1);
        assert_eq!(pool.retire_expired(5.0, 1.0), 1);
        assert_eq!(pool.span(), AliveSpan::Empty);
        assert_eq!(pool.first_alive(), pool.first_dead());
        check_invariants(&pool);
    }

    #[test]
    fn retire_on_empty_pool_is_noop() {
        let mut pool = ParticlePool::new(2).unwrap();
        assert_eq!(pool.retire_expired(100.0, 1.0), 0);
        check_invariants(&pool);
    }

    // ── span ─────────────────────────────────────────────────────────────

    #[test]
    fn wrapped_span_lists_tail_then_head() {
        // Capacity 5: spawn 4 (slots 0-3), retire 3, spawn 3 (slots 4, 0, 1).
        let mut pool = ParticlePool::new(5).unwrap();
        for t in 0..4 {
            pool.spawn(at(t as f32));
        }
        assert_eq!(pool.retire_expired(3.0, 1.0), 3);
        for t in 4..7 {
            pool.spawn(at(t as f32));
        }

        assert_eq!(pool.first_alive(), 3);
        assert_eq!(pool.first_dead(), 2);
        assert_eq!(pool.living_count(), 4);
        assert_eq!(pool.span(), AliveSpan::Wrapped { tail: 3..5, head: 0..2 });
        assert_eq!(pool.alive_slots().collect::<Vec<_>>(), vec![3, 4, 0, 1]);
        check_invariants(&pool);
    }

    #[test]
    fn full_span_iterates_oldest_first() {
        let mut pool = ParticlePool::new(3).unwrap();
        for t in 0..3 {
            pool.spawn(at(t as f32));
        }
        pool.retire_expired(1.0, 1.0);
        pool.spawn(at(3.0));

        assert_eq!(pool.span(), AliveSpan::Full);
        assert_eq!(pool.first_alive(), 1);
        let times: Vec<f32> = pool.iter_alive().map(|(_, p)| p.spawn_time).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn early_exit_matches_full_scan_on_full_wrapped_pool() {
        let mut pool = ParticlePool::new(4).unwrap();
        for t in 0..4 {
            pool.spawn(at(t as f32));
        }
        pool.retire_expired(2.0, 1.0);
        pool.spawn(at(4.0));
        pool.spawn(at(4.0));
        assert_eq!(pool.span(), AliveSpan::Full);

        let mut reference = pool.clone();
        retire_full_scan(&mut reference, 5.5, 2.0);
        pool.retire_expired(5.5, 2.0);

        assert_eq!(pool.first_alive(), reference.first_alive());
        assert_eq!(pool.first_dead(), reference.first_dead());
        assert_eq!(pool.living_count(), reference.living_count());
    }

    // ── properties ───────────────────────────────────────────────────────

    proptest! {
        /// Both retirement strategies land on the same cursors for any
        /// history of frame steps and spawn bursts.
        #[test]
        fn early_exit_retire_matches_full_scan(
            capacity in 1usize..24,
            lifetime in 0.05f32..2.0,
            frames in prop::collection::vec((0.0f32..0.5, 0usize..6), 1..80),
        ) {
            let mut fast = ParticlePool::new(capacity).unwrap();
            let mut slow = fast.clone();
            let mut now = 0.0f32;

            for (dt, spawns) in frames {
                now += dt;
                fast.retire_expired(now, lifetime);
                retire_full_scan(&mut slow, now, lifetime);
                prop_assert_eq!(fast.first_alive(), slow.first_alive());
                prop_assert_eq!(fast.living_count(), slow.living_count());

                for _ in 0..spawns {
                    let a = fast.spawn(at(now));
                    let b = slow.spawn(at(now));
                    prop_assert_eq!(a, b);
                }
                check_invariants(&fast);
            }
        }
    }
}
