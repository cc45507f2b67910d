use std::ops::Range;

use super::{AliveSpan, ParticlePool};

/// One indexed draw over consecutive ring slots.
///
/// The vertex stage reads slot `start_index + vertex_index / 4`, so a range
/// always starts at index 0 of the shared quad index buffer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DrawRange {
    pub start_index: u32,
    pub quad_count: u32,
}

impl DrawRange {
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.quad_count * INDICES_PER_QUAD
    }

    /// Ring slots covered by this draw.
    #[inline]
    pub fn slots(&self) -> Range<usize> {
        let start = self.start_index as usize;
        start..start + self.quad_count as usize
    }

    fn over(slots: Range<usize>) -> Option<Self> {
        if slots.is_empty() {
            return None;
        }
        // Capacity is validated to fit 4 * capacity in u32.
        Some(Self {
            start_index: slots.start as u32,
            quad_count: slots.len() as u32,
        })
    }
}

/// The draw calls needed to cover a pool's alive span: zero, one or two.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DrawPlan {
    ranges: [DrawRange; MAX_DRAWS],
    len: usize,
}

impl DrawPlan {
    /// Follows the pool's span:
    /// - contiguous: one draw from `first_alive`
    /// - wrapped: `[0, first_dead)` first, then `[first_alive, capacity)`
    /// - full: one draw over the whole array from slot 0
    /// - empty: nothing
    pub fn for_pool(pool: &ParticlePool) -> Self {
        let mut plan = Self::default();
        match pool.span() {
            AliveSpan::Empty => {}
            AliveSpan::Contiguous(run) => plan.push(run),
            AliveSpan::Wrapped { tail, head } => {
                plan.push(head);
                plan.push(tail);
            }
            AliveSpan::Full => plan.push(0..pool.capacity()),
        }
        plan
    }

    fn push(&mut self, slots: Range<usize>) {
        if let Some(range) = DrawRange::over(slots) {
            self.ranges[self.len] = range;
            self.len += 1;
        }
    }

    pub fn as_slice(&self) -> &[DrawRange] {
        &self.ranges[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total quads across all draws.
    pub fn quad_count(&self) -> u32 {
        self.as_slice().iter().map(|r| r.quad_count).sum()
    }
}

/// Maximum number of draws a plan can hold.
pub const MAX_DRAWS: usize = 2;

pub(crate) const INDICES_PER_QUAD: u32 = 6;

/// Two triangles per quad over four procedurally placed corners.
const QUAD_PATTERN: [u32; INDICES_PER_QUAD as usize] = [0, 1, 2, 0, 2, 3];

/// Index buffer contents for `quads` quads: the pattern repeated with a
/// stride of four vertices.
pub fn quad_indices(quads: usize) -> Vec<u32> {
    (0..quads as u32)
        .flat_map(|q| QUAD_PATTERN.map(|i| q * 4 + i))
        .collect()
}
