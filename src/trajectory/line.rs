//! Straight segment.

use super::{norm, Trajectory};

/// A straight segment between two positions, parameterised by the distance
/// from `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<const N: usize> {
    start: [f32; N],
    end: [f32; N],
    length: f32,
}

impl<const N: usize> Line<N> {
    /// Create a segment.
    pub fn new(start: [f32; N], end: [f32; N]) -> Self {
        let delta: [f32; N] = core::array::from_fn(|i| end[i] - start[i]);
        Self {
            start,
            end,
            length: norm(&delta),
        }
    }

    /// Start position.
    pub fn start(&self) -> [f32; N] {
        self.start
    }

    /// End position.
    pub fn end(&self) -> [f32; N] {
        self.end
    }

    /// Length in units.
    pub fn length(&self) -> f32 {
        self.length
    }
}

impl<const N: usize> Trajectory<N> for Line<N> {
    fn bounds(&self) -> (f32, f32) {
        (0.0, self.length)
    }

    fn position(&self, t: f32) -> [f32; N] {
        // The end is returned verbatim so consecutive segments never drift
        if self.length <= 0.0 || t >= self.length {
            return self.end;
        }
        if t <= 0.0 {
            return self.start;
        }
        let f = t / self.length;
        core::array::from_fn(|i| self.start[i] + (self.end[i] - self.start[i]) * f)
    }

    fn path_length(&self, from: f32, to: f32) -> f32 {
        (to - from).abs()
    }

    fn direction_at(&self, _t: f32) -> [f32; N] {
        if self.length <= 0.0 {
            return [0.0; N];
        }
        core::array::from_fn(|i| (self.end[i] - self.start[i]) / self.length)
    }

    fn planning_distances(&self) -> [f32; N] {
        core::array::from_fn(|i| self.end[i] - self.start[i])
    }

    fn peak_fractions(&self) -> [f32; N] {
        let direction = self.direction_at(0.0);
        core::array::from_fn(|i| direction[i].abs())
    }
}
