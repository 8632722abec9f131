//! Circular arc in an axis plane, with optional linear motion of the other
//! axes (helix).

use core::f32::consts::{FRAC_1_SQRT_2, TAU};

use crate::error::MotionError;

use super::{norm, Trajectory};

/// Distance in units the end point may lie off the circle.
const ARC_END_TOLERANCE: f32 = 0.005;

/// The same allowance relative to the radius, for large arcs.
const ARC_END_TOLERANCE_RATIO: f32 = 0.001;

/// The two axes an arc turns in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcPlane {
    /// Axis of the first plane coordinate.
    pub first: usize,
    /// Axis of the second plane coordinate.
    pub second: usize,
}

impl ArcPlane {
    /// The plane of axes 0 and 1.
    pub const XY: Self = Self { first: 0, second: 1 };

    /// Create a plane from two axis indices.
    pub const fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }
}

/// An arc around a center, parameterised by the distance from `start`.
///
/// When `start` and `end` coincide in the plane the arc is a full circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc<const N: usize> {
    start: [f32; N],
    end: [f32; N],
    plane: ArcPlane,
    center: [f32; 2],
    radius: f32,
    start_angle: f32,
    /// Signed angle swept, positive counter-clockwise.
    sweep: f32,
    /// Displacement of the axes outside the plane.
    linear: [f32; N],
    planar_length: f32,
    length: f32,
}

impl<const N: usize> Arc<N> {
    /// Create an arc from `start` to `end` around `center`, expressed in the
    /// plane's coordinates.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidArc` when the plane axes are out of range
    /// or equal, when the radius is zero, or when `end` is off the circle.
    pub fn new(
        start: [f32; N],
        end: [f32; N],
        center: [f32; 2],
        plane: ArcPlane,
        clockwise: bool,
    ) -> Result<Self, MotionError> {
        let (a, b) = (plane.first, plane.second);
        if a >= N || b >= N || a == b {
            return Err(MotionError::InvalidArc);
        }

        let radius = libm::hypotf(start[a] - center[0], start[b] - center[1]);
        if !radius.is_finite() || radius <= 0.0 {
            return Err(MotionError::InvalidArc);
        }

        let end_radius = libm::hypotf(end[a] - center[0], end[b] - center[1]);
        let drift = (end_radius - radius).abs();
        if !end_radius.is_finite() || (drift > ARC_END_TOLERANCE && drift > ARC_END_TOLERANCE_RATIO * radius) {
            return Err(MotionError::InvalidArc);
        }

        let start_angle = libm::atan2f(start[b] - center[1], start[a] - center[0]);
        let end_angle = libm::atan2f(end[b] - center[1], end[a] - center[0]);

        let mut sweep = end_angle - start_angle;
        if clockwise {
            if sweep >= 0.0 {
                sweep -= TAU;
            }
        } else if sweep <= 0.0 {
            sweep += TAU;
        }

        let linear: [f32; N] =
            core::array::from_fn(|i| if i == a || i == b { 0.0 } else { end[i] - start[i] });
        let planar_length = radius * sweep.abs();
        let linear_length = norm(&linear);
        let length = libm::sqrtf(planar_length * planar_length + linear_length * linear_length);

        Ok(Self {
            start,
            end,
            plane,
            center,
            radius,
            start_angle,
            sweep,
            linear,
            planar_length,
            length,
        })
    }

    /// Radius in units.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Signed swept angle in radians, positive counter-clockwise.
    pub fn sweep(&self) -> f32 {
        self.sweep
    }

    /// Path length in units.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// End position.
    pub fn end(&self) -> [f32; N] {
        self.end
    }
}

impl<const N: usize> Trajectory<N> for Arc<N> {
    fn bounds(&self) -> (f32, f32) {
        (0.0, self.length)
    }

    fn position(&self, t: f32) -> [f32; N] {
        if t >= self.length {
            return self.end;
        }
        if t <= 0.0 {
            return self.start;
        }

        let f = t / self.length;
        let angle = self.start_angle + self.sweep * f;
        let mut position: [f32; N] = core::array::from_fn(|i| self.start[i] + self.linear[i] * f);
        position[self.plane.first] = self.center[0] + self.radius * libm::cosf(angle);
        position[self.plane.second] = self.center[1] + self.radius * libm::sinf(angle);
        position
    }

    fn path_length(&self, from: f32, to: f32) -> f32 {
        (to - from).abs()
    }

    fn direction_at(&self, t: f32) -> [f32; N] {
        let f = (t / self.length).clamp(0.0, 1.0);
        let angle = self.start_angle + self.sweep * f;
        // d(angle)/dt scaled by the radius gives the planar speed
        let planar = self.radius * self.sweep / self.length;
        let mut direction: [f32; N] = core::array::from_fn(|i| self.linear[i] / self.length);
        direction[self.plane.first] = -planar * libm::sinf(angle);
        direction[self.plane.second] = planar * libm::cosf(angle);
        direction
    }

    fn planning_distances(&self) -> [f32; N] {
        let mut distances = self.linear;
        distances[self.plane.first] = self.planar_length * FRAC_1_SQRT_2;
        distances[self.plane.second] = self.planar_length * FRAC_1_SQRT_2;
        distances
    }

    fn peak_fractions(&self) -> [f32; N] {
        let mut peaks: [f32; N] = core::array::from_fn(|i| self.linear[i].abs() / self.length);
        let planar = self.planar_length / self.length;
        peaks[self.plane.first] = planar;
        peaks[self.plane.second] = planar;
        peaks
    }
}
