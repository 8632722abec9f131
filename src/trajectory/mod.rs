//! Trajectory module for stepper-tracer.
//!
//! A trajectory is a position function over a scalar parameter. The
//! sub-movement manager samples it at increasing parameter values and turns
//! the differences into per-axis step counts. Both built-in trajectories are
//! parameterised by path length, so the parameter is also the distance
//! travelled from the start.

mod arc;
mod line;

pub use arc::{Arc, ArcPlane};
pub use line::Line;

/// Position function of a movement on `N` axes.
pub trait Trajectory<const N: usize> {
    /// Natural parameter range of the trajectory.
    fn bounds(&self) -> (f32, f32);

    /// Position in units at parameter `t`.
    fn position(&self, t: f32) -> [f32; N];

    /// Distance travelled along the path between two parameter values.
    fn path_length(&self, from: f32, to: f32) -> f32;

    /// Unit tangent at parameter `t`.
    fn direction_at(&self, t: f32) -> [f32; N];

    /// Per-axis distances used to project a speed group's feed rate.
    ///
    /// Their Euclidean norm is the path length.
    fn planning_distances(&self) -> [f32; N];

    /// Largest fraction of the path speed each axis reaches along the path.
    fn peak_fractions(&self) -> [f32; N];
}

/// The trajectories a movement can follow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Path<const N: usize> {
    /// Straight segment.
    Line(Line<N>),
    /// Circular (or helical) arc.
    Arc(Arc<N>),
}

impl<const N: usize> Trajectory<N> for Path<N> {
    fn bounds(&self) -> (f32, f32) {
        match self {
            Path::Line(line) => line.bounds(),
            Path::Arc(arc) => arc.bounds(),
        }
    }

    fn position(&self, t: f32) -> [f32; N] {
        match self {
            Path::Line(line) => line.position(t),
            Path::Arc(arc) => arc.position(t),
        }
    }

    fn path_length(&self, from: f32, to: f32) -> f32 {
        match self {
            Path::Line(line) => line.path_length(from, to),
            Path::Arc(arc) => arc.path_length(from, to),
        }
    }

    fn direction_at(&self, t: f32) -> [f32; N] {
        match self {
            Path::Line(line) => line.direction_at(t),
            Path::Arc(arc) => arc.direction_at(t),
        }
    }

    fn planning_distances(&self) -> [f32; N] {
        match self {
            Path::Line(line) => line.planning_distances(),
            Path::Arc(arc) => arc.planning_distances(),
        }
    }

    fn peak_fractions(&self) -> [f32; N] {
        match self {
            Path::Line(line) => line.peak_fractions(),
            Path::Arc(arc) => arc.peak_fractions(),
        }
    }
}

impl<const N: usize> From<Line<N>> for Path<N> {
    fn from(line: Line<N>) -> Self {
        Path::Line(line)
    }
}

impl<const N: usize> From<Arc<N>> for Path<N> {
    fn from(arc: Arc<N>) -> Self {
        Path::Arc(arc)
    }
}

/// Euclidean norm of a vector.
pub(crate) fn norm<const N: usize>(v: &[f32; N]) -> f32 {
    libm::sqrtf(v.iter().map(|x| x * x).sum())
}
