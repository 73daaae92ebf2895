//! Numeric trait aliases used throughout the crate

use nalgebra::RealField;
use num::Float;

/// Trait alias for floating point types used for mesh vertex and bound coordinates.
///
/// Implemented for `f32` and `f64` via the blanket impl below; mirrors the role of
/// `splashsurf_lib`'s own `Real` trait alias.
pub trait Real: RealField + Float + Copy + ThreadSafe + 'static {}
impl<T> Real for T where T: RealField + Float + Copy + ThreadSafe + 'static {}

/// Trait alias for types that can be safely shared and sent across the worker pool.
pub trait ThreadSafe: Send + Sync {}
impl<T> ThreadSafe for T where T: Send + Sync {}
