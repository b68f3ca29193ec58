use nalgebra::{Vector2, Vector3};
use std::ops::{Add, Mul, Sub};

/// Returns the `index`-th of `count` evenly spaced values from `start` to `end`.
///
/// The first sample is exactly `start` and the last exactly `end`, so callers that walk
/// a range lazily see the same endpoints as [`interpolate_values`].
#[inline]
pub fn sample_at<T>(start: T, end: T, count: usize, index: usize) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    if index == 0 || count < 2 {
        return start;
    }
    if index + 1 >= count {
        return end;
    }
    let ratio = index as f32 / (count - 1) as f32;
    start + (end - start) * ratio
}

/// Produces `count` evenly spaced values from `start` to `end` inclusive.
///
/// - `count == 0` yields nothing.
/// - `count == 1` yields `[start]`.
/// - otherwise the first value is `start` and the last is `end`.
pub fn interpolate_values<T>(start: T, end: T, count: usize) -> Vec<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    (0..count)
        .map(|index| sample_at(start, end, count, index))
        .collect()
}

pub fn interpolate(start: f32, end: f32, count: usize) -> Vec<f32> {
    interpolate_values(start, end, count)
}

pub fn interpolate_2d(start: Vector2<f32>, end: Vector2<f32>, count: usize) -> Vec<Vector2<f32>> {
    interpolate_values(start, end, count)
}

pub fn interpolate_3d(start: Vector3<f32>, end: Vector3<f32>, count: usize) -> Vec<Vector3<f32>> {
    interpolate_values(start, end, count)
}
