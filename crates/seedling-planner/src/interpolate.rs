//! Linear interpolation of joint vectors and rigid transforms.
//!
//! Both functions return `steps + 1` samples: index 0 is `start`, index
//! `steps` is exactly `end`. Callers drop the first sample when emitting.

use nalgebra::{DVector, Translation3};

use seedling_core::types::Pose;

/// Evenly spaced joint vectors from `start` to `end`.
///
/// # Panics
///
/// Panics if `start` and `end` differ in length.
#[allow(clippy::cast_precision_loss)]
pub fn interpolate_joints(start: &DVector<f64>, end: &DVector<f64>, steps: usize) -> Vec<DVector<f64>> {
    assert_eq!(start.len(), end.len(), "interpolation endpoints must have equal DOF");
    if steps == 0 {
        return vec![start.clone()];
    }

    let delta = end - start;
    let mut samples: Vec<DVector<f64>> = (0..steps)
        .map(|i| start + &delta * (i as f64 / steps as f64))
        .collect();
    samples.push(end.clone());
    samples
}

/// Evenly spaced poses: translation lerped, rotation slerped along the
/// shortest arc.
#[allow(clippy::cast_precision_loss)]
pub fn interpolate_poses(start: &Pose, end: &Pose, steps: usize) -> Vec<Pose> {
    if steps == 0 {
        return vec![*start];
    }

    let relative = start.rotation.inverse() * end.rotation;
    let mut samples: Vec<Pose> = (0..steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let translation = start.translation.vector.lerp(&end.translation.vector, t);
            Pose::from_parts(Translation3::from(translation), start.rotation * relative.powf(t))
        })
        .collect();
    samples.push(*end);
    samples
}
