//! Joint angle calculation using dot product
//!
//! Calculates the angle at a vertex joint from the rays vertex→proximal
//! and vertex→distal. Works in 3D; 2D input simply carries z = 0.

use nalgebra::Vector3;

/// Rays shorter than this are treated as degenerate
const MIN_RAY_LENGTH: f32 = 1e-6;

/// Calculate the angle at `b` in degrees
///
/// Uses dot product formula: cos(θ) = (v1 · v2) / (|v1| × |v2|)
///
/// Returns `None` when either ray has zero length or the input is not
/// finite. Callers treat that as "angle unavailable", never as 0°.
pub fn angle_at(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Option<f32> {
    let ba = a - b;
    let bc = c - b;

    let mag1 = ba.norm();
    let mag2 = bc.norm();

    if !mag1.is_finite() || !mag2.is_finite() {
        return None;
    }
    if mag1 < MIN_RAY_LENGTH || mag2 < MIN_RAY_LENGTH {
        return None;
    }

    // Clamp guards acos against float overshoot past ±1
    let cos_angle = (ba.dot(&bc) / (mag1 * mag2)).clamp(-1.0, 1.0);

    Some(cos_angle.acos().to_degrees())
}
