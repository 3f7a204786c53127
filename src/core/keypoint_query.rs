// Keypoint queries - lookup, confidence gating, and 2-D geometry over a frame

use crate::models::pose::{Frame, Keypoint};

/// Get a keypoint by name (first match)
pub fn by_name<'a>(frame: &'a Frame, name: &str) -> Option<&'a Keypoint> {
    frame.get(name)
}

/// True if the keypoint exists, has a score, and the score is strictly above `threshold`
pub fn has_confidence(keypoint: Option<&Keypoint>, threshold: f32) -> bool {
    keypoint
        .and_then(|kp| kp.score)
        .map_or(false, |score| score > threshold)
}

/// True if every keypoint passes `has_confidence`; an empty slice passes
pub fn all_have_confidence(keypoints: &[Option<&Keypoint>], threshold: f32) -> bool {
    keypoints.iter().all(|kp| has_confidence(*kp, threshold))
}

/// `a` is higher on screen than `b` (y grows downward)
pub fn is_above(a: &Keypoint, b: &Keypoint) -> bool {
    a.y < b.y
}

/// `a` is left of `b` in the unmirrored source frame
pub fn is_left_of(a: &Keypoint, b: &Keypoint) -> bool {
    a.x < b.x
}

/// Interior angle at `mid` in degrees, in [0, 180]
///
/// Uses the dot product formula: cos(θ) = (v1 · v2) / (|v1| × |v2|)
///
/// Returns 0 when any point is missing or either ray has zero length.
pub fn angle(p1: Option<&Keypoint>, mid: Option<&Keypoint>, p2: Option<&Keypoint>) -> f32 {
    let (p1, mid, p2) = match (p1, mid, p2) {
        (Some(p1), Some(mid), Some(p2)) => (p1, mid, p2),
        _ => return 0.0,
    };

    let v1 = (p1.x - mid.x, p1.y - mid.y);
    let v2 = (p2.x - mid.x, p2.y - mid.y);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    let denominator = mag1 * mag2;
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    // Rounding can push the ratio just outside acos's domain
    let cos_angle = (dot / denominator).clamp(-1.0, 1.0);
    let degrees = cos_angle.acos().to_degrees();
    if degrees.is_nan() {
        0.0
    } else {
        degrees
    }
}
