//! Landmark geometry: eye aspect ratio and head tilt
//!
//! Pure functions, no state. The six-point eye convention is
//! p1/p4 = horizontal corners, (p2, p6) and (p3, p5) = vertical lid pairs.

use serde::{Deserialize, Serialize};

use crate::landmarks::{LandmarkSet, Point2};
use crate::DmsError;

/// Horizontal eye widths below this are treated as a failed detection
pub const MIN_EYE_WIDTH: f32 = 1e-3;

/// Eye aspect ratio for both eyes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeOpenness {
    pub left: f32,
    pub right: f32,
    /// Mean of both eyes, the value fed to debouncing
    pub average: f32,
}

/// EAR = (|p2 - p6| + |p3 - p5|) / (2 |p1 - p4|)
pub fn eye_aspect_ratio(eye: &[Point2; 6]) -> Result<f32, DmsError> {
    let vertical_a = eye[1].distance(&eye[5]);
    let vertical_b = eye[2].distance(&eye[4]);
    let horizontal = eye[0].distance(&eye[3]);

    // Negated comparison so a NaN width is rejected too
    if !(horizontal >= MIN_EYE_WIDTH) {
        return Err(DmsError::DegenerateGeometry);
    }

    let ear = (vertical_a + vertical_b) / (2.0 * horizontal);
    if ear.is_finite() {
        Ok(ear)
    } else {
        Err(DmsError::DegenerateGeometry)
    }
}

/// Tilt magnitude in degrees of the line through the two outer eye corners.
///
/// Unsigned and independent of point order, so the result lies in `[0, 90]`.
pub fn head_tilt_angle(left_outer: Point2, right_outer: Point2) -> f32 {
    let dx = right_outer.x - left_outer.x;
    let dy = right_outer.y - left_outer.y;
    let angle = dy.atan2(dx).to_degrees().abs();
    if angle > 90.0 {
        180.0 - angle
    } else {
        angle
    }
}

/// EAR of both eyes of a face
pub fn eye_openness(face: &LandmarkSet) -> Result<EyeOpenness, DmsError> {
    let left = eye_aspect_ratio(&face.left_eye()?)?;
    let right = eye_aspect_ratio(&face.right_eye()?)?;
    Ok(EyeOpenness {
        left,
        right,
        average: (left + right) / 2.0,
    })
}

/// Head tilt of a face
pub fn face_tilt(face: &LandmarkSet) -> Result<f32, DmsError> {
    let (left, right) = face.outer_eye_corners()?;
    Ok(head_tilt_angle(left, right))
}
