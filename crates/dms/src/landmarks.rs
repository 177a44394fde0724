//! Facial landmark sets (68-point convention)

use serde::{Deserialize, Serialize};

use crate::DmsError;

/// Number of points in a full landmark set
pub const LANDMARK_COUNT: usize = 68;

/// Landmark indices with semantic meaning
pub mod indices {
    use std::ops::Range;

    /// Left eye contour (p1..p6, clockwise from the outer corner)
    pub const LEFT_EYE: Range<usize> = 36..42;
    /// Right eye contour (p1..p6, clockwise from the inner corner)
    pub const RIGHT_EYE: Range<usize> = 42..48;
    /// Outer corner of the left eye
    pub const LEFT_EYE_OUTER: usize = 36;
    /// Outer corner of the right eye
    pub const RIGHT_EYE_OUTER: usize = 45;
}

/// 2D image-space point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point2) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Ordered facial keypoints for a single face, produced fresh every frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Point2>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Six-point contour of the left eye
    pub fn left_eye(&self) -> Result<[Point2; 6], DmsError> {
        self.eye(indices::LEFT_EYE)
    }

    /// Six-point contour of the right eye
    pub fn right_eye(&self) -> Result<[Point2; 6], DmsError> {
        self.eye(indices::RIGHT_EYE)
    }

    /// Outer eye corners (left, right) used for head tilt
    pub fn outer_eye_corners(&self) -> Result<(Point2, Point2), DmsError> {
        Ok((
            self.point(indices::LEFT_EYE_OUTER)?,
            self.point(indices::RIGHT_EYE_OUTER)?,
        ))
    }

    /// Area of the axis-aligned box enclosing every point
    pub fn bounding_area(&self) -> f32 {
        let Some(first) = self.points.first() else {
            return 0.0;
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        (max_x - min_x) * (max_y - min_y)
    }

    fn point(&self, index: usize) -> Result<Point2, DmsError> {
        self.points.get(index).copied().ok_or(DmsError::KeypointsMissing {
            expected: LANDMARK_COUNT,
            found: self.points.len(),
        })
    }

    fn eye(&self, range: std::ops::Range<usize>) -> Result<[Point2; 6], DmsError> {
        let slice = self.points.get(range).ok_or(DmsError::KeypointsMissing {
            expected: LANDMARK_COUNT,
            found: self.points.len(),
        })?;
        let mut eye = [Point2::default(); 6];
        eye.copy_from_slice(slice);
        Ok(eye)
    }

    /// Build a synthetic face centred in a 480x360 frame.
    ///
    /// Both eyes get exactly `ear` as their aspect ratio and the outer eye
    /// corners are rotated `tilt_degrees` from the horizontal.
    pub fn synthetic(ear: f32, tilt_degrees: f32) -> Self {
        Self::synthetic_at(Point2::new(240.0, 180.0), 60.0, ear, tilt_degrees)
    }

    /// Build a synthetic face at `center`, `scale` pixels from the nose to the eye centres.
    pub fn synthetic_at(center: Point2, scale: f32, ear: f32, tilt_degrees: f32) -> Self {
        let eye_width = scale * 0.5;
        let half_height = ear * eye_width / 2.0;

        // Eye contour relative to the eye centre, p1..p6
        let eye = |cx: f32| {
            [
                Point2::new(cx - eye_width / 2.0, 0.0),
                Point2::new(cx - eye_width / 6.0, -half_height),
                Point2::new(cx + eye_width / 6.0, -half_height),
                Point2::new(cx + eye_width / 2.0, 0.0),
                Point2::new(cx + eye_width / 6.0, half_height),
                Point2::new(cx - eye_width / 6.0, half_height),
            ]
        };

        // Everything else sits on a ring so the face has a realistic extent
        let mut points: Vec<Point2> = (0..LANDMARK_COUNT)
            .map(|i| {
                let theta = i as f32 / LANDMARK_COUNT as f32 * std::f32::consts::TAU;
                Point2::new(theta.cos() * scale * 1.5, theta.sin() * scale * 1.5)
            })
            .collect();
        points[indices::LEFT_EYE].copy_from_slice(&eye(-scale * 0.5));
        points[indices::RIGHT_EYE].copy_from_slice(&eye(scale * 0.5));

        let (sin, cos) = tilt_degrees.to_radians().sin_cos();
        let points = points
            .into_iter()
            .map(|p| {
                Point2::new(
                    center.x + p.x * cos - p.y * sin,
                    center.y + p.x * sin + p.y * cos,
                )
            })
            .collect();

        Self::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_extraction() {
        let face = LandmarkSet::synthetic(0.3, 0.0);
        let left = face.left_eye().unwrap();
        let right = face.right_eye().unwrap();

        assert_eq!(left[0], face.points()[36]);
        assert_eq!(right[5], face.points()[47]);
        let (l, r) = face.outer_eye_corners().unwrap();
        assert!(l.x < r.x);
    }

    #[test]
    fn test_short_set_reports_missing_keypoints() {
        let face = LandmarkSet::new(vec![Point2::new(0.0, 0.0); 40]);
        assert!(matches!(
            face.right_eye(),
            Err(DmsError::KeypointsMissing { expected: 68, found: 40 })
        ));
        assert!(face.outer_eye_corners().is_err());
    }

    #[test]
    fn test_bounding_area() {
        let face = LandmarkSet::new(vec![
            Point2::new(10.0, 10.0),
            Point2::new(30.0, 15.0),
            Point2::new(20.0, 50.0),
        ]);
        assert_eq!(face.bounding_area(), 20.0 * 40.0);
        assert_eq!(LandmarkSet::new(vec![]).bounding_area(), 0.0);
    }

    #[test]
    fn test_larger_scale_means_larger_face() {
        let near = LandmarkSet::synthetic_at(Point2::new(100.0, 100.0), 80.0, 0.3, 0.0);
        let far = LandmarkSet::synthetic_at(Point2::new(300.0, 100.0), 30.0, 0.3, 0.0);
        assert!(near.bounding_area() > far.bounding_area());
    }

    #[test]
    fn test_json_is_a_list_of_points() {
        let face = LandmarkSet::new(vec![Point2::new(1.0, 2.0)]);
        let json = serde_json::to_string(&face).unwrap();
        assert_eq!(json, r#"[{"x":1.0,"y":2.0}]"#);
    }
}
