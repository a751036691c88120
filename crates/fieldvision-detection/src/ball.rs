use image::RgbImage;

use crate::color::ColorRange;
use crate::contour::extract_contours;
use crate::geometry::CameraModel;
use crate::shape::min_enclosing_circle;
use crate::types::{BallDetection, SENTINEL};

/// Per-target-class calibration for ball detection.
#[derive(Clone, Copy, Debug)]
pub struct BallConfig {
    pub color: ColorRange,
    pub min_radius_px: f64,
    pub known_radius_in: f64,
}

/// Finds every ball-colored blob whose enclosing circle clears the minimum
/// radius and ranks them largest-first (closest-first, since apparent size
/// is inverse to distance).
///
/// Ties in radius keep the contour-scan order of the extractor, which is an
/// accepted non-determinism source tied to its internal ordering. An empty
/// result means "nothing seen" and is not an error.
pub fn detect_balls(
    frame: &RgbImage,
    camera: &CameraModel,
    config: &BallConfig,
) -> Vec<BallDetection> {
    let mut circles: Vec<_> = extract_contours(frame, &config.color)
        .iter()
        .filter_map(|contour| min_enclosing_circle(&contour.points))
        .filter(|circle| circle.radius_px >= config.min_radius_px)
        .collect();
    circles.sort_by(|a, b| b.radius_px.total_cmp(&a.radius_px));

    circles
        .into_iter()
        .map(|circle| {
            let mut detection = BallDetection {
                found: true,
                center_x_px: circle.center_x,
                center_y_px: circle.center_y,
                radius_px: circle.radius_px,
                distance_in: SENTINEL,
                angle_deg: SENTINEL,
                offset_in: 0.0,
                screen_fraction: camera.circle_screen_fraction(circle.radius_px),
            };
            if circle.radius_px > 0.0 {
                let ipp = config.known_radius_in / circle.radius_px;
                if let Some(distance) = camera.distance_from_scale(ipp) {
                    let raw_offset = camera.lateral_offset_in(ipp, circle.center_x);
                    if let Some(bearing) = camera.bearing_deg(raw_offset, distance) {
                        detection.distance_in = distance;
                        detection.angle_deg = bearing;
                        detection.offset_in = -raw_offset;
                    }
                }
            }
            detection
        })
        .collect()
}
