//! Shared pinhole-camera math used by every detector.
//!
//! The size-to-distance conversion puts the *full* horizontal field of
//! view inside the tangent. Calibration constants in the field settings
//! files were measured against that formula, so changing it to the
//! textbook half-FOV form would silently rescale every distance.

/// Threshold below which a denominator is treated as degenerate.
const EPSILON: f64 = 1e-9;

/// Static description of one camera. Loaded once and read-only afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraModel {
    pub width_px: u32,
    pub height_px: u32,
    pub horizontal_fov_deg: f64,
}

impl CameraModel {
    // Distance from apparent size: inches-per-pixel scaled by the
    // FOV-derived pixel focal term. `None` when the scale is degenerate.
    pub fn distance_from_scale(&self, inches_per_pixel: f64) -> Option<f64> {
        let tan = self.horizontal_fov_deg.to_radians().tan();
        if tan.abs() < EPSILON || inches_per_pixel <= 0.0 {
            return None;
        }
        Some(inches_per_pixel * self.width_px as f64 / (2.0 * tan))
    }

    // Real-world lateral offset of a pixel column from image center,
    // positive to the right. Detectors negate this into the robot frame
    // when reporting; the bearing is computed from the raw value.
    pub fn lateral_offset_in(&self, inches_per_pixel: f64, center_x_px: f64) -> f64 {
        inches_per_pixel * (center_x_px - self.width_px as f64 / 2.0)
    }

    // Bearing to the target from its raw lateral offset and distance.
    pub fn bearing_deg(&self, offset_in: f64, distance_in: f64) -> Option<f64> {
        if distance_in.abs() < EPSILON {
            return None;
        }
        Some((offset_in / distance_in).atan().to_degrees())
    }

    // Fraction of the screen covered by a circle of the given radius.
    pub fn circle_screen_fraction(&self, radius_px: f64) -> f64 {
        std::f64::consts::PI * radius_px * radius_px
            / (self.width_px as f64 * self.height_px as f64)
    }

    // Fraction of the screen covered by an axis-aligned box.
    pub fn box_screen_fraction(&self, width_px: f64, height_px: f64) -> f64 {
        width_px * height_px / (self.width_px as f64 * self.height_px as f64)
    }
}

/// Mount calibration for the slant-corrected tape distance model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MountModel {
    pub focal_length_px: f64,
    pub mount_angle_deg: f64,
}

/// Slant-corrected distance estimate for a paired-stripe target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlantDistance {
    pub straight_in: f64,
    pub ground_in: f64,
    pub corrected_in: f64,
    pub bot_angle_deg: f64,
}

impl MountModel {
    /// Full slant model: straight-line distance from the focal length and
    /// the target's known physical width, projected to the ground by the
    /// mount angle, then corrected for the robot's heading offset.
    ///
    /// The heading is `2 *` the camera-observed stripe rotation, which
    /// assumes the stripe pair sits symmetric about the optical axis; that
    /// is a modeling assumption, not a universal law.
    pub fn slant_distance(
        &self,
        known_width_in: f64,
        target_width_px: f64,
        stripe_angle_deg: f64,
    ) -> Option<SlantDistance> {
        if target_width_px.abs() < EPSILON {
            return None;
        }
        let straight_in = known_width_in * self.focal_length_px / target_width_px;
        let ground_in = straight_in * self.mount_angle_deg.to_radians().cos();

        let bot_angle_deg = 2.0 * camera_angle_deg(stripe_angle_deg);
        let cos_bot = bot_angle_deg.to_radians().cos();
        if cos_bot.abs() < EPSILON {
            return None;
        }
        Some(SlantDistance {
            straight_in,
            ground_in,
            corrected_in: ground_in / cos_bot,
            bot_angle_deg,
        })
    }
}

// Normalizes an oriented-box rotation to the camera's angular offset in
// [0, 45]: magnitudes above 45 reflect as `90 - angle`.
pub fn camera_angle_deg(stripe_angle_deg: f64) -> f64 {
    let magnitude = stripe_angle_deg.abs() % 90.0;
    if magnitude > 45.0 {
        90.0 - magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn field_cam() -> CameraModel {
        CameraModel {
            width_px: 960,
            height_px: 720,
            horizontal_fov_deg: 22.5,
        }
    }

    #[test]
    fn field_calibration_distance_and_bearing() {
        // 40 px ball of known radius 3.5 in, centered at x = 500.
        let cam = field_cam();
        let ipp = 3.5 / 40.0;
        let distance = cam.distance_from_scale(ipp).unwrap();
        assert_relative_eq!(distance, 101.4, epsilon = 0.05);

        let offset = cam.lateral_offset_in(ipp, 500.0);
        assert_relative_eq!(offset, 1.75, epsilon = 1e-9);
        let bearing = cam.bearing_deg(offset, distance).unwrap();
        assert_relative_eq!(bearing, 0.99, epsilon = 0.01);
    }

    #[test]
    fn distance_shrinks_as_apparent_radius_grows() {
        let cam = field_cam();
        let d_small = cam.distance_from_scale(3.5 / 20.0).unwrap();
        let d_large = cam.distance_from_scale(3.5 / 80.0).unwrap();
        assert!(d_large < d_small);
    }

    #[test]
    fn degenerate_scale_yields_none() {
        let cam = field_cam();
        assert!(cam.distance_from_scale(0.0).is_none());
        assert!(cam.bearing_deg(1.0, 0.0).is_none());
    }

    #[test]
    fn full_fov_tangent_is_degenerate_at_ninety_degrees() {
        let cam = CameraModel {
            width_px: 320,
            height_px: 240,
            horizontal_fov_deg: 90.0,
        };
        // tan(90 deg) blows up; the guard must catch the near-zero cosine
        // rather than return a garbage distance.
        let d = cam.distance_from_scale(0.1);
        assert!(d.is_none() || d.unwrap().abs() < 1e-3);
    }

    #[test]
    fn offset_sign_flips_under_mirroring() {
        let cam = field_cam();
        let left = cam.lateral_offset_in(0.1, 380.0);
        let right = cam.lateral_offset_in(0.1, 580.0);
        assert_relative_eq!(left, -right, epsilon = 1e-9);
    }

    #[test]
    fn camera_angle_reflects_above_forty_five() {
        assert_relative_eq!(camera_angle_deg(-75.0), 15.0, epsilon = 1e-9);
        assert_relative_eq!(camera_angle_deg(-15.0), 15.0, epsilon = 1e-9);
        assert_relative_eq!(camera_angle_deg(0.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(camera_angle_deg(45.0), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn slant_model_projects_and_corrects() {
        let mount = MountModel {
            focal_length_px: 340.0,
            mount_angle_deg: 25.0,
        };
        let slant = mount.slant_distance(3.313, 20.0, -80.0).unwrap();
        assert_relative_eq!(slant.straight_in, 3.313 * 340.0 / 20.0, epsilon = 1e-9);
        assert_relative_eq!(
            slant.ground_in,
            slant.straight_in * 25.0_f64.to_radians().cos(),
            epsilon = 1e-9
        );
        assert_relative_eq!(slant.bot_angle_deg, 20.0, epsilon = 1e-9);
        assert_relative_eq!(
            slant.corrected_in,
            slant.ground_in / 20.0_f64.to_radians().cos(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn zero_width_target_is_degenerate() {
        let mount = MountModel {
            focal_length_px: 340.0,
            mount_angle_deg: 25.0,
        };
        assert!(mount.slant_distance(3.313, 0.0, -75.0).is_none());
    }
}
