//! Retroreflective tape detection.
//!
//! Two modes. Single-blob mode treats the largest tape-colored box as the
//! target and is good enough for flat floor markers. Paired-stripe mode
//! reconstructs a chevron target built from two angled stripes: stripes are
//! paired left-to-right under per-side rotation bands, merged into one
//! region, and only a merged region earns `target_lock`. The bands are
//! configuration, not constants, because target geometry changes yearly.

use image::RgbImage;

use crate::color::ColorRange;
use crate::contour::extract_contours;
use crate::geometry::{CameraModel, MountModel};
use crate::shape::{bounding_rect, oriented_rect};
use crate::types::{MarkerDetection, TapeDetection, SENTINEL};

/// Open interval of accepted oriented-box rotations for one stripe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleBandDeg {
    pub min: f64,
    pub max: f64,
}

impl AngleBandDeg {
    pub fn contains(&self, angle_deg: f64) -> bool {
        angle_deg > self.min && angle_deg < self.max
    }
}

/// Calibration for the paired-stripe goal target.
#[derive(Clone, Copy, Debug)]
pub struct TapeConfig {
    pub color: ColorRange,
    pub min_target_area_px2: f64,
    pub min_region_area_px2: f64,
    pub tape_width_in: f64,
    pub tape_height_in: f64,
    pub left_stripe_band: AngleBandDeg,
    pub right_stripe_band: AngleBandDeg,
}

/// Calibration for single-blob field markers.
#[derive(Clone, Copy, Debug)]
pub struct MarkerConfig {
    pub color: ColorRange,
    pub min_area_px2: f64,
    pub known_height_in: f64,
}

/// One tape-colored blob that cleared the area filter: axis-aligned bounds
/// plus the oriented-box rotation used for pairing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StripeCandidate {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub angle_deg: f64,
}

/// A merged stripe pair: the composite target region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairedRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub area: f64,
    /// Rotation of the left stripe, carried for the bot-angle estimate.
    pub left_angle_deg: f64,
}

/// Pairs adjacent stripes left-to-right under the configured angle bands
/// and returns the largest merged region clearing the area threshold.
pub fn pair_stripes(stripes: &[StripeCandidate], config: &TapeConfig) -> Option<PairedRegion> {
    let mut sorted = stripes.to_vec();
    sorted.sort_by_key(|s| s.x);

    let mut best: Option<PairedRegion> = None;
    for pair in sorted.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        if !config.left_stripe_band.contains(left.angle_deg)
            || !config.right_stripe_band.contains(right.angle_deg)
        {
            continue;
        }

        let gap_px = right.x - (left.x + left.width);
        let region_width = (left.width + right.width + gap_px) as f64;
        let region_height = left.height as f64;
        let area = region_width * region_height;
        if area < config.min_region_area_px2 {
            continue;
        }

        let region = PairedRegion {
            x: left.x as f64,
            y: left.y as f64,
            width: region_width,
            height: region_height,
            area,
            left_angle_deg: left.angle_deg,
        };
        if best.map_or(true, |b| area > b.area) {
            best = Some(region);
        }
    }
    best
}

// Stripe candidates for one frame: contours over the tape color range,
// area-filtered, with AABB position and oriented rotation.
fn stripe_candidates(frame: &RgbImage, config: &TapeConfig) -> Vec<StripeCandidate> {
    extract_contours(frame, &config.color)
        .iter()
        .filter(|contour| contour.area() > config.min_target_area_px2)
        .filter_map(|contour| {
            let bounds = bounding_rect(&contour.points)?;
            let oriented = oriented_rect(&contour.points)?;
            Some(StripeCandidate {
                x: bounds.x,
                y: bounds.y,
                width: bounds.width,
                height: bounds.height,
                angle_deg: oriented.angle_deg,
            })
        })
        .collect()
}

/// Paired-stripe goal detection with the slant-corrected distance model.
///
/// A matched pair reports `target_lock`. If no pair qualifies but a single
/// stripe cleared its area threshold, that stripe is reported without the
/// lock so the robot still knows the target is visible. Degenerate geometry
/// yields `found = false`, never a division fault.
pub fn detect_tape(
    frame: &RgbImage,
    camera: &CameraModel,
    mount: &MountModel,
    config: &TapeConfig,
) -> TapeDetection {
    let stripes = stripe_candidates(frame, config);
    if stripes.is_empty() {
        return TapeDetection::not_found();
    }

    if let Some(region) = pair_stripes(&stripes, config) {
        return tape_detection(
            camera,
            mount,
            config,
            region.x,
            region.y,
            region.width,
            region.height,
            region.left_angle_deg,
            true,
        );
    }

    // Partial detection: the widest single stripe, unconfirmed.
    let largest = stripes
        .iter()
        .max_by(|a, b| (a.width * a.height).cmp(&(b.width * b.height)));
    match largest {
        Some(stripe) => tape_detection(
            camera,
            mount,
            config,
            stripe.x as f64,
            stripe.y as f64,
            stripe.width as f64,
            stripe.height as f64,
            stripe.angle_deg,
            false,
        ),
        None => TapeDetection::not_found(),
    }
}

#[allow(clippy::too_many_arguments)]
fn tape_detection(
    camera: &CameraModel,
    mount: &MountModel,
    config: &TapeConfig,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    stripe_angle_deg: f64,
    target_lock: bool,
) -> TapeDetection {
    if width <= 0.0 || height <= 0.0 {
        return TapeDetection::not_found();
    }
    let slant = match mount.slant_distance(config.tape_width_in, width, stripe_angle_deg) {
        Some(slant) => slant,
        None => {
            tracing::debug!(width, stripe_angle_deg, "degenerate tape geometry");
            return TapeDetection::not_found();
        }
    };

    let ipp = config.tape_height_in / height;
    let raw_offset = camera.lateral_offset_in(ipp, x + width / 2.0);
    let angle_deg = camera
        .bearing_deg(raw_offset, slant.corrected_in)
        .unwrap_or(SENTINEL);

    TapeDetection {
        found: true,
        target_lock,
        x_px: x,
        y_px: y,
        width_px: width,
        height_px: height,
        distance_in: slant.corrected_in,
        straight_distance_in: slant.straight_in,
        ground_distance_in: slant.ground_in,
        bot_angle_deg: slant.bot_angle_deg,
        angle_deg,
        offset_in: -raw_offset,
    }
}

/// Single-blob marker detection: area-filtered boxes ranked largest-first,
/// flat pinhole distance from the box height.
pub fn detect_markers(
    frame: &RgbImage,
    camera: &CameraModel,
    config: &MarkerConfig,
) -> Vec<MarkerDetection> {
    let mut boxes: Vec<_> = extract_contours(frame, &config.color)
        .iter()
        .filter(|contour| contour.area() > config.min_area_px2)
        .filter_map(|contour| bounding_rect(&contour.points))
        .collect();
    boxes.sort_by_key(|b| std::cmp::Reverse(b.width as i64 * b.height as i64));

    boxes
        .into_iter()
        .map(|bounds| {
            let mut detection = MarkerDetection {
                found: true,
                x_px: bounds.x as f64,
                y_px: bounds.y as f64,
                width_px: bounds.width as f64,
                height_px: bounds.height as f64,
                distance_in: SENTINEL,
                angle_deg: SENTINEL,
                vert_angle_deg: SENTINEL,
                offset_in: 0.0,
                screen_fraction: camera
                    .box_screen_fraction(bounds.width as f64, bounds.height as f64),
            };
            if bounds.height > 0 {
                let ipp = config.known_height_in / bounds.height as f64;
                if let Some(distance) = camera.distance_from_scale(ipp) {
                    let raw_offset = camera
                        .lateral_offset_in(ipp, bounds.x as f64 + bounds.width as f64 / 2.0);
                    let vert_offset = ipp
                        * (camera.height_px as f64 / 2.0
                            - (bounds.y as f64 - bounds.height as f64 / 2.0));
                    if let Some(bearing) = camera.bearing_deg(raw_offset, distance) {
                        detection.distance_in = distance;
                        detection.angle_deg = bearing;
                        detection.vert_angle_deg = camera
                            .bearing_deg(vert_offset, distance)
                            .unwrap_or(SENTINEL);
                        detection.offset_in = -raw_offset;
                    }
                }
            }
            detection
        })
        .collect()
}
