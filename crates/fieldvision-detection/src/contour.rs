use image::{GrayImage, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::filter::gaussian_blur_f32;
use imageproc::point::Point;

use crate::color::{rgb_to_hsv, ColorRange};

// Matches the 13x13 Gaussian kernel the thresholding was tuned with.
const BLUR_SIGMA: f32 = 2.0;

/// Boundary polygon of one connected color region. Produced per frame and
/// discarded at the end of the detection call.
#[derive(Clone, Debug)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    // Enclosed area in square pixels via the shoelace formula.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let mut twice_area = 0.0;
        for (i, p) in self.points.iter().enumerate() {
            let q = &self.points[(i + 1) % self.points.len()];
            twice_area += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
        }
        twice_area.abs() / 2.0
    }
}

// Thresholds a blurred frame to a binary mask: white where the HSV pixel
// falls inside the range, black elsewhere.
pub fn hsv_mask(frame: &RgbImage, range: &ColorRange) -> GrayImage {
    let blurred = gaussian_blur_f32(frame, BLUR_SIGMA);
    let mut mask = GrayImage::new(frame.width(), frame.height());
    for (src, dst) in blurred.pixels().zip(mask.pixels_mut()) {
        let (h, s, v) = rgb_to_hsv(src[0], src[1], src[2]);
        dst[0] = if range.contains(h, s, v) { 255 } else { 0 };
    }
    mask
}

/// Extracts the outer boundaries of all connected regions matching the
/// color range. Holes are ignored. An empty list is a normal outcome,
/// not an error.
pub fn extract_contours(frame: &RgbImage, range: &ColorRange) -> Vec<Contour> {
    let mask = hsv_mask(frame, range);
    find_contours::<i32>(&mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| Contour { points: c.points })
        .collect()
}
