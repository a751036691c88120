use thiserror::Error;

/// Upper bound of the hue channel. Hue is stored OpenCV-style as
/// degrees / 2, so red wraps at 179 rather than 255.
pub const HUE_MAX: u8 = 179;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorRangeError {
    #[error("channel {channel} has min {min} > max {max}")]
    InvertedBand { channel: &'static str, min: u8, max: u8 },

    #[error("hue {value} exceeds the 0..=179 hue scale")]
    HueOutOfRange { value: u8 },
}

/// An inclusive HSV band used to threshold pixels of a known target color.
/// Immutable once constructed; each detector owns the range it thresholds with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorRange {
    hue_min: u8,
    hue_max: u8,
    sat_min: u8,
    sat_max: u8,
    val_min: u8,
    val_max: u8,
}

impl ColorRange {
    // Validates per-channel ordering and the hue bound.
    pub fn new(
        hue: (u8, u8),
        sat: (u8, u8),
        val: (u8, u8),
    ) -> Result<Self, ColorRangeError> {
        for (channel, (min, max)) in [("hue", hue), ("sat", sat), ("val", val)] {
            if min > max {
                return Err(ColorRangeError::InvertedBand { channel, min, max });
            }
        }
        for value in [hue.0, hue.1] {
            if value > HUE_MAX {
                return Err(ColorRangeError::HueOutOfRange { value });
            }
        }
        Ok(Self {
            hue_min: hue.0,
            hue_max: hue.1,
            sat_min: sat.0,
            sat_max: sat.1,
            val_min: val.0,
            val_max: val.1,
        })
    }

    // A pixel belongs to the range iff every channel lies in its band.
    pub fn contains(&self, h: u8, s: u8, v: u8) -> bool {
        h >= self.hue_min
            && h <= self.hue_max
            && s >= self.sat_min
            && s <= self.sat_max
            && v >= self.val_min
            && v <= self.val_max
    }
}

// Converts an RGB triple to HSV with hue in 0..=179 (degrees / 2) and
// saturation/value in 0..=255.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };
    let h_byte = ((h / 2.0).round() as u16).min(HUE_MAX as u16) as u8;

    let s = if max == 0.0 { 0.0 } else { delta / max };
    let s_byte = (s * 255.0).round() as u8;
    let v_byte = (max * 255.0).round() as u8;

    (h_byte, s_byte, v_byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primaries_convert_to_opencv_hue_scale() {
        assert_eq!(rgb_to_hsv(255, 0, 0), (0, 255, 255));
        assert_eq!(rgb_to_hsv(0, 255, 0), (60, 255, 255));
        assert_eq!(rgb_to_hsv(0, 0, 255), (120, 255, 255));
    }

    #[test]
    fn gray_has_zero_saturation() {
        let (h, s, v) = rgb_to_hsv(128, 128, 128);
        assert_eq!(h, 0);
        assert_eq!(s, 0);
        assert_eq!(v, 128);
    }

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let range = ColorRange::new((20, 77), (77, 255), (116, 255)).unwrap();
        assert!(range.contains(20, 77, 116));
        assert!(range.contains(77, 255, 255));
        assert!(!range.contains(19, 77, 116));
        assert!(!range.contains(78, 77, 116));
        assert!(!range.contains(20, 76, 116));
        assert!(!range.contains(20, 77, 115));
    }

    #[test]
    fn inverted_band_is_rejected() {
        let err = ColorRange::new((50, 20), (0, 255), (0, 255)).unwrap_err();
        assert_eq!(
            err,
            ColorRangeError::InvertedBand { channel: "hue", min: 50, max: 20 }
        );
    }

    #[test]
    fn hue_above_scale_is_rejected() {
        let err = ColorRange::new((0, 200), (0, 255), (0, 255)).unwrap_err();
        assert_eq!(err, ColorRangeError::HueOutOfRange { value: 200 });
    }
}
