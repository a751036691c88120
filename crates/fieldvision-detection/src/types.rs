/// Sentinel reported for real-world fields when nothing was detected.
/// Callers must check `found` before trusting any derived value.
pub const SENTINEL: f64 = -1.0;

/// One detected game ball. All real-world fields are valid iff `found`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallDetection {
    pub found: bool,
    pub center_x_px: f64,
    pub center_y_px: f64,
    pub radius_px: f64,
    pub distance_in: f64,
    pub angle_deg: f64,
    pub offset_in: f64,
    pub screen_fraction: f64,
}

impl BallDetection {
    // The per-cycle "nothing seen" value, published with sentinels.
    pub fn not_found() -> Self {
        Self {
            found: false,
            center_x_px: SENTINEL,
            center_y_px: SENTINEL,
            radius_px: 0.0,
            distance_in: SENTINEL,
            angle_deg: SENTINEL,
            offset_in: 0.0,
            screen_fraction: 0.0,
        }
    }
}

/// A detected retroreflective tape target (single blob or paired stripes).
/// `target_lock` means a full stripe pair was matched; a lone stripe that
/// cleared its area threshold reports `found` without the lock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapeDetection {
    pub found: bool,
    pub target_lock: bool,
    pub x_px: f64,
    pub y_px: f64,
    pub width_px: f64,
    pub height_px: f64,
    pub distance_in: f64,
    pub straight_distance_in: f64,
    pub ground_distance_in: f64,
    pub bot_angle_deg: f64,
    pub angle_deg: f64,
    pub offset_in: f64,
}

impl TapeDetection {
    pub fn not_found() -> Self {
        Self {
            found: false,
            target_lock: false,
            x_px: SENTINEL,
            y_px: SENTINEL,
            width_px: SENTINEL,
            height_px: SENTINEL,
            distance_in: SENTINEL,
            straight_distance_in: SENTINEL,
            ground_distance_in: SENTINEL,
            bot_angle_deg: SENTINEL,
            angle_deg: SENTINEL,
            offset_in: 0.0,
        }
    }
}

/// One detected field marker (single-blob mode, axis-aligned box).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerDetection {
    pub found: bool,
    pub x_px: f64,
    pub y_px: f64,
    pub width_px: f64,
    pub height_px: f64,
    pub distance_in: f64,
    pub angle_deg: f64,
    pub vert_angle_deg: f64,
    pub offset_in: f64,
    pub screen_fraction: f64,
}

impl MarkerDetection {
    pub fn not_found() -> Self {
        Self {
            found: false,
            x_px: SENTINEL,
            y_px: SENTINEL,
            width_px: SENTINEL,
            height_px: SENTINEL,
            distance_in: SENTINEL,
            angle_deg: SENTINEL,
            vert_angle_deg: SENTINEL,
            offset_in: 0.0,
            screen_fraction: 0.0,
        }
    }
}
