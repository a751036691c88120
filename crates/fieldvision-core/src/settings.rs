//! Line-oriented vision settings file.
//!
//! The format is the one the calibration sheets are written in: a section
//! header (`CAMERA:`, `BALL:`, `GOALTARGET:`, `VISIONTAPE:`) followed by
//! `KEY,VALUE` pairs, one per line, keys case-insensitive, a blank line
//! ending the section. A missing file or a malformed value falls back to
//! the documented defaults; configuration problems never stop the process.

use std::path::Path;

use fieldvision_detection::{
    AngleBandDeg, BallConfig, CameraModel, ColorRange, ColorRangeError, MarkerConfig, MountModel,
    TapeConfig,
};

/// Physical camera parameters, `CAMERA:` section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSettings {
    pub width: u32,
    pub height: u32,
    pub fov_deg: f64,
    pub fps: u32,
    pub brightness: f64,
    pub exposure: f64,
}

impl Default for CameraSettings {
    // The field camera the defaults were calibrated on.
    fn default() -> Self {
        Self {
            width: 960,
            height: 720,
            fov_deg: 22.5,
            fps: 15,
            brightness: 0.30,
            exposure: 30.0,
        }
    }
}

/// Ball color band and calibration, `BALL:` section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallSettings {
    pub hue_min: u8,
    pub hue_max: u8,
    pub sat_min: u8,
    pub sat_max: u8,
    pub val_min: u8,
    pub val_max: u8,
    pub min_radius_px: f64,
    pub radius_in: f64,
}

impl Default for BallSettings {
    fn default() -> Self {
        Self {
            hue_min: 20,
            hue_max: 77,
            sat_min: 77,
            sat_max: 255,
            val_min: 116,
            val_max: 255,
            min_radius_px: 5.0,
            radius_in: 3.5,
        }
    }
}

/// Tape color band, area thresholds, physical dimensions and mount
/// calibration. Shared by `GOALTARGET:` and `VISIONTAPE:` sections.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapeSettings {
    pub hue_min: u8,
    pub hue_max: u8,
    pub sat_min: u8,
    pub sat_max: u8,
    pub val_min: u8,
    pub val_max: u8,
    pub min_area_px2: f64,
    pub min_region_area_px2: f64,
    pub tape_width_in: f64,
    pub tape_height_in: f64,
    pub focal_length_px: f64,
    pub mount_angle_deg: f64,
    pub mount_height_in: f64,
    pub left_angle_min_deg: f64,
    pub left_angle_max_deg: f64,
    pub right_angle_min_deg: f64,
    pub right_angle_max_deg: f64,
}

impl TapeSettings {
    // Goal target defaults: the paired-stripe chevron.
    fn goal_default() -> Self {
        Self {
            hue_min: 59,
            hue_max: 114,
            sat_min: 0,
            sat_max: 255,
            val_min: 78,
            val_max: 255,
            min_area_px2: 300.0,
            min_region_area_px2: 2000.0,
            tape_width_in: 3.313,
            tape_height_in: 5.826,
            focal_length_px: 340.0,
            mount_angle_deg: 25.0,
            mount_height_in: 26.0,
            left_angle_min_deg: -80.0,
            left_angle_max_deg: -70.0,
            right_angle_min_deg: -20.0,
            right_angle_max_deg: -10.0,
        }
    }

    // Floor tape defaults: large single blobs, no pairing.
    fn floor_default() -> Self {
        Self {
            hue_min: 60,
            hue_max: 115,
            sat_min: 90,
            sat_max: 255,
            val_min: 80,
            val_max: 255,
            min_area_px2: 50.0,
            tape_width_in: 39.25,
            tape_height_in: 17.0,
            ..Self::goal_default()
        }
    }
}

/// All sections of one settings file, pre-validation.
#[derive(Clone, Debug, PartialEq)]
pub struct VisionSettings {
    pub camera: CameraSettings,
    pub ball: BallSettings,
    pub goal: TapeSettings,
    pub tape: TapeSettings,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            ball: BallSettings::default(),
            goal: TapeSettings::goal_default(),
            tape: TapeSettings::floor_default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Camera,
    Ball,
    Goal,
    Tape,
}

impl VisionSettings {
    /// Reads a settings file, falling back to defaults (with a warning)
    /// when the file cannot be read.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "settings file unavailable; using defaults");
                Self::default()
            }
        }
    }

    /// Parses settings text, overlaying recognized keys onto the defaults.
    /// Unknown keys and malformed values are skipped with a warning.
    pub fn parse(text: &str) -> Self {
        let mut settings = Self::default();
        let mut section: Option<Section> = None;

        for line in text.lines() {
            let clean = line.trim();
            if clean.is_empty() {
                section = None;
                continue;
            }
            let mut parts = clean.splitn(2, ',');
            let key = parts.next().unwrap_or_default().trim().to_ascii_uppercase();

            match key.as_str() {
                "CAMERA:" => section = Some(Section::Camera),
                "BALL:" => section = Some(Section::Ball),
                "GOALTARGET:" => section = Some(Section::Goal),
                "VISIONTAPE:" => section = Some(Section::Tape),
                _ => {
                    let value = parts.next().unwrap_or_default().trim();
                    match section {
                        Some(current) => settings.apply(current, &key, value),
                        None => tracing::warn!(%key, "settings line outside any section"),
                    }
                }
            }
        }
        settings.sanitize();
        settings
    }

    // A section whose values cannot form a valid color range is discarded
    // wholesale, so a bad calibration sheet never stops the process.
    fn sanitize(&mut self) {
        if let Err(err) = self.ball_config() {
            tracing::warn!(%err, "invalid BALL settings; using defaults");
            self.ball = BallSettings::default();
        }
        if let Err(err) = self.goal_config() {
            tracing::warn!(%err, "invalid GOALTARGET settings; using defaults");
            self.goal = TapeSettings::goal_default();
        }
        if let Err(err) = self.marker_config() {
            tracing::warn!(%err, "invalid VISIONTAPE settings; using defaults");
            self.tape = TapeSettings::floor_default();
        }
    }

    fn apply(&mut self, section: Section, key: &str, value: &str) {
        let applied = match section {
            Section::Camera => self.camera.apply(key, value),
            Section::Ball => self.ball.apply(key, value),
            Section::Goal => self.goal.apply(key, value),
            Section::Tape => self.tape.apply(key, value),
        };
        if !applied {
            tracing::warn!(%key, value, ?section, "unrecognized or malformed setting; keeping default");
        }
    }

    pub fn camera_model(&self) -> CameraModel {
        CameraModel {
            width_px: self.camera.width,
            height_px: self.camera.height,
            horizontal_fov_deg: self.camera.fov_deg,
        }
    }

    pub fn ball_config(&self) -> Result<BallConfig, ColorRangeError> {
        let b = &self.ball;
        Ok(BallConfig {
            color: ColorRange::new(
                (b.hue_min, b.hue_max),
                (b.sat_min, b.sat_max),
                (b.val_min, b.val_max),
            )?,
            min_radius_px: b.min_radius_px,
            known_radius_in: b.radius_in,
        })
    }

    pub fn goal_config(&self) -> Result<TapeConfig, ColorRangeError> {
        let g = &self.goal;
        Ok(TapeConfig {
            color: ColorRange::new(
                (g.hue_min, g.hue_max),
                (g.sat_min, g.sat_max),
                (g.val_min, g.val_max),
            )?,
            min_target_area_px2: g.min_area_px2,
            min_region_area_px2: g.min_region_area_px2,
            tape_width_in: g.tape_width_in,
            tape_height_in: g.tape_height_in,
            left_stripe_band: AngleBandDeg {
                min: g.left_angle_min_deg,
                max: g.left_angle_max_deg,
            },
            right_stripe_band: AngleBandDeg {
                min: g.right_angle_min_deg,
                max: g.right_angle_max_deg,
            },
        })
    }

    pub fn goal_mount(&self) -> MountModel {
        MountModel {
            focal_length_px: self.goal.focal_length_px,
            mount_angle_deg: self.goal.mount_angle_deg,
        }
    }

    pub fn marker_config(&self) -> Result<MarkerConfig, ColorRangeError> {
        let t = &self.tape;
        Ok(MarkerConfig {
            color: ColorRange::new(
                (t.hue_min, t.hue_max),
                (t.sat_min, t.sat_max),
                (t.val_min, t.val_max),
            )?,
            min_area_px2: t.min_area_px2,
            known_height_in: t.tape_height_in,
        })
    }
}

// Parses into the target type, reporting success so the caller can warn.
fn set<T: std::str::FromStr>(slot: &mut T, value: &str) -> bool {
    match value.parse() {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(_) => false,
    }
}

impl CameraSettings {
    fn apply(&mut self, key: &str, value: &str) -> bool {
        match key {
            "WIDTH" => set(&mut self.width, value),
            "HEIGHT" => set(&mut self.height, value),
            "FOV" => set(&mut self.fov_deg, value),
            "FPS" => set(&mut self.fps, value),
            "BRIGHTNESS" => set(&mut self.brightness, value),
            "EXPOSURE" => set(&mut self.exposure, value),
            _ => false,
        }
    }
}

impl BallSettings {
    fn apply(&mut self, key: &str, value: &str) -> bool {
        match key {
            "HMIN" => set(&mut self.hue_min, value),
            "HMAX" => set(&mut self.hue_max, value),
            "SMIN" => set(&mut self.sat_min, value),
            "SMAX" => set(&mut self.sat_max, value),
            "VMIN" => set(&mut self.val_min, value),
            "VMAX" => set(&mut self.val_max, value),
            "MINRADIUS" => set(&mut self.min_radius_px, value),
            "RADIUS" => set(&mut self.radius_in, value),
            _ => false,
        }
    }
}

impl TapeSettings {
    fn apply(&mut self, key: &str, value: &str) -> bool {
        match key {
            "HMIN" => set(&mut self.hue_min, value),
            "HMAX" => set(&mut self.hue_max, value),
            "SMIN" => set(&mut self.sat_min, value),
            "SMAX" => set(&mut self.sat_max, value),
            "VMIN" => set(&mut self.val_min, value),
            "VMAX" => set(&mut self.val_max, value),
            "MINAREA" => set(&mut self.min_area_px2, value),
            "MINREGIONAREA" => set(&mut self.min_region_area_px2, value),
            "TAPEWIDTH" => set(&mut self.tape_width_in, value),
            "TAPEHEIGHT" => set(&mut self.tape_height_in, value),
            "FOCALLENGTH" => set(&mut self.focal_length_px, value),
            "MOUNTANGLE" => set(&mut self.mount_angle_deg, value),
            "MOUNTHEIGHT" => set(&mut self.mount_height_in, value),
            "LEFTANGLEMIN" => set(&mut self.left_angle_min_deg, value),
            "LEFTANGLEMAX" => set(&mut self.left_angle_max_deg, value),
            "RIGHTANGLEMIN" => set(&mut self.right_angle_min_deg, value),
            "RIGHTANGLEMAX" => set(&mut self.right_angle_max_deg, value),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
CAMERA:
WIDTH,320
HEIGHT,240
FOV,23.5
FPS,30
BRIGHTNESS,0.5
EXPOSURE,40

BALL:
hmin,25
hmax,70
MINRADIUS,8
RADIUS,4.75

GOALTARGET:
HMIN,59
MINAREA,500
MOUNTANGLE,20
";

    #[test]
    fn parses_sections_and_case_insensitive_keys() {
        let settings = VisionSettings::parse(SAMPLE);
        assert_eq!(settings.camera.width, 320);
        assert_eq!(settings.camera.height, 240);
        assert_eq!(settings.camera.fov_deg, 23.5);
        assert_eq!(settings.camera.fps, 30);
        assert_eq!(settings.ball.hue_min, 25);
        assert_eq!(settings.ball.hue_max, 70);
        assert_eq!(settings.ball.min_radius_px, 8.0);
        assert_eq!(settings.ball.radius_in, 4.75);
        assert_eq!(settings.goal.min_area_px2, 500.0);
        assert_eq!(settings.goal.mount_angle_deg, 20.0);
    }

    #[test]
    fn unset_keys_keep_defaults() {
        let settings = VisionSettings::parse(SAMPLE);
        assert_eq!(settings.ball.sat_min, BallSettings::default().sat_min);
        assert_eq!(settings.goal.focal_length_px, 340.0);
        assert_eq!(settings.tape, TapeSettings::floor_default());
    }

    #[test]
    fn blank_line_ends_a_section() {
        let text = "CAMERA:\nWIDTH,320\n\nWIDTH,999\n";
        let settings = VisionSettings::parse(text);
        // The second WIDTH is outside any section and must be ignored.
        assert_eq!(settings.camera.width, 320);
    }

    #[test]
    fn malformed_value_keeps_the_default() {
        let text = "CAMERA:\nWIDTH,not-a-number\n";
        let settings = VisionSettings::parse(text);
        assert_eq!(settings.camera.width, CameraSettings::default().width);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = VisionSettings::load(Path::new("/nonexistent/vision.txt"));
        assert_eq!(settings, VisionSettings::default());
    }

    #[test]
    fn load_reads_a_real_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let settings = VisionSettings::load(file.path());
        assert_eq!(settings.camera.width, 320);
    }

    #[test]
    fn default_settings_produce_valid_detector_configs() {
        let settings = VisionSettings::default();
        assert!(settings.ball_config().is_ok());
        assert!(settings.goal_config().is_ok());
        assert!(settings.marker_config().is_ok());
        let model = settings.camera_model();
        assert_eq!(model.width_px, 960);
        assert_eq!(model.height_px, 720);
    }

    #[test]
    fn out_of_scale_hue_falls_back_to_section_defaults() {
        // 200 parses as a u8 but exceeds the 0..=179 hue scale.
        let settings = VisionSettings::parse("BALL:\nHMAX,200\n");
        assert_eq!(settings.ball, BallSettings::default());
        assert!(settings.ball_config().is_ok());
    }

    #[test]
    fn inverted_band_falls_back_to_section_defaults() {
        let settings = VisionSettings::parse("GOALTARGET:\nHMIN,120\nHMAX,60\n");
        assert_eq!(settings.goal, TapeSettings::goal_default());
        assert!(settings.goal_config().is_ok());
    }

    #[test]
    fn angle_bands_are_configurable() {
        let text = "GOALTARGET:\nLEFTANGLEMIN,-85\nLEFTANGLEMAX,-65\n";
        let settings = VisionSettings::parse(text);
        let config = settings.goal_config().unwrap();
        assert_eq!(config.left_stripe_band.min, -85.0);
        assert_eq!(config.left_stripe_band.max, -65.0);
    }
}
