//! The per-cycle detection pipeline: read the newest frame, run the
//! enabled detectors synchronously, publish one telemetry record.
//!
//! Detection itself is CPU-bound and holds no lock; the frame slot is the
//! only point of contact with the capture thread. Every cycle publishes a
//! complete, sentineled record even when nothing is seen.

use std::sync::Arc;

use image::RgbImage;

use fieldvision_detection::{
    detect_balls, detect_markers, detect_tape, BallConfig, BallDetection, CameraModel,
    MarkerConfig, MarkerDetection, MountModel, TapeConfig, TapeDetection,
};

use crate::frame::FrameSlot;
use crate::telemetry::TelemetrySink;

/// Number of ranked ball/marker slots published every cycle.
const PUBLISHED_RANKS: usize = 3;

/// Detector set for one camera. A `None` entry disables that detector.
pub struct DetectorSuite {
    pub camera: CameraModel,
    pub ball: Option<BallConfig>,
    pub marker: Option<MarkerConfig>,
    pub goal: Option<(TapeConfig, MountModel)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No frame was available; nothing was processed or published.
    Skipped,
    /// Detectors ran and a telemetry record was published.
    Processed { balls: usize, markers: usize, tape_found: bool },
}

pub struct Pipeline {
    slot: Arc<FrameSlot>,
    suite: DetectorSuite,
    last_seq: Option<u64>,
}

impl Pipeline {
    pub fn new(slot: Arc<FrameSlot>, suite: DetectorSuite) -> Self {
        Self { slot, suite, last_seq: None }
    }

    /// Runs one detection cycle against the newest available frame.
    /// A repeated frame is processed again; only a missing frame skips.
    pub fn run_cycle(&mut self, sink: &mut dyn TelemetrySink) -> CycleOutcome {
        let Some(latest) = self.slot.latest() else {
            tracing::debug!("no frame available; skipping cycle");
            return CycleOutcome::Skipped;
        };
        if self.last_seq == Some(latest.seq) {
            tracing::trace!(seq = latest.seq, "re-processing repeated frame");
        }
        self.last_seq = Some(latest.seq);
        self.process_frame(&latest.image, sink)
    }

    // Detection over one frame, independent of where it came from.
    pub fn process_frame(&self, frame: &RgbImage, sink: &mut dyn TelemetrySink) -> CycleOutcome {
        let mut ball_count = 0;
        let mut marker_count = 0;
        let mut tape_found = false;

        if let Some(config) = &self.suite.ball {
            let balls = detect_balls(frame, &self.suite.camera, config);
            ball_count = balls.len();
            publish_balls(sink, &self.suite.camera, &balls);
        }

        if let Some(config) = &self.suite.marker {
            let markers = detect_markers(frame, &self.suite.camera, config);
            marker_count = markers.len();
            publish_markers(sink, &markers);
        }

        if let Some((config, mount)) = &self.suite.goal {
            let tape = detect_tape(frame, &self.suite.camera, mount, config);
            tape_found = tape.found;
            publish_tape(sink, &tape);
        }

        sink.end_cycle();
        CycleOutcome::Processed {
            balls: ball_count,
            markers: marker_count,
            tape_found,
        }
    }
}

fn publish_balls(sink: &mut dyn TelemetrySink, camera: &CameraModel, balls: &[BallDetection]) {
    sink.put_bool("FoundBall", !balls.is_empty());

    let (number, name) = classify_ball_layout(camera, balls.first());
    sink.put_number("BallLayoutNum", number);
    sink.put_string("BallLayoutName", name);

    let absent = BallDetection::not_found();
    for rank in 0..PUBLISHED_RANKS {
        let ball = balls.get(rank).unwrap_or(&absent);
        sink.put_number(&format!("BallDistance{rank}"), ball.distance_in);
        sink.put_number(&format!("BallAngle{rank}"), ball.angle_deg);
        sink.put_number(&format!("BallOffset{rank}"), ball.offset_in);
        sink.put_number(&format!("BallScreenPercent{rank}"), ball.screen_fraction);
    }
}

fn publish_markers(sink: &mut dyn TelemetrySink, markers: &[MarkerDetection]) {
    sink.put_bool("FoundMarker", !markers.is_empty());
    let absent = MarkerDetection::not_found();
    for rank in 0..PUBLISHED_RANKS {
        let marker = markers.get(rank).unwrap_or(&absent);
        sink.put_number(&format!("MarkerDistance{rank}"), marker.distance_in);
        sink.put_number(&format!("MarkerAngle{rank}"), marker.angle_deg);
        sink.put_number(&format!("MarkerOffset{rank}"), marker.offset_in);
        sink.put_number(&format!("MarkerScreenPercent{rank}"), marker.screen_fraction);
    }
}

fn publish_tape(sink: &mut dyn TelemetrySink, tape: &TapeDetection) {
    sink.put_bool("FoundTape", tape.found);
    sink.put_bool("TargetLock", tape.target_lock);
    sink.put_number("TapeDistance", tape.distance_in);
    sink.put_number("TapeOffset", tape.offset_in);
    sink.put_number("TapeBotAngle", tape.bot_angle_deg);
}

// Maps the lead ball's screen position onto the season's known starting
// layouts. Bands are fractions of image width.
fn classify_ball_layout(
    camera: &CameraModel,
    lead: Option<&BallDetection>,
) -> (f64, &'static str) {
    let Some(ball) = lead.filter(|b| b.found) else {
        return (-1.0, "none");
    };
    let fraction = ball.center_x_px / camera.width_px as f64;
    match fraction {
        f if f > 0.9 && f < 0.95 => (1.0, "blue1"),
        f if f > 0.4 && f < 0.6 => (2.0, "red1"),
        f if f > 0.68 && f < 0.72 => (3.0, "blue2"),
        f if f > 0.0 && f < 0.05 => (4.0, "red2"),
        _ => (-1.0, "none"),
    }
}
