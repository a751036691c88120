use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, ControlValueSetter, FrameFormat, KnownCameraControl,
    RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::{Camera, NokhwaError};
use thiserror::Error;

use crate::frame::FrameSlot;
use crate::settings::CameraSettings;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera backend: {0}")]
    Backend(#[from] NokhwaError),
}

// Pause after a failed capture so a wedged camera doesn't spin the thread.
const CAPTURE_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Opens a camera at the configured resolution and frame rate and starts
/// its stream. Brightness/exposure are applied best-effort; plenty of
/// hardware rejects manual control and that is not fatal.
pub fn open_camera(index: u32, settings: &CameraSettings) -> Result<Camera, CameraError> {
    let format = CameraFormat::new(
        Resolution::new(settings.width, settings.height),
        FrameFormat::MJPEG,
        settings.fps,
    );
    let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));
    let mut camera = Camera::new(CameraIndex::Index(index), requested)?;

    for (control, value) in [
        (KnownCameraControl::Brightness, brightness_to_control(settings.brightness)),
        (KnownCameraControl::Exposure, settings.exposure.round() as i64),
    ] {
        if let Err(err) = camera.set_camera_control(control, ControlValueSetter::Integer(value)) {
            tracing::warn!(?control, %err, "camera control not applied");
        }
    }

    camera.open_stream()?;
    Ok(camera)
}

// Brightness is configured as a 0..=1 fraction; the control scale is percent.
fn brightness_to_control(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

// Grabs one frame and decodes it to RGB.
pub fn capture_rgb(camera: &mut Camera) -> Result<RgbImage, CameraError> {
    let frame = camera.frame()?;
    Ok(frame.decode_image::<RgbFormat>()?)
}

/// Handle to a running capture thread. Dropping without `stop` detaches
/// the thread; `stop` signals it and waits for the camera to be released.
pub struct CaptureHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl CaptureHandle {
    pub fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        if self.thread.join().is_err() {
            tracing::error!("capture thread panicked");
        }
    }
}

/// Spawns the per-camera capture loop: block on the hardware, decode,
/// publish into the slot, repeat until stopped. The camera handle is owned
/// by the thread and released when the loop exits.
pub fn spawn_capture(mut camera: Camera, slot: Arc<FrameSlot>) -> std::io::Result<CaptureHandle> {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);

    let thread = std::thread::Builder::new()
        .name("camera-capture".into())
        .spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                match capture_rgb(&mut camera) {
                    Ok(image) => slot.publish(image),
                    Err(err) => {
                        tracing::warn!(%err, "frame capture failed");
                        std::thread::sleep(CAPTURE_RETRY_DELAY);
                    }
                }
            }
            if let Err(err) = camera.stop_stream() {
                tracing::warn!(%err, "camera stream did not stop cleanly");
            }
        })?;

    Ok(CaptureHandle { stop, thread })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_brightness_maps_to_a_nonzero_control_value() {
        assert_eq!(brightness_to_control(0.30), 30);
        assert_eq!(brightness_to_control(0.0), 0);
        assert_eq!(brightness_to_control(1.0), 100);
    }
}
