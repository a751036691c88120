//! Vision target detection and geometric estimation for FRC-style robots.
//!
//! Turns a raw color frame into structured estimates of game-object and
//! retroreflective-target positions: distance, bearing angle and lateral
//! offset in the robot frame. Each detection call is a pure function of the
//! frame and its configuration; nothing carries state across frames, and
//! "nothing found" is a normal outcome reported through sentinel values,
//! never an error.

pub mod ball;
pub mod color;
pub mod contour;
pub mod geometry;
pub mod marker;
pub mod shape;
pub mod types;

pub use ball::{detect_balls, BallConfig};
pub use color::{ColorRange, ColorRangeError};
pub use contour::{extract_contours, Contour};
pub use geometry::{CameraModel, MountModel};
pub use marker::{detect_markers, detect_tape, AngleBandDeg, MarkerConfig, TapeConfig};
pub use types::{BallDetection, MarkerDetection, TapeDetection, SENTINEL};
