/// Hand-tracking sensor abstraction
///
/// This module defines the per-frame data model delivered by the
/// motion-sensing peripheral and the `HandSensor` trait the viewer polls:
/// - `synthetic.rs` - deterministic built-in source (no hardware needed)
/// - `replay.rs` - plays back frames recorded to a JSON-lines file

pub mod replay;
pub mod synthetic;

use cgmath::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use replay::ReplaySensor;
pub use synthetic::SyntheticSensor;

/// One camera image as delivered by the sensor
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SensorImage {
    pub width: u32,
    pub height: u32,
    /// 8-bit grayscale samples, row-major, `width * height` bytes
    pub data: Vec<u8>,
    /// Physical width of the distortion buffer in floats (2 per logical column)
    pub distortion_width: u32,
    pub distortion_height: u32,
    /// Interleaved (u, v) lookup pairs, `distortion_width * distortion_height` floats
    pub distortion: Vec<f32>,
}

/// A tracked hand
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Hand {
    pub id: i32,
    /// Smoothed palm center in millimetres, sensor coordinates
    pub stabilized_palm_position: Vector3<f32>,
}

/// A tracked finger
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Finger {
    pub id: i32,
    pub hand_id: i32,
    /// Smoothed fingertip in millimetres, sensor coordinates
    pub stabilized_tip_position: Vector3<f32>,
}

/// Everything the sensor reports for a single capture
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub id: i64,
    #[serde(default)]
    pub images: Vec<SensorImage>,
    #[serde(default)]
    pub hands: Vec<Hand>,
    #[serde(default)]
    pub fingers: Vec<Finger>,
}

/// Source of tracking frames
///
/// Polling must never block: `frame` returns whatever is currently buffered.
pub trait HandSensor {
    /// Whether the device is currently connected and streaming
    fn is_connected(&self) -> bool;

    /// Most recent frame, or `None` if nothing is available right now
    fn frame(&mut self) -> Option<Frame>;

    /// Toggle delivery of raw camera images alongside tracking data
    fn set_images_enabled(&mut self, enabled: bool);
}

/// Errors raised while opening a sensor source
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("failed to read recording {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed frame on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("recording {0} contains no frames")]
    Empty(String),
}
