/// Per-tick viewer state
///
/// Owns the sensor, the most recent frame (for the hand overlay) and the most
/// recent capture (for the undistorted view). `tick` runs once per update and
/// never blocks.

use std::sync::Arc;

use crate::capture::Capture;
use crate::sensor::{Frame, HandSensor};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Sensor not connected; nothing touched
    Disconnected,
    /// Connected but nothing buffered; nothing touched
    NoFrame,
    /// New frame without camera images; capture kept
    FrameOnly,
    /// New frame with a fresh capture
    NewCapture,
    /// New frame whose first image was malformed; capture kept
    RejectedCapture,
}

impl TickOutcome {
    pub fn sensor_connected(self) -> bool {
        self != TickOutcome::Disconnected
    }
}

pub struct Viewer {
    sensor: Box<dyn HandSensor>,
    frame: Option<Frame>,
    capture: Option<Arc<Capture>>,
    next_sequence: u64,
    map_size_logged: bool,
}

impl Viewer {
    /// Wrap a sensor and ask it to stream camera images
    pub fn new(mut sensor: Box<dyn HandSensor>) -> Self {
        sensor.set_images_enabled(true);
        Self {
            sensor,
            frame: None,
            capture: None,
            next_sequence: 1,
            map_size_logged: false,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.sensor.is_connected() {
            return TickOutcome::Disconnected;
        }

        let Some(frame) = self.sensor.frame() else {
            return TickOutcome::NoFrame;
        };

        for hand in &frame.hands {
            let p = hand.stabilized_palm_position;
            log::debug!("===palm {}: ({:.1}, {:.1}, {:.1})", hand.id, p.x, p.y, p.z);
        }
        for finger in &frame.fingers {
            let p = finger.stabilized_tip_position;
            log::debug!("---tip {}: ({:.1}, {:.1}, {:.1})", finger.id, p.x, p.y, p.z);
        }

        let outcome = match frame.images.first() {
            None => TickOutcome::FrameOnly,
            Some(image) => {
                match Capture::from_image(self.next_sequence, image) {
                    Ok(capture) => {
                        if !self.map_size_logged {
                            log::info!(
                                "Distortion map {}x{} ({} floats wide), {:.0}% of lookups in range",
                                capture.distortion.width,
                                capture.distortion.height,
                                image.distortion_width,
                                capture.distortion.coverage() * 100.0
                            );
                            self.map_size_logged = true;
                        }
                        self.next_sequence += 1;
                        self.capture = Some(Arc::new(capture));
                        TickOutcome::NewCapture
                    }
                    Err(err) => {
                        log::warn!("⚠️  Dropping image from frame {}: {}", frame.id, err);
                        TickOutcome::RejectedCapture
                    }
                }
            }
        };

        self.frame = Some(frame);
        outcome
    }

    /// Latest frame received, if any
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Latest valid raw image + distortion map pair
    pub fn capture(&self) -> Option<&Arc<Capture>> {
        self.capture.as_ref()
    }
}
