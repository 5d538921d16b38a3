/// Built-in synthetic sensor
///
/// Produces frames shaped like the real peripheral's output so the viewer
/// runs without hardware: a 640x240 raw image with a scrolling checkerboard,
/// a 64x64 barrel-distortion lookup whose corners fall outside (0, 1), and
/// one hand circling above the device with five fingertips.

use cgmath::{vec3, Vector3};

use super::{Finger, Frame, Hand, HandSensor, SensorImage};

/// Native raw image size of the peripheral
pub const RAW_WIDTH: u32 = 640;
pub const RAW_HEIGHT: u32 = 240;

/// Logical distortion map size (physical width is twice this)
pub const MAP_SIZE: u32 = 64;

const CHECKER_SIZE: u32 = 40;
const BARREL_STRENGTH: f32 = 0.6;

/// Orbit of the synthetic palm, millimetres
const ORBIT_RADIUS: f32 = 80.0;
const PALM_HEIGHT: f32 = 200.0;

#[derive(Debug)]
pub struct SyntheticSensor {
    tick: u64,
    images_enabled: bool,
    distortion: Vec<f32>,
}

impl SyntheticSensor {
    pub fn new() -> Self {
        Self {
            tick: 0,
            images_enabled: false,
            distortion: barrel_map(MAP_SIZE, MAP_SIZE, BARREL_STRENGTH),
        }
    }

    fn image(&self) -> SensorImage {
        let shift = self.tick as u32;
        let mut data = Vec::with_capacity((RAW_WIDTH * RAW_HEIGHT) as usize);
        for y in 0..RAW_HEIGHT {
            for x in 0..RAW_WIDTH {
                let cell = (x.wrapping_add(shift) / CHECKER_SIZE + y / CHECKER_SIZE) % 2;
                let base: u32 = if cell == 0 { 48 } else { 208 };
                // Horizontal falloff mimics the IR illumination cone
                let falloff = (x as i32 - RAW_WIDTH as i32 / 2).unsigned_abs() / 8;
                data.push(base.saturating_sub(falloff) as u8);
            }
        }

        SensorImage {
            width: RAW_WIDTH,
            height: RAW_HEIGHT,
            data,
            distortion_width: MAP_SIZE * 2,
            distortion_height: MAP_SIZE,
            distortion: self.distortion.clone(),
        }
    }

    fn hand(&self) -> (Hand, Vec<Finger>) {
        let angle = self.tick as f32 / 60.0;
        let palm = vec3(
            ORBIT_RADIUS * angle.cos(),
            PALM_HEIGHT,
            ORBIT_RADIUS * angle.sin(),
        );

        let fingers = (0..5)
            .map(|i| {
                let spread = (i as f32 - 2.0) * 25.0;
                let reach = if i == 0 { 40.0 } else { 70.0 };
                Finger {
                    id: 10 + i,
                    hand_id: 1,
                    stabilized_tip_position: palm + Vector3::new(spread, 10.0, -reach),
                }
            })
            .collect();

        (
            Hand {
                id: 1,
                stabilized_palm_position: palm,
            },
            fingers,
        )
    }
}

impl Default for SyntheticSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl HandSensor for SyntheticSensor {
    fn is_connected(&self) -> bool {
        true
    }

    fn frame(&mut self) -> Option<Frame> {
        self.tick += 1;

        let (hand, fingers) = self.hand();
        let images = if self.images_enabled {
            vec![self.image()]
        } else {
            Vec::new()
        };

        Some(Frame {
            id: self.tick as i64,
            images,
            hands: vec![hand],
            fingers,
        })
    }

    fn set_images_enabled(&mut self, enabled: bool) {
        self.images_enabled = enabled;
    }
}

/// Build an interleaved (u, v) lookup buffer with radial barrel distortion
///
/// Output has `width * 2 * height` floats.
fn barrel_map(width: u32, height: u32, strength: f32) -> Vec<f32> {
    let mut map = Vec::with_capacity((width * 2 * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let du = (x as f32 + 0.5) / width as f32 - 0.5;
            let dv = (y as f32 + 0.5) / height as f32 - 0.5;
            let scale = 1.0 + strength * (du * du + dv * dv);
            map.push(0.5 + du * scale);
            map.push(0.5 + dv * scale);
        }
    }
    map
}
