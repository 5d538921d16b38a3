/// Per-capture image data
///
/// A `Capture` pairs the expanded raw image with the distortion map built
/// from the same sensor image, so the two can never drift apart:
/// - `convert.rs` - grayscale expansion and distortion encoding
/// - `lookup.rs` - the (r, g) -> raw coordinate rule the shader applies

pub mod convert;
pub mod lookup;

use thiserror::Error;

use crate::sensor::SensorImage;

pub use convert::{encode_distortion, expand_grayscale};

/// Errors for sensor buffers that do not match their declared dimensions
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("raw image is {actual} bytes, expected {width}x{height}")]
    RawSizeMismatch { width: u32, height: u32, actual: usize },

    #[error("distortion map is {actual} floats, expected {width}x{height}")]
    DistortionSizeMismatch { width: u32, height: u32, actual: usize },

    #[error("distortion width {0} is odd; samples come in (u, v) pairs")]
    OddDistortionWidth(u32),

    #[error("{what} has a zero dimension ({width}x{height})")]
    EmptyImage {
        what: &'static str,
        width: u32,
        height: u32,
    },
}

/// Raw camera image expanded to RGBA8
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Distortion lookup encoded as RGBA32F, at logical resolution
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionMap {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<f32>,
}

/// One immutable raw image + distortion map pair
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    /// Increases with every capture accepted by the viewer
    pub sequence: u64,
    pub raw: RawImage,
    pub distortion: DistortionMap,
}

impl Capture {
    /// Build both textures from a single sensor image
    pub fn from_image(sequence: u64, image: &SensorImage) -> Result<Self, CaptureError> {
        let rgba = expand_grayscale(&image.data, image.width, image.height)?;
        let texels = encode_distortion(
            &image.distortion,
            image.distortion_width,
            image.distortion_height,
        )?;

        Ok(Self {
            sequence,
            raw: RawImage {
                width: image.width,
                height: image.height,
                rgba,
            },
            distortion: DistortionMap {
                width: image.distortion_width / 2,
                height: image.distortion_height,
                texels,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_dimensions() {
        let image = SensorImage {
            width: 4,
            height: 2,
            data: vec![7; 8],
            distortion_width: 6,
            distortion_height: 2,
            distortion: vec![0.5; 12],
        };

        let capture = Capture::from_image(3, &image).unwrap();
        assert_eq!(capture.sequence, 3);
        assert_eq!((capture.raw.width, capture.raw.height), (4, 2));
        assert_eq!(capture.raw.rgba.len(), 4 * 2 * 4);
        assert_eq!((capture.distortion.width, capture.distortion.height), (3, 2));
        assert_eq!(capture.distortion.texels.len(), 3 * 2 * 4);
    }

    #[test]
    fn test_capture_rejects_bad_map() {
        let image = SensorImage {
            width: 1,
            height: 1,
            data: vec![0],
            distortion_width: 2,
            distortion_height: 2,
            distortion: vec![0.5; 2],
        };
        assert!(Capture::from_image(1, &image).is_err());
    }

    #[test]
    fn test_capture_rejects_zero_size_image() {
        let image = SensorImage {
            width: 0,
            height: 0,
            data: Vec::new(),
            distortion_width: 0,
            distortion_height: 0,
            distortion: Vec::new(),
        };
        assert!(matches!(
            Capture::from_image(1, &image),
            Err(CaptureError::EmptyImage { what: "raw image", .. })
        ));
    }
}
