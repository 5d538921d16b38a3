/// CPU-side conversion of sensor buffers into texture-ready layouts
///
/// - Raw grayscale bytes become opaque RGBA8 (one source byte per pixel)
/// - Interleaved (u, v) distortion floats become RGBA32F with u in R, v in G

use super::CaptureError;

/// Expand an 8-bit grayscale buffer to RGBA8
///
/// R, G and B repeat the sample, A is 255. Output order is a plain
/// row-major scan of the input.
pub fn expand_grayscale(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CaptureError> {
    if width == 0 || height == 0 {
        return Err(CaptureError::EmptyImage {
            what: "raw image",
            width,
            height,
        });
    }

    let expected = width as usize * height as usize;
    if data.len() != expected {
        return Err(CaptureError::RawSizeMismatch {
            width,
            height,
            actual: data.len(),
        });
    }

    let mut rgba = Vec::with_capacity(expected * 4);
    for &sample in data {
        rgba.extend_from_slice(&[sample, sample, sample, 255]);
    }
    Ok(rgba)
}

/// Encode an interleaved distortion buffer as RGBA32F texels
///
/// `distortion_width` is the physical width in floats, so the output is
/// `(distortion_width / 2) x distortion_height` pixels. B and A are fixed at 1.0.
pub fn encode_distortion(
    buffer: &[f32],
    distortion_width: u32,
    distortion_height: u32,
) -> Result<Vec<f32>, CaptureError> {
    if distortion_width == 0 || distortion_height == 0 {
        return Err(CaptureError::EmptyImage {
            what: "distortion map",
            width: distortion_width,
            height: distortion_height,
        });
    }
    if distortion_width % 2 != 0 {
        return Err(CaptureError::OddDistortionWidth(distortion_width));
    }

    let expected = distortion_width as usize * distortion_height as usize;
    if buffer.len() != expected {
        return Err(CaptureError::DistortionSizeMismatch {
            width: distortion_width,
            height: distortion_height,
            actual: buffer.len(),
        });
    }

    let mut texels = Vec::with_capacity(expected * 2);
    for pair in buffer.chunks_exact(2) {
        texels.extend_from_slice(&[pair[0], pair[1], 1.0, 1.0]);
    }
    Ok(texels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_grayscale_row_major() {
        let data: Vec<u8> = (0..6).map(|v| v * 40).collect();
        let rgba = expand_grayscale(&data, 3, 2).unwrap();

        assert_eq!(rgba.len(), 6 * 4);
        for (pixel, &sample) in rgba.chunks_exact(4).zip(&data) {
            assert_eq!(pixel, [sample, sample, sample, 255]);
        }
    }

    #[test]
    fn test_expand_grayscale_rejects_short_buffer() {
        let err = expand_grayscale(&[1, 2, 3], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::RawSizeMismatch { width: 2, height: 2, actual: 3 }
        ));
    }

    #[test]
    fn test_expand_grayscale_rejects_zero_dimension() {
        for (width, height) in [(0, 0), (0, 4), (4, 0)] {
            let err = expand_grayscale(&[], width, height).unwrap_err();
            assert!(matches!(err, CaptureError::EmptyImage { .. }), "{}x{}", width, height);
        }
    }

    #[test]
    fn test_encode_distortion_rejects_empty_map() {
        let err = encode_distortion(&[], 0, 0).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::EmptyImage { what: "distortion map", width: 0, height: 0 }
        ));
        assert!(encode_distortion(&[], 4, 0).is_err());
    }

    #[test]
    fn test_encode_distortion_consumes_pairs_in_order() {
        // 4 floats wide (2 logical pixels), 2 rows
        let buffer = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8];
        let texels = encode_distortion(&buffer, 4, 2).unwrap();

        assert_eq!(texels.len(), 2 * 2 * 4);
        let pixels: Vec<&[f32]> = texels.chunks_exact(4).collect();
        assert_eq!(pixels[0], [0.1, 0.2, 1.0, 1.0]);
        assert_eq!(pixels[1], [0.3, 0.4, 1.0, 1.0]);
        assert_eq!(pixels[2], [0.5, 0.6, 1.0, 1.0]);
        assert_eq!(pixels[3], [0.7, 0.8, 1.0, 1.0]);
    }

    #[test]
    fn test_encode_distortion_rejects_odd_width() {
        let err = encode_distortion(&[0.0; 6], 3, 2).unwrap_err();
        assert!(matches!(err, CaptureError::OddDistortionWidth(3)));
    }

    #[test]
    fn test_encode_distortion_rejects_size_mismatch() {
        let err = encode_distortion(&[0.0; 6], 4, 2).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::DistortionSizeMismatch { width: 4, height: 2, actual: 6 }
        ));
    }
}
