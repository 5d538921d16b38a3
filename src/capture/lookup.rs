/// Distortion lookup rule shared with the fragment shader
///
/// A lookup texel (r, g) names the normalized raw-image coordinate to
/// sample. Only values strictly inside (0, 1) have a source pixel.

use super::DistortionMap;

/// Map a distortion lookup (r, g) to a normalized raw-image coordinate
///
/// The v axis is flipped because lookup and raw rows run in opposite
/// directions.
pub fn source_coordinate(r: f32, g: f32) -> Option<(f32, f32)> {
    if r > 0.0 && r < 1.0 && g > 0.0 && g < 1.0 {
        Some((r, 1.0 - g))
    } else {
        None
    }
}

impl DistortionMap {
    /// Fraction of output pixels that resolve to a raw-image pixel
    pub fn coverage(&self) -> f32 {
        let total = self.texels.len() / 4;
        if total == 0 {
            return 0.0;
        }
        let covered = self
            .texels
            .chunks_exact(4)
            .filter(|texel| source_coordinate(texel[0], texel[1]).is_some())
            .count();
        covered as f32 / total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::encode_distortion;

    fn map(width: u32, height: u32, buffer: &[f32]) -> DistortionMap {
        DistortionMap {
            width: width / 2,
            height,
            texels: encode_distortion(buffer, width, height).unwrap(),
        }
    }

    #[test]
    fn test_source_coordinate_flips_v() {
        assert_eq!(source_coordinate(0.5, 0.25), Some((0.5, 0.75)));
        assert_eq!(source_coordinate(0.5, 0.5), Some((0.5, 0.5)));
    }

    #[test]
    fn test_source_coordinate_bounds_are_exclusive() {
        for (r, g) in [
            (0.0, 0.5),
            (1.0, 0.5),
            (0.5, 0.0),
            (0.5, 1.0),
            (-0.2, 0.5),
            (0.5, 1.3),
        ] {
            assert_eq!(source_coordinate(r, g), None, "({}, {})", r, g);
        }
    }

    #[test]
    fn test_uniform_center_map_fully_covered() {
        // 2x4 logical map of (0.5, 0.5)
        assert_eq!(map(4, 4, &[0.5; 16]).coverage(), 1.0);
    }

    #[test]
    fn test_coverage_counts_out_of_range_lookups() {
        let map = map(8, 1, &[0.0, 0.5, 0.5, 1.0, 0.25, 0.75, 0.9, 0.1]);
        assert_eq!(map.coverage(), 0.5);
    }
}
