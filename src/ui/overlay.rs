/// Hand and fingertip overlay
/// Draws palm and fingertip markers over the undistorted camera view.
use cgmath::{vec2, vec3, Angle, Deg, Vector2, Vector3};
use iced::widget::canvas::{self, Path};
use iced::{Color, Point, Rectangle};

use crate::sensor::Frame;

const PALM_COLOR: Color = Color::from_rgb(1.0, 0.0, 0.0);
const TIP_COLOR: Color = Color::from_rgb(1.0, 1.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Palm,
    Tip,
}

/// One marker in overlay space (x right, y down, z toward the viewer)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: Vector3<f32>,
}

/// Sensor coordinates (y up, z toward the user) to overlay space
pub fn to_overlay_space(p: Vector3<f32>) -> Vector3<f32> {
    vec3(-p.x, p.z, -p.y)
}

/// Markers for the current frame
///
/// Empty unless at least one finger is tracked; otherwise every palm
/// followed by every fingertip.
pub fn markers(frame: &Frame) -> Vec<Marker> {
    if frame.fingers.is_empty() {
        return Vec::new();
    }

    let palms = frame.hands.iter().map(|hand| Marker {
        kind: MarkerKind::Palm,
        position: to_overlay_space(hand.stabilized_palm_position),
    });
    let tips = frame.fingers.iter().map(|finger| Marker {
        kind: MarkerKind::Tip,
        position: to_overlay_space(finger.stabilized_tip_position),
    });
    palms.chain(tips).collect()
}

/// Perspective camera looking down -z, placed so the z = 0 plane maps 1:1 to
/// pixels for a viewport of the given height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    eye_distance: f32,
}

impl Projection {
    pub fn new(viewport_height: f32, field_of_view: f32) -> Self {
        let half_fov = Deg(field_of_view / 2.0);
        Self {
            eye_distance: (viewport_height / 2.0) / half_fov.tan(),
        }
    }

    /// Offset from the viewport center and size scale, or `None` behind the eye
    pub fn project(&self, p: Vector3<f32>) -> Option<(Vector2<f32>, f32)> {
        let depth = self.eye_distance - p.z;
        if depth <= f32::EPSILON {
            return None;
        }
        let scale = self.eye_distance / depth;
        Some((vec2(p.x * scale, p.y * scale), scale))
    }
}

/// Canvas program drawing the markers centered in its bounds
#[derive(Debug, Clone)]
pub struct HandOverlay {
    pub markers: Vec<Marker>,
    pub palm_radius: f32,
    pub tip_radius: f32,
    pub field_of_view: f32,
}

impl<Message> canvas::Program<Message> for HandOverlay {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let center = frame.center();
        let projection = Projection::new(bounds.height, self.field_of_view);

        for marker in &self.markers {
            let Some((offset, scale)) = projection.project(marker.position) else {
                continue;
            };
            let (radius, color) = match marker.kind {
                MarkerKind::Palm => (self.palm_radius, PALM_COLOR),
                MarkerKind::Tip => (self.tip_radius, TIP_COLOR),
            };
            let circle = Path::circle(
                Point::new(center.x + offset.x, center.y + offset.y),
                radius * scale,
            );
            frame.fill(&circle, color);
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::{Finger, Hand};

    fn hand_frame(fingers: usize) -> Frame {
        Frame {
            id: 1,
            hands: vec![Hand {
                id: 1,
                stabilized_palm_position: vec3(10.0, 200.0, 30.0),
            }],
            fingers: (0..fingers)
                .map(|i| Finger {
                    id: i as i32,
                    hand_id: 1,
                    stabilized_tip_position: vec3(i as f32, 220.0, -5.0),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_axis_transform() {
        assert_eq!(
            to_overlay_space(vec3(1.0, 2.0, 3.0)),
            vec3(-1.0, 3.0, -2.0)
        );
    }

    #[test]
    fn test_no_markers_without_fingers() {
        assert!(markers(&hand_frame(0)).is_empty());
    }

    #[test]
    fn test_palms_then_tips() {
        let markers = markers(&hand_frame(2));
        let kinds: Vec<MarkerKind> = markers.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MarkerKind::Palm, MarkerKind::Tip, MarkerKind::Tip]);
        assert_eq!(markers[0].position, vec3(-10.0, 30.0, -200.0));
        assert_eq!(markers[2].position, vec3(-1.0, -5.0, -220.0));
    }

    #[test]
    fn test_projection_identity_at_zero_plane() {
        let projection = Projection::new(720.0, 60.0);
        let (offset, scale) = projection.project(vec3(12.0, -7.0, 0.0)).unwrap();
        assert!((scale - 1.0).abs() < 1e-6);
        assert!((offset.x - 12.0).abs() < 1e-4 && (offset.y + 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_projection_shrinks_distant_points() {
        let projection = Projection::new(720.0, 60.0);
        let (offset, scale) = projection.project(vec3(100.0, 0.0, -200.0)).unwrap();
        assert!(scale < 1.0);
        assert!(offset.x < 100.0);
    }

    #[test]
    fn test_projection_skips_points_behind_eye() {
        let projection = Projection::new(720.0, 60.0);
        assert!(projection.project(vec3(0.0, 0.0, 10_000.0)).is_none());
    }
}
