/// Playback of recorded sensor frames
///
/// A recording is a JSON-lines file: one serialized `Frame` per line.
/// Blank lines are skipped. Frames are handed out one per poll.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{Frame, HandSensor, SensorError};

#[derive(Debug)]
pub struct ReplaySensor {
    frames: Vec<Frame>,
    cursor: usize,
    looping: bool,
    images_enabled: bool,
}

impl ReplaySensor {
    /// Load every frame from a recording on disk
    pub fn open(path: &Path, looping: bool) -> Result<Self, SensorError> {
        let file = File::open(path).map_err(|source| SensorError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut frames = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| SensorError::Io {
                path: path.display().to_string(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: Frame = serde_json::from_str(&line).map_err(|source| SensorError::Parse {
                line: index + 1,
                source,
            })?;
            frames.push(frame);
        }

        if frames.is_empty() {
            return Err(SensorError::Empty(path.display().to_string()));
        }

        log::info!("Loaded {} recorded frames from {}", frames.len(), path.display());

        Ok(Self::from_frames(frames, looping))
    }

    pub fn from_frames(frames: Vec<Frame>, looping: bool) -> Self {
        Self {
            frames,
            cursor: 0,
            looping,
            images_enabled: false,
        }
    }
}

impl HandSensor for ReplaySensor {
    fn is_connected(&self) -> bool {
        !self.frames.is_empty() && (self.looping || self.cursor < self.frames.len())
    }

    fn frame(&mut self) -> Option<Frame> {
        if self.cursor >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return None;
            }
            self.cursor = 0;
        }

        let mut frame = self.frames[self.cursor].clone();
        self.cursor += 1;

        if !self.images_enabled {
            frame.images.clear();
        }
        Some(frame)
    }

    fn set_images_enabled(&mut self, enabled: bool) {
        self.images_enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorImage;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn frame(id: i64) -> Frame {
        Frame {
            id,
            images: vec![SensorImage {
                width: 2,
                height: 1,
                data: vec![1, 2],
                distortion_width: 2,
                distortion_height: 1,
                distortion: vec![0.5, 0.5],
            }],
            ..Default::default()
        }
    }

    fn write_recording(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_plays_once_then_disconnects() {
        let mut sensor = ReplaySensor::from_frames(vec![frame(1), frame(2)], false);
        sensor.set_images_enabled(true);

        assert!(sensor.is_connected());
        assert_eq!(sensor.frame().unwrap().id, 1);
        assert_eq!(sensor.frame().unwrap().id, 2);
        assert!(!sensor.is_connected());
        assert!(sensor.frame().is_none());
    }

    #[test]
    fn test_looping_wraps_around() {
        let mut sensor = ReplaySensor::from_frames(vec![frame(1), frame(2)], true);
        let ids: Vec<i64> = (0..5).map(|_| sensor.frame().unwrap().id).collect();
        assert_eq!(ids, vec![1, 2, 1, 2, 1]);
        assert!(sensor.is_connected());
    }

    #[test]
    fn test_images_stripped_unless_enabled() {
        let mut sensor = ReplaySensor::from_frames(vec![frame(1), frame(2)], false);
        assert!(sensor.frame().unwrap().images.is_empty());

        sensor.set_images_enabled(true);
        assert_eq!(sensor.frame().unwrap().images.len(), 1);
    }

    #[test]
    fn test_open_recording() {
        let lines = [frame(7), frame(8)]
            .iter()
            .map(|f| serde_json::to_string(f).unwrap())
            .collect::<Vec<_>>()
            .join("\n\n");
        let recording = write_recording(&lines);

        let mut sensor = ReplaySensor::open(recording.path(), false).unwrap();
        assert_eq!(sensor.frame().unwrap().id, 7);
        assert_eq!(sensor.frame().unwrap().id, 8);
    }

    #[test]
    fn test_open_reports_bad_line() {
        let good = serde_json::to_string(&frame(1)).unwrap();
        let recording = write_recording(&format!("{}\nnot json\n", good));

        match ReplaySensor::open(recording.path(), false) {
            Err(SensorError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_open_rejects_empty_recording() {
        let recording = write_recording("\n");
        assert!(matches!(
            ReplaySensor::open(recording.path(), false),
            Err(SensorError::Empty(_))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.jsonl");
        assert!(matches!(
            ReplaySensor::open(&path, false),
            Err(SensorError::Io { .. })
        ));
    }
}
