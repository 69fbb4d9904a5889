use std::fs;
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Replays face boxes produced by an external detector.
///
/// The file is a JSON array of `{ "x", "y", "width", "height" }` objects in
/// pixel coordinates of the resized image. The same boxes are returned for
/// every frame.
pub struct DetectionsFileDetector {
    faces: Vec<FaceBox>,
}

impl DetectionsFileDetector {
    pub fn new(faces: Vec<FaceBox>) -> Self {
        Self { faces }
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read detections {}: {e}", path.display()))?;
        let faces: Vec<FaceBox> = serde_json::from_str(&json)
            .map_err(|e| format!("Invalid detections in {}: {e}", path.display()))?;
        log::debug!("Loaded {} face boxes from {}", faces.len(), path.display());
        Ok(Self::new(faces))
    }

    pub fn faces(&self) -> &[FaceBox] {
        &self.faces
    }
}

impl FaceDetector for DetectionsFileDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        Ok(self.faces.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_detections(dir: &Path, json: &str) -> std::path::PathBuf {
        let path = dir.join("faces.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_loads_face_boxes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_detections(
            dir.path(),
            r#"[{"x": 1, "y": 2, "width": 3, "height": 4}, {"x": 5, "y": 6, "width": 7, "height": 8}]"#,
        );
        let detector = DetectionsFileDetector::from_file(&path).unwrap();
        assert_eq!(
            detector.faces(),
            &[FaceBox::new(1, 2, 3, 4), FaceBox::new(5, 6, 7, 8)]
        );
    }

    #[test]
    fn test_empty_array_is_no_faces() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_detections(dir.path(), "[]");
        let mut detector = DetectionsFileDetector::from_file(&path).unwrap();
        let frame = Frame::new(vec![0; 12], 2, 2);
        assert!(detector.detect(&frame).unwrap().is_empty());
    }

    #[test]
    fn test_detect_returns_same_boxes_every_call() {
        let mut detector = DetectionsFileDetector::new(vec![FaceBox::new(0, 10, 20, 20)]);
        let frame = Frame::new(vec![0; 12], 2, 2);
        assert_eq!(detector.detect(&frame).unwrap(), detector.detect(&frame).unwrap());
    }

    #[test]
    fn test_missing_file_returns_error() {
        let result = DetectionsFileDetector::from_file(Path::new("/nonexistent/faces.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_detections(dir.path(), r#"{"x": 1}"#);
        assert!(DetectionsFileDetector::from_file(&path).is_err());
    }
}
