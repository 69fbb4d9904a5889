use std::path::PathBuf;

/// Dimensions of an image file, read from its header without decoding pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub source_path: Option<PathBuf>,
}

impl ImageInfo {
    /// Height after scaling to `target_width` with the aspect ratio kept.
    ///
    /// Rounds to the nearest pixel and never returns less than 1.
    pub fn scaled_height(&self, target_width: u32) -> u32 {
        if self.width == 0 {
            return self.height.max(1);
        }
        let scaled = self.height as f64 * target_width as f64 / self.width as f64;
        (scaled.round() as u32).max(1)
    }
}
