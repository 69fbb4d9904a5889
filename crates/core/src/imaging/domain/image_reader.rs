use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::image_info::ImageInfo;

/// Reads image files for the framing pipeline.
///
/// `inspect` must not decode pixel data; the pipeline calls it to reject
/// undersized uploads before paying for a full decode.
pub trait ImageReader: Send {
    /// Returns the dimensions stored in the file header.
    fn inspect(&self, path: &Path) -> Result<ImageInfo, Box<dyn std::error::Error>>;

    /// Decodes the whole image to RGB.
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>>;
}
