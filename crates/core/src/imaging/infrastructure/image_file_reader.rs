use std::path::Path;

use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::frame::Frame;
use crate::shared::image_info::ImageInfo;

/// Reads JPEG, PNG and GIF files with the `image` crate.
///
/// The format is sniffed from the file contents, so uploads stored
/// without an extension still decode. GIFs decode to their first frame.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn inspect(&self, path: &Path) -> Result<ImageInfo, Box<dyn std::error::Error>> {
        let (width, height) = image::ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(ImageInfo {
            width,
            height,
            source_path: Some(path.to_path_buf()),
        })
    }

    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let img = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?
            .to_rgb8();
        Ok(Frame::from_rgb_image(img))
    }
}
