use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::config::FramingConfig;
use crate::detection::domain::face_detector::FaceDetector;
use crate::framing::domain::placement::Placement;
use crate::framing::domain::window_placer::WindowPlacer;
use crate::imaging::domain::image_format::ImageFormat;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::pipeline::framing_error::FramingError;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;
use crate::shared::image_info::ImageInfo;

/// An uploaded file and the MIME type the client declared for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Upload {
    pub path: PathBuf,
    pub mime_type: String,
}

impl Upload {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Declares the MIME type from the file extension, as a browser would.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime_type = ImageFormat::from_path(&path)
            .map(|f| f.mime_type())
            .unwrap_or("application/octet-stream");
        Self::new(path, mime_type)
    }
}

#[derive(Debug)]
pub struct Validated {
    pub upload: Upload,
    pub format: ImageFormat,
}

#[derive(Debug)]
pub struct Inspected {
    pub validated: Validated,
    pub info: ImageInfo,
}

/// The resized image as written to the output directory.
///
/// `frame` is read back from the written file, so its height is the one
/// the placement is computed against.
#[derive(Debug)]
pub struct Resized {
    pub filename: String,
    pub path: PathBuf,
    pub frame: Frame,
}

#[derive(Debug)]
pub struct Detected {
    pub resized: Resized,
    pub faces: Vec<FaceBox>,
}

/// Render context for the result page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FramedImage {
    pub filename: String,
    pub faces: Vec<FaceBox>,
    #[serde(rename = "min_top")]
    pub placement: Placement,
}

/// Upload framing pipeline: validate → inspect → resize → detect → place.
///
/// Each step consumes the previous step's context and the first failure
/// ends the run.
pub struct FrameImageUseCase {
    config: FramingConfig,
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    detector: Box<dyn FaceDetector>,
    placer: WindowPlacer,
    logger: Box<dyn PipelineLogger>,
}

impl FrameImageUseCase {
    pub fn new(
        config: FramingConfig,
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        detector: Box<dyn FaceDetector>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            config,
            reader,
            writer,
            detector,
            placer: WindowPlacer::default(),
            logger,
        }
    }

    pub fn execute(&mut self, upload: Upload) -> Result<FramedImage, FramingError> {
        let validated = self.timed("validate", |uc| validate(&uc.config, upload))?;
        let inspected = self.timed("inspect", |uc| uc.inspect(validated))?;
        let resized = self.timed("resize", |uc| uc.resize(inspected))?;
        let detected = self.timed("detect", |uc| uc.detect(resized))?;
        let framed = self.timed("place", |uc| uc.place(detected));

        self.logger.info(&format!(
            "{}: {} face(s), min_top {}",
            framed.filename,
            framed.faces.len(),
            framed.placement
        ));
        Ok(framed)
    }

    /// Frames each upload independently; one failure does not stop the rest.
    pub fn execute_all(&mut self, uploads: Vec<Upload>) -> Vec<Result<FramedImage, FramingError>> {
        let total = uploads.len();
        uploads
            .into_iter()
            .enumerate()
            .map(|(i, upload)| {
                self.logger.progress(i + 1, total);
                self.execute(upload)
            })
            .collect()
    }

    /// Emits the logger's summary.
    pub fn finish(&self) {
        self.logger.summary();
    }

    pub fn inspect(&self, validated: Validated) -> Result<Inspected, FramingError> {
        let path = &validated.upload.path;
        let info = self.reader.inspect(path).map_err(|e| FramingError::Read {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        if info.width < self.config.min_width || info.height < self.config.min_height {
            return Err(FramingError::ImageTooSmall {
                width: info.width,
                height: info.height,
                min_width: self.config.min_width,
                min_height: self.config.min_height,
            });
        }

        Ok(Inspected { validated, info })
    }

    pub fn resize(&self, inspected: Inspected) -> Result<Resized, FramingError> {
        let source = &inspected.validated.upload.path;
        let frame = self.reader.read(source).map_err(|e| FramingError::Read {
            path: source.clone(),
            reason: e.to_string(),
        })?;

        let width = self.config.resize_width;
        let height = inspected.info.scaled_height(width);
        let filename = output_filename(source, inspected.validated.format);
        let path = self.config.output_dir.join(&filename);

        self.writer
            .write(&path, &frame, Some((width, height)))
            .map_err(|e| FramingError::Write {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let frame = self.reader.read(&path).map_err(|e| FramingError::Read {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        log::debug!(
            "Resized {} to {}x{} at {}",
            source.display(),
            frame.width(),
            frame.height(),
            path.display()
        );

        Ok(Resized {
            filename,
            path,
            frame,
        })
    }

    pub fn detect(&mut self, resized: Resized) -> Result<Detected, FramingError> {
        let faces = self
            .detector
            .detect(&resized.frame)
            .map_err(|e| FramingError::Detection(e.to_string()))?;
        self.logger.metric("faces", faces.len() as f64);
        Ok(Detected { resized, faces })
    }

    pub fn place(&self, detected: Detected) -> FramedImage {
        let height = detected.resized.frame.height() as i64;
        let placement = self.placer.place(&detected.faces, Some(height));
        FramedImage {
            filename: detected.resized.filename,
            faces: detected.faces,
            placement,
        }
    }

    fn timed<T>(&mut self, stage: &str, step: impl FnOnce(&mut Self) -> T) -> T {
        let start = Instant::now();
        let out = step(self);
        self.logger
            .timing(stage, start.elapsed().as_secs_f64() * 1000.0);
        out
    }
}

/// Rejects uploads whose declared type is not allow-listed.
pub fn validate(config: &FramingConfig, upload: Upload) -> Result<Validated, FramingError> {
    match config.accepted_format(&upload.mime_type) {
        Some(format) => Ok(Validated { upload, format }),
        None => Err(FramingError::InvalidFileType {
            mime_type: upload.mime_type,
            allowed: allowed_extensions(config),
        }),
    }
}

fn allowed_extensions(config: &FramingConfig) -> String {
    config
        .allowed_mime_types
        .iter()
        .filter_map(|m| ImageFormat::from_mime(m))
        .map(|f| f.extension())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Upload file stem plus the extension of its declared format.
fn output_filename(source: &Path, format: ImageFormat) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload");
    format!("{stem}{}", format.extension())
}
