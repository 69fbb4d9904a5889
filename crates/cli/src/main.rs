use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use facefocus_core::config::FramingConfig;
use facefocus_core::detection::domain::face_detector::FaceDetector;
use facefocus_core::detection::infrastructure::detections_file_detector::DetectionsFileDetector;
use facefocus_core::detection::infrastructure::onnx_blazeface_detector::OnnxBlazefaceDetector;
use facefocus_core::framing::domain::window_placer::WindowPlacer;
use facefocus_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use facefocus_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use facefocus_core::pipeline::frame_image_use_case::{FrameImageUseCase, Upload};
use facefocus_core::pipeline::pipeline_logger::SummaryPipelineLogger;

/// Frame faces in uploaded images.
#[derive(Parser)]
#[command(name = "facefocus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the window offset for precomputed detections.
    Place {
        /// Image height in pixels.
        #[arg(long, allow_negative_numbers = true)]
        height: i64,

        /// JSON array of face boxes ({x, y, width, height}).
        #[arg(long)]
        faces: PathBuf,
    },

    /// Validate, resize and frame images, printing one JSON result per line.
    Frame {
        /// Uploaded image files.
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Declared MIME type (guessed from the extension if omitted).
        #[arg(long)]
        mime: Option<String>,

        /// Use detections from a JSON file instead of running a model.
        #[arg(long, conflicts_with = "model", required_unless_present = "model")]
        faces: Option<PathBuf>,

        /// BlazeFace ONNX model for face detection.
        #[arg(long)]
        model: Option<PathBuf>,

        /// Face detection confidence threshold (0.0-1.0).
        #[arg(long)]
        confidence: Option<f64>,

        /// Config file (defaults to the user config directory).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory resized images are written to.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Place { height, faces } => run_place(height, &faces),
        Command::Frame {
            images,
            mime,
            faces,
            model,
            confidence,
            config,
            output_dir,
        } => {
            let mut config = FramingConfig::resolve(config.as_deref())?;
            if let Some(c) = confidence {
                config.detector_confidence = c;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            validate(&config)?;

            let detector = build_detector(faces.as_deref(), model.as_deref(), &config)?;
            run_frame(images, mime, detector, config)
        }
    }
}

fn run_place(height: i64, faces: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", place_css(height, faces)?);
    Ok(())
}

/// CSS value for the best window over the detections in `faces`.
fn place_css(height: i64, faces: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let detections = DetectionsFileDetector::from_file(faces)?;
    Ok(WindowPlacer::default()
        .place(detections.faces(), Some(height))
        .to_string())
}

fn run_frame(
    images: Vec<PathBuf>,
    mime: Option<String>,
    detector: Box<dyn FaceDetector>,
    config: FramingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let uploads: Vec<Upload> = images
        .iter()
        .map(|path| match &mime {
            Some(m) => Upload::new(path, m.as_str()),
            None => Upload::from_path(path),
        })
        .collect();

    let mut use_case = FrameImageUseCase::new(
        config,
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        detector,
        Box::new(SummaryPipelineLogger::new()),
    );

    let total = uploads.len();
    let mut failed = 0;
    for (path, result) in images.iter().zip(use_case.execute_all(uploads)) {
        match result {
            Ok(framed) => println!("{}", serde_json::to_string(&framed)?),
            Err(e) => {
                failed += 1;
                eprintln!("Error: {}: {e}", path.display());
            }
        }
    }
    use_case.finish();

    if failed > 0 {
        return Err(format!("{failed} of {total} images could not be framed").into());
    }
    Ok(())
}

fn build_detector(
    faces: Option<&Path>,
    model: Option<&Path>,
    config: &FramingConfig,
) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    match (faces, model) {
        (Some(path), _) => {
            log::info!("Using detections from {}", path.display());
            Ok(Box::new(DetectionsFileDetector::from_file(path)?))
        }
        (None, Some(path)) => {
            if !path.exists() {
                return Err(format!("Model file not found: {}", path.display()).into());
            }
            log::info!("Loading face detection model: {}", path.display());
            Ok(Box::new(OnnxBlazefaceDetector::new(
                path,
                config.detector_confidence,
            )?))
        }
        (None, None) => Err("Either --faces or --model is required".into()),
    }
}

fn validate(config: &FramingConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&config.detector_confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            config.detector_confidence
        )
        .into());
    }
    if config.resize_width == 0 {
        return Err("Resize width must be positive".into());
    }
    Ok(())
}
