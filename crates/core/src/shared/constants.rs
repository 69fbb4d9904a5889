/// Window height used when the image height is unknown or zero.
pub const FALLBACK_WINDOW_SIZE: f64 = 400.0;

/// The framing window covers this fraction of the image height.
pub const WINDOW_HEIGHT_DIVISOR: f64 = 3.0;

/// Uploads narrower or shorter than this are rejected before resizing.
pub const MIN_IMAGE_WIDTH: u32 = 960;
pub const MIN_IMAGE_HEIGHT: u32 = 300;

/// Width every accepted image is resized to before detection.
pub const RESIZE_WIDTH: u32 = 960;

pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

pub const DEFAULT_OUTPUT_DIR: &str = "public/images";
