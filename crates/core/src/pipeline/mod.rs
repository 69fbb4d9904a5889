pub mod frame_image_use_case;
pub mod framing_error;
pub mod pipeline_logger;
