pub mod image_format;
pub mod image_reader;
pub mod image_writer;
