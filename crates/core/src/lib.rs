pub mod config;
pub mod detection;
pub mod framing;
pub mod imaging;
pub mod pipeline;
pub mod shared;
