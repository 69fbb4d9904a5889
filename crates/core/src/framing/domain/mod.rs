pub mod placement;
pub mod window_placer;
