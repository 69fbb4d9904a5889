pub mod detections_file_detector;
pub mod onnx_blazeface_detector;
