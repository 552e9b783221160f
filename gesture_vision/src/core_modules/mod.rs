pub mod calibrator;
pub mod color_model;
pub mod dispatcher;
pub mod hsv_pixel;
pub mod mat_bridge;
pub mod region;
pub mod region_detector;
pub mod segmenter;
pub mod zone_classifier;
