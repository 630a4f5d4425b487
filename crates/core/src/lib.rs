//! Finds stretches of a video where several people share the frame and cuts
//! them out as clips.
//!
//! Frames are sampled at a fixed cadence, each one is reduced to a face
//! count, and [`segmentation::domain::segment_detector::SegmentDetector`]
//! turns the resulting sample sequence into conversation segments.

pub mod detection;
pub mod pipeline;
pub mod sampling;
pub mod segmentation;
pub mod shared;
pub mod source;
pub mod video;
