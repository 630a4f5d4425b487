pub mod conversation_segment;
pub mod segment_detector;
