pub mod clip_extractor;
pub mod frame_source;
pub mod image_writer;
