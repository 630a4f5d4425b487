pub mod ffmpeg_clip_extractor;
pub mod ffmpeg_frame_source;
pub mod image_file_writer;
