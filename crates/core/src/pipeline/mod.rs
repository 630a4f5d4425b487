pub mod extract_clips_use_case;
pub mod extract_conversations_use_case;
pub mod run_summary;
pub mod sample_faces_use_case;
pub mod settings;
