pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// One frame every two seconds.
pub const DEFAULT_SAMPLING_RATE: f64 = 0.5;

/// Runs shorter than this are treated as detector noise.
pub const DEFAULT_MIN_DURATION_SECS: f64 = 3.0;

/// Faces needed in a frame for it to count as a multi-person shot.
pub const DEFAULT_MIN_FACES: usize = 2;

pub const DEFAULT_OUTPUT_DIR: &str = "segments";
pub const DEFAULT_VIDEO_DIR: &str = "videos";

pub const CLIP_EXTENSION: &str = "mp4";
pub const FRAME_DUMP_EXTENSION: &str = "jpg";

pub const YT_DLP_BINARY: &str = "yt-dlp";
pub const YT_DLP_FORMAT: &str = "best[ext=mp4]";
