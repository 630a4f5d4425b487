use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Random-access frame decoding by timestamp.
///
/// Implementations own their decoder handles between `open` and `close`;
/// callers must not assume a handle survives past `close`.
pub trait FrameSource: Send {
    /// Opens a video file and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Decodes the first frame presented at or after `timestamp` seconds.
    ///
    /// `Ok(None)` means no frame exists there (e.g. past end of stream).
    fn frame_at(&mut self, timestamp: f64) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
