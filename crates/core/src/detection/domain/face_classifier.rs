use crate::shared::frame::Frame;

/// Domain interface for counting faces in a single frame.
///
/// Implementations may keep inference sessions or scratch buffers between
/// calls, hence `&mut self`. The count is taken as ground truth by the
/// segment detector.
pub trait FaceClassifier: Send {
    fn classify(&mut self, frame: &Frame) -> Result<usize, Box<dyn std::error::Error>>;
}
