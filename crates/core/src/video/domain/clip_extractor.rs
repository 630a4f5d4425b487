use std::path::Path;

use crate::segmentation::domain::conversation_segment::ConversationSegment;

/// Cuts `[segment.start, segment.end)` out of a source video into its own file.
pub trait ClipExtractor: Send {
    fn extract(
        &self,
        source: &Path,
        segment: &ConversationSegment,
        output: &Path,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
