use std::fmt;
use std::path::PathBuf;

use crate::segmentation::domain::conversation_segment::ConversationSegment;
use crate::shared::error::PipelineError;
use crate::shared::video_metadata::VideoMetadata;

/// Everything one extraction run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub video: PathBuf,
    pub metadata: VideoMetadata,
    pub samples: usize,
    pub segments: Vec<ConversationSegment>,
    pub clips: Vec<PathBuf>,
    pub skipped_frames: Vec<PipelineError>,
    pub failed_extractions: Vec<PipelineError>,
}

impl RunSummary {
    /// Seconds of video covered by detected segments.
    pub fn total_multi_person_secs(&self) -> f64 {
        self.segments.iter().map(ConversationSegment::duration).sum()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total_multi_person_secs();
        let duration = self.metadata.duration_secs;
        let share = if duration > 0.0 {
            total / duration * 100.0
        } else {
            0.0
        };

        writeln!(
            f,
            "Summary for {} ({}x{} {}, {duration:.1}s, {} samples):",
            self.video.display(),
            self.metadata.width,
            self.metadata.height,
            self.metadata.codec,
            self.samples
        )?;
        writeln!(
            f,
            "  Segments: {}  multi-person time {total:.1}s ({share:.1}%)",
            self.segments.len()
        )?;
        for (i, segment) in self.segments.iter().enumerate() {
            writeln!(
                f,
                "  {:3}: {:8.2}s - {:8.2}s  ({:.1}s)",
                i + 1,
                segment.start(),
                segment.end(),
                segment.duration()
            )?;
        }
        for clip in &self.clips {
            writeln!(f, "  Clip: {}", clip.display())?;
        }
        if !self.skipped_frames.is_empty() {
            writeln!(f, "  Skipped frames: {}", self.skipped_frames.len())?;
        }
        for failure in &self.failed_extractions {
            writeln!(f, "  Failed: {failure}")?;
        }
        Ok(())
    }
}
