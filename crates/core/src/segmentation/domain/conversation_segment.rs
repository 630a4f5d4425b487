use crate::shared::error::PipelineError;

/// A half-open interval `[start, end)` in seconds during which every sample
/// showed enough faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConversationSegment {
    start: f64,
    end: f64,
}

impl ConversationSegment {
    pub fn new(start: f64, end: f64) -> Result<Self, PipelineError> {
        if !(start.is_finite() && end.is_finite() && start >= 0.0 && end > start) {
            return Err(PipelineError::InvalidConfiguration(format!(
                "segment bounds must satisfy 0 <= start < end, got [{start}, {end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Segment for a detected run; callers guarantee `0 <= start < end`.
    pub(crate) fn from_run(start: f64, end: f64) -> Self {
        debug_assert!(start >= 0.0 && end > start, "empty run [{start}, {end})");
        Self { start, end }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &ConversationSegment) -> bool {
        self.start < other.end && other.start < self.end
    }
}
