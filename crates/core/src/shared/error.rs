use thiserror::Error;

/// Failures raised while turning a source video into conversation clips.
///
/// `FrameUnavailable` and `SegmentExtractionFailed` are recoverable: use cases
/// collect them and keep going. Every other variant aborts the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("source unavailable ({source_ref}): {reason}")]
    SourceUnavailable { source_ref: String, reason: String },

    #[error("no decodable frame at {timestamp:.2}s: {reason}")]
    FrameUnavailable { timestamp: f64, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to extract segment {ordinal} [{start:.2}s, {end:.2}s): {reason}")]
    SegmentExtractionFailed {
        ordinal: usize,
        start: f64,
        end: f64,
        reason: String,
    },

    #[error("samples out of order: {next:.3}s does not follow {previous:.3}s")]
    UnorderedSamples { previous: f64, next: f64 },

    #[error("face classification failed at {timestamp:.2}s: {reason}")]
    ClassificationFailed { timestamp: f64, reason: String },

    #[error("cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Whether the run can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::FrameUnavailable { .. } | PipelineError::SegmentExtractionFailed { .. }
        )
    }

    pub(crate) fn source_unavailable(source_ref: impl Into<String>, reason: impl ToString) -> Self {
        PipelineError::SourceUnavailable {
            source_ref: source_ref.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_kinds() {
        let frame = PipelineError::FrameUnavailable {
            timestamp: 4.0,
            reason: "eof".into(),
        };
        let extraction = PipelineError::SegmentExtractionFailed {
            ordinal: 1,
            start: 0.0,
            end: 4.0,
            reason: "disk full".into(),
        };
        assert!(frame.is_recoverable());
        assert!(extraction.is_recoverable());
    }

    #[test]
    fn test_fatal_kinds() {
        assert!(!PipelineError::InvalidConfiguration("x".into()).is_recoverable());
        assert!(!PipelineError::source_unavailable("u", "gone").is_recoverable());
        assert!(!PipelineError::Cancelled.is_recoverable());
        assert!(!PipelineError::UnorderedSamples {
            previous: 2.0,
            next: 1.0
        }
        .is_recoverable());
    }

    #[test]
    fn test_display_includes_context() {
        let err = PipelineError::SegmentExtractionFailed {
            ordinal: 3,
            start: 2.0,
            end: 8.5,
            reason: "boom".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to extract segment 3 [2.00s, 8.50s): boom"
        );
    }
}
