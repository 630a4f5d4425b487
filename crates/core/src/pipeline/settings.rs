use std::path::PathBuf;

use crate::segmentation::domain::segment_detector::SegmentDetector;
use crate::shared::constants::{
    DEFAULT_MIN_DURATION_SECS, DEFAULT_MIN_FACES, DEFAULT_OUTPUT_DIR, DEFAULT_SAMPLING_RATE,
};
use crate::shared::error::PipelineError;

/// Tunables for one extraction run.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionSettings {
    /// Samples per second of video.
    pub sampling_rate: f64,
    /// Shortest segment worth keeping, in seconds.
    pub min_duration: f64,
    /// Consecutive non-matching samples tolerated inside a run.
    pub max_gap_samples: usize,
    /// Face count at which a sample counts as multi-person.
    pub min_faces: usize,
    /// Directory receiving the extracted clips.
    pub output_dir: PathBuf,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            sampling_rate: DEFAULT_SAMPLING_RATE,
            min_duration: DEFAULT_MIN_DURATION_SECS,
            max_gap_samples: 0,
            min_faces: DEFAULT_MIN_FACES,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl ExtractionSettings {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(PipelineError::InvalidConfiguration(format!(
                "sampling rate must be positive, got {}",
                self.sampling_rate
            )));
        }
        if !(self.min_duration.is_finite() && self.min_duration > 0.0) {
            return Err(PipelineError::InvalidConfiguration(format!(
                "minimum duration must be positive, got {}",
                self.min_duration
            )));
        }
        if self.min_faces == 0 {
            return Err(PipelineError::InvalidConfiguration(
                "minimum face count must be at least 1".into(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(PipelineError::InvalidConfiguration(
                "output directory must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Builds the segment detector these settings describe.
    pub fn detector(&self) -> Result<SegmentDetector, PipelineError> {
        self.validate()?;
        Ok(SegmentDetector::new(self.min_duration)?
            .with_min_faces(self.min_faces)?
            .with_max_gap_samples(self.max_gap_samples))
    }
}
