use crate::shared::error::PipelineError;

/// Face count observed at one sampling tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: f64,
    pub face_count: usize,
}

impl Sample {
    pub fn new(timestamp: f64, face_count: usize) -> Self {
        Self {
            timestamp,
            face_count,
        }
    }
}

/// Samples taken across `[0, video_duration)` at a fixed cadence, in strictly
/// increasing timestamp order.
///
/// Timestamps may have gaps where a frame could not be decoded; the tick is
/// kept alongside so consumers can tell a gap from a neighbour.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSequence {
    samples: Vec<Sample>,
    sampling_rate: f64,
    video_duration: f64,
}

impl SampleSequence {
    pub fn new(sampling_rate: f64, video_duration: f64) -> Result<Self, PipelineError> {
        if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
            return Err(PipelineError::InvalidConfiguration(format!(
                "sampling rate must be positive, got {sampling_rate}"
            )));
        }
        if !(video_duration.is_finite() && video_duration > 0.0) {
            return Err(PipelineError::InvalidConfiguration(format!(
                "video duration must be positive, got {video_duration}"
            )));
        }
        Ok(Self {
            samples: Vec::new(),
            sampling_rate,
            video_duration,
        })
    }

    /// Builds a sequence from already-collected samples, rejecting any that
    /// break timestamp order.
    pub fn from_samples(
        sampling_rate: f64,
        video_duration: f64,
        samples: impl IntoIterator<Item = Sample>,
    ) -> Result<Self, PipelineError> {
        let mut sequence = Self::new(sampling_rate, video_duration)?;
        for sample in samples {
            sequence.push(sample)?;
        }
        Ok(sequence)
    }

    pub fn push(&mut self, sample: Sample) -> Result<(), PipelineError> {
        if !(sample.timestamp.is_finite() && sample.timestamp >= 0.0) {
            return Err(PipelineError::InvalidConfiguration(format!(
                "sample timestamp must be a non-negative number, got {}",
                sample.timestamp
            )));
        }
        if sample.timestamp >= self.video_duration {
            return Err(PipelineError::InvalidConfiguration(format!(
                "sample at {}s lies beyond the {}s video",
                sample.timestamp, self.video_duration
            )));
        }
        if let Some(last) = self.samples.last() {
            if sample.timestamp <= last.timestamp {
                return Err(PipelineError::UnorderedSamples {
                    previous: last.timestamp,
                    next: sample.timestamp,
                });
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn video_duration(&self) -> f64 {
        self.video_duration
    }

    /// Seconds between consecutive sampling ticks.
    pub fn tick(&self) -> f64 {
        1.0 / self.sampling_rate
    }
}
