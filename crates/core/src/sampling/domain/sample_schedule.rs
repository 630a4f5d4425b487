use crate::shared::error::PipelineError;

/// Timestamps `i / rate` for every `i` with `i / rate < duration`.
///
/// Each timestamp is computed from its index so long videos don't
/// accumulate rounding drift.
#[derive(Clone, Debug)]
pub struct SampleSchedule {
    sampling_rate: f64,
    video_duration: f64,
    next_index: u64,
}

impl SampleSchedule {
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
            sampling_rate,
            video_duration,
            next_index: 0,
        })
    }
}

impl Iterator for SampleSchedule {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let timestamp = self.next_index as f64 / self.sampling_rate;
        if timestamp >= self.video_duration {
            return None;
        }
        self.next_index += 1;
        Some(timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_half_hertz_schedule() {
        let ts: Vec<f64> = SampleSchedule::new(0.5, 12.0).unwrap().collect();
        assert_eq!(ts, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_short_tail_is_sampled() {
        let ts: Vec<f64> = SampleSchedule::new(0.5, 11.0).unwrap().collect();
        assert_eq!(ts.last().copied(), Some(10.0));
        assert_eq!(ts.len(), 6);
    }

    #[test]
    fn test_duration_shorter_than_tick_yields_single_sample() {
        let ts: Vec<f64> = SampleSchedule::new(0.5, 0.3).unwrap().collect();
        assert_eq!(ts, vec![0.0]);
    }

    #[test]
    fn test_no_drift_over_long_video() {
        let ts: Vec<f64> = SampleSchedule::new(3.0, 3600.0).unwrap().collect();
        assert_eq!(ts.len(), 10_800);
        assert_relative_eq!(ts[9_999], 9_999.0 / 3.0);
    }

    #[rstest]
    #[case::zero_rate(0.0, 10.0)]
    #[case::negative_rate(-0.5, 10.0)]
    #[case::zero_duration(1.0, 0.0)]
    #[case::nan_duration(1.0, f64::NAN)]
    fn test_invalid_inputs(#[case] rate: f64, #[case] duration: f64) {
        assert!(matches!(
            SampleSchedule::new(rate, duration),
            Err(PipelineError::InvalidConfiguration(_))
        ));
    }
}
