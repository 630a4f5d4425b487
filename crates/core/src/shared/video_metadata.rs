use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Container duration in seconds.
    pub duration_secs: f64,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Number of samples a run at `sampling_rate` will attempt.
    pub fn expected_samples(&self, sampling_rate: f64) -> usize {
        if self.duration_secs <= 0.0 || sampling_rate <= 0.0 {
            return 0;
        }
        (self.duration_secs * sampling_rate).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn meta(duration_secs: f64) -> VideoMetadata {
        VideoMetadata {
            width: 1920,
            height: 1080,
            fps: 30.0,
            duration_secs,
            codec: "h264".to_string(),
            source_path: Some(PathBuf::from("/tmp/test.mp4")),
        }
    }

    #[test]
    fn test_clone_is_equal() {
        let m = meta(12.0);
        assert_eq!(m.clone(), m);
    }

    #[rstest]
    #[case::exact_ticks(12.0, 0.5, 6)]
    #[case::short_tail(13.0, 0.5, 7)]
    #[case::one_per_second(10.0, 1.0, 10)]
    #[case::empty(0.0, 0.5, 0)]
    #[case::bad_rate(10.0, 0.0, 0)]
    fn test_expected_samples(#[case] duration: f64, #[case] rate: f64, #[case] expected: usize) {
        assert_eq!(meta(duration).expected_samples(rate), expected);
    }
}
