use crate::sampling::domain::sample::{Sample, SampleSequence};
use crate::segmentation::domain::conversation_segment::ConversationSegment;
use crate::shared::constants::{DEFAULT_MIN_DURATION_SECS, DEFAULT_MIN_FACES};
use crate::shared::error::PipelineError;

/// Slack for comparing a run's length against the minimum duration, so a
/// run of exactly `L / rate` seconds is not lost to float rounding.
const DURATION_EPSILON: f64 = 1e-9;

/// Turns a sample sequence into conversation segments in a single
/// left-to-right pass.
///
/// A run is a stretch of consecutive samples with at least `min_faces` faces.
/// Its end is the end of the last qualifying sample's time window,
/// `min(last.timestamp + tick, video_duration)`, so an interior run ends on
/// the next sample's timestamp and a run touching the tail ends on the video
/// end (or one tick past the last sample if that comes first).
///
/// A timestamp missing from the sequence counts as a sample with zero faces.
/// `max_gap_samples` lets that many consecutive non-qualifying samples
/// (missing ticks included) sit inside a run without splitting it. The
/// default of 0 splits on any dip.
#[derive(Clone, Debug)]
pub struct SegmentDetector {
    min_duration: f64,
    min_faces: usize,
    max_gap_samples: usize,
}

#[derive(Clone, Copy, Debug)]
enum ScanState {
    Idle,
    InRun {
        start: f64,
        last_match: f64,
        misses: usize,
    },
}

impl SegmentDetector {
    pub fn new(min_duration: f64) -> Result<Self, PipelineError> {
        if !(min_duration.is_finite() && min_duration > 0.0) {
            return Err(PipelineError::InvalidConfiguration(format!(
                "minimum duration must be positive, got {min_duration}"
            )));
        }
        Ok(Self {
            min_duration,
            min_faces: DEFAULT_MIN_FACES,
            max_gap_samples: 0,
        })
    }

    pub fn with_min_faces(mut self, min_faces: usize) -> Result<Self, PipelineError> {
        if min_faces == 0 {
            return Err(PipelineError::InvalidConfiguration(
                "minimum face count must be at least 1".into(),
            ));
        }
        self.min_faces = min_faces;
        Ok(self)
    }

    pub fn with_max_gap_samples(mut self, max_gap_samples: usize) -> Self {
        self.max_gap_samples = max_gap_samples;
        self
    }

    pub fn min_duration(&self) -> f64 {
        self.min_duration
    }

    pub fn min_faces(&self) -> usize {
        self.min_faces
    }

    pub fn max_gap_samples(&self) -> usize {
        self.max_gap_samples
    }

    fn is_multi(&self, sample: &Sample) -> bool {
        sample.face_count >= self.min_faces
    }

    /// Scans `sequence` and returns its segments in start order.
    ///
    /// Ordering is guaranteed by [`SampleSequence`], which refuses
    /// out-of-order samples on construction.
    pub fn detect(&self, sequence: &SampleSequence) -> Vec<ConversationSegment> {
        let tick = sequence.tick();
        let video_duration = sequence.video_duration();
        let mut segments = Vec::new();
        let mut state = ScanState::Idle;
        let mut previous: Option<f64> = None;

        let mut close = |start: f64, last_match: f64| {
            let end = (last_match + tick).min(video_duration);
            if end - start + DURATION_EPSILON < self.min_duration {
                log::debug!(
                    "Discarding run [{start:.2}s, {end:.2}s): shorter than {:.2}s",
                    self.min_duration
                );
                return;
            }
            // start < video_duration is enforced by SampleSequence::push
            segments.push(ConversationSegment::from_run(start, end));
        };

        for sample in sequence.samples() {
            let missing = previous.map_or(0, |p| missing_ticks(p, sample.timestamp, tick));
            previous = Some(sample.timestamp);

            state = match (state, self.is_multi(sample)) {
                (ScanState::Idle, true) => ScanState::InRun {
                    start: sample.timestamp,
                    last_match: sample.timestamp,
                    misses: 0,
                },
                (ScanState::Idle, false) => ScanState::Idle,
                (
                    ScanState::InRun {
                        start,
                        last_match,
                        misses,
                    },
                    true,
                ) => {
                    if misses + missing > self.max_gap_samples {
                        close(start, last_match);
                        ScanState::InRun {
                            start: sample.timestamp,
                            last_match: sample.timestamp,
                            misses: 0,
                        }
                    } else {
                        ScanState::InRun {
                            start,
                            last_match: sample.timestamp,
                            misses: 0,
                        }
                    }
                }
                (
                    ScanState::InRun {
                        start,
                        last_match,
                        misses,
                    },
                    false,
                ) => {
                    let misses = misses + missing + 1;
                    if misses > self.max_gap_samples {
                        close(start, last_match);
                        ScanState::Idle
                    } else {
                        ScanState::InRun {
                            start,
                            last_match,
                            misses,
                        }
                    }
                }
            };
        }

        if let ScanState::InRun {
            start, last_match, ..
        } = state
        {
            close(start, last_match);
        }

        segments
    }
}

impl Default for SegmentDetector {
    fn default() -> Self {
        Self {
            min_duration: DEFAULT_MIN_DURATION_SECS,
            min_faces: DEFAULT_MIN_FACES,
            max_gap_samples: 0,
        }
    }
}

/// Number of sampling ticks absent between two consecutive samples.
fn missing_ticks(previous: f64, next: f64, tick: f64) -> usize {
    let steps = ((next - previous) / tick).round();
    if steps <= 1.0 {
        0
    } else {
        steps as usize - 1
    }
}
