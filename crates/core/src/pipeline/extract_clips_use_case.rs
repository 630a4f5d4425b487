use std::path::{Path, PathBuf};

use crate::segmentation::domain::conversation_segment::ConversationSegment;
use crate::shared::constants::CLIP_EXTENSION;
use crate::shared::error::PipelineError;
use crate::video::domain::clip_extractor::ClipExtractor;

/// Clip file name for the `ordinal`-th segment (1-based).
pub fn clip_file_name(ordinal: usize, segment: &ConversationSegment) -> String {
    format!(
        "segment_{ordinal}_{:.2}_{:.2}.{CLIP_EXTENSION}",
        segment.start(),
        segment.end()
    )
}

/// Clips written and extractions that failed.
#[derive(Debug, Default)]
pub struct ClipReport {
    pub clips: Vec<PathBuf>,
    pub failures: Vec<PipelineError>,
}

/// Cuts every detected segment out of the source video.
///
/// A failed extraction is recorded and the next segment is still attempted.
pub struct ExtractClipsUseCase {
    extractor: Box<dyn ClipExtractor>,
}

impl ExtractClipsUseCase {
    pub fn new(extractor: Box<dyn ClipExtractor>) -> Self {
        Self { extractor }
    }

    pub fn execute(
        &self,
        source: &Path,
        segments: &[ConversationSegment],
        output_dir: &Path,
    ) -> ClipReport {
        let mut report = ClipReport::default();

        for (i, segment) in segments.iter().enumerate() {
            let ordinal = i + 1;
            let output = output_dir.join(clip_file_name(ordinal, segment));

            match self.extractor.extract(source, segment, &output) {
                Ok(()) => {
                    log::info!("Wrote {}", output.display());
                    report.clips.push(output);
                }
                Err(e) => {
                    let err = PipelineError::SegmentExtractionFailed {
                        ordinal,
                        start: segment.start(),
                        end: segment.end(),
                        reason: e.to_string(),
                    };
                    log::warn!("{err}");
                    report.failures.push(err);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct StubExtractor {
        fail_ordinals: Vec<usize>,
        calls: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ClipExtractor for StubExtractor {
        fn extract(
            &self,
            _source: &Path,
            _segment: &ConversationSegment,
            output: &Path,
        ) -> Result<(), Box<dyn std::error::Error>> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(output.to_path_buf());
            if self.fail_ordinals.contains(&calls.len()) {
                return Err("muxer refused".into());
            }
            Ok(())
        }
    }

    fn segments(bounds: &[(f64, f64)]) -> Vec<ConversationSegment> {
        bounds
            .iter()
            .map(|&(s, e)| ConversationSegment::new(s, e).unwrap())
            .collect()
    }

    #[test]
    fn test_clip_file_name_format() {
        let segment = ConversationSegment::new(2.0, 8.0).unwrap();
        assert_eq!(clip_file_name(1, &segment), "segment_1_2.00_8.00.mp4");

        let segment = ConversationSegment::new(12.346, 20.0).unwrap();
        assert_eq!(clip_file_name(3, &segment), "segment_3_12.35_20.00.mp4");
    }

    #[test]
    fn test_extracts_each_segment_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let use_case = ExtractClipsUseCase::new(Box::new(StubExtractor {
            fail_ordinals: vec![],
            calls: calls.clone(),
        }));

        let report = use_case.execute(
            Path::new("videos/abc.mp4"),
            &segments(&[(2.0, 8.0), (14.0, 20.0)]),
            Path::new("segments"),
        );

        assert_eq!(
            report.clips,
            vec![
                PathBuf::from("segments/segment_1_2.00_8.00.mp4"),
                PathBuf::from("segments/segment_2_14.00_20.00.mp4"),
            ]
        );
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_failure_does_not_stop_later_segments() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let use_case = ExtractClipsUseCase::new(Box::new(StubExtractor {
            fail_ordinals: vec![1],
            calls: calls.clone(),
        }));

        let report = use_case.execute(
            Path::new("v.mp4"),
            &segments(&[(0.0, 4.0), (10.0, 16.0)]),
            Path::new("out"),
        );

        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(report.clips.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0],
            PipelineError::SegmentExtractionFailed { ordinal: 1, .. }
        ));
    }

    #[test]
    fn test_no_segments_no_calls() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let use_case = ExtractClipsUseCase::new(Box::new(StubExtractor {
            fail_ordinals: vec![],
            calls: calls.clone(),
        }));
        let report = use_case.execute(Path::new("v.mp4"), &[], Path::new("out"));
        assert!(report.clips.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }
}
