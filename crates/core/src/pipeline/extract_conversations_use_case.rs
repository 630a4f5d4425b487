use crate::shared::error::PipelineError;
use crate::source::domain::source_fetcher::SourceFetcher;

use super::extract_clips_use_case::ExtractClipsUseCase;
use super::run_summary::RunSummary;
use super::sample_faces_use_case::SampleFacesUseCase;
use super::settings::ExtractionSettings;

/// End-to-end run: fetch the video, sample face counts, detect
/// multi-person segments and cut them into clips.
///
/// Fatal errors abort the run; skipped frames and failed clips end up in
/// the returned summary.
pub struct ExtractConversationsUseCase {
    fetcher: Box<dyn SourceFetcher>,
    sampler: SampleFacesUseCase,
    clips: ExtractClipsUseCase,
    settings: ExtractionSettings,
}

impl ExtractConversationsUseCase {
    pub fn new(
        fetcher: Box<dyn SourceFetcher>,
        sampler: SampleFacesUseCase,
        clips: ExtractClipsUseCase,
        settings: ExtractionSettings,
    ) -> Self {
        Self {
            fetcher,
            sampler,
            clips,
            settings,
        }
    }

    pub fn execute(&mut self, source: &str) -> Result<RunSummary, PipelineError> {
        let detector = self.settings.detector()?;

        let video = self.fetcher.fetch(source)?;
        log::info!("Processing {}", video.display());

        let report = self.sampler.execute(&video, self.settings.sampling_rate)?;
        let segments = detector.detect(&report.sequence);
        log::info!("Detected {} multi-person segment(s)", segments.len());

        let clips = self
            .clips
            .execute(&video, &segments, &self.settings.output_dir);

        Ok(RunSummary {
            video,
            metadata: report.metadata,
            samples: report.sequence.len(),
            segments,
            clips: clips.clips,
            skipped_frames: report.skipped,
            failed_extractions: clips.failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_classifier::FaceClassifier;
    use crate::segmentation::domain::conversation_segment::ConversationSegment;
    use crate::shared::frame::Frame;
    use crate::shared::video_metadata::VideoMetadata;
    use crate::video::domain::clip_extractor::ClipExtractor;
    use crate::video::domain::frame_source::FrameSource;
    use approx::assert_relative_eq;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubFetcher {
        path: Option<PathBuf>,
    }

    impl SourceFetcher for StubFetcher {
        fn fetch(&self, source: &str) -> Result<PathBuf, PipelineError> {
            self.path
                .clone()
                .ok_or_else(|| PipelineError::source_unavailable(source, "404"))
        }
    }

    struct StubSource {
        duration: f64,
    }

    impl FrameSource for StubSource {
        fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            Ok(VideoMetadata {
                width: 2,
                height: 2,
                fps: 30.0,
                duration_secs: self.duration,
                codec: "stub".into(),
                source_path: Some(path.to_path_buf()),
            })
        }

        fn frame_at(
            &mut self,
            timestamp: f64,
        ) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
            Ok(Some(Frame::new(vec![0; 12], 2, 2, 3, timestamp)))
        }

        fn close(&mut self) {}
    }

    /// Face count for the frame at `i * 2s` is `counts[i]`.
    struct ScriptedClassifier {
        counts: Vec<usize>,
    }

    impl FaceClassifier for ScriptedClassifier {
        fn classify(&mut self, frame: &Frame) -> Result<usize, Box<dyn std::error::Error>> {
            let index = (frame.timestamp() / 2.0).round() as usize;
            Ok(self.counts.get(index).copied().unwrap_or(0))
        }
    }

    #[allow(clippy::type_complexity)]
    struct RecordingExtractor {
        calls: Arc<Mutex<Vec<(f64, f64, PathBuf)>>>,
    }

    impl ClipExtractor for RecordingExtractor {
        fn extract(
            &self,
            _source: &Path,
            segment: &ConversationSegment,
            output: &Path,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.calls
                .lock()
                .unwrap()
                .push((segment.start(), segment.end(), output.to_path_buf()));
            Ok(())
        }
    }

    #[allow(clippy::type_complexity)]
    fn use_case(
        fetched: Option<&str>,
        duration: f64,
        counts: &[usize],
        settings: ExtractionSettings,
    ) -> (
        ExtractConversationsUseCase,
        Arc<Mutex<Vec<(f64, f64, PathBuf)>>>,
    ) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let use_case = ExtractConversationsUseCase::new(
            Box::new(StubFetcher {
                path: fetched.map(PathBuf::from),
            }),
            SampleFacesUseCase::new(
                Box::new(StubSource { duration }),
                Box::new(ScriptedClassifier {
                    counts: counts.to_vec(),
                }),
                None,
                None,
            ),
            ExtractClipsUseCase::new(Box::new(RecordingExtractor {
                calls: calls.clone(),
            })),
            settings,
        );
        (use_case, calls)
    }

    #[test]
    fn test_interview_scenario_end_to_end() {
        let (mut uc, calls) = use_case(
            Some("videos/abc.mp4"),
            12.0,
            &[1, 2, 2, 2, 1, 3],
            ExtractionSettings::default(),
        );

        let summary = uc.execute("https://www.youtube.com/watch?v=abc").unwrap();

        assert_eq!(summary.samples, 6);
        assert_relative_eq!(summary.metadata.duration_secs, 12.0);
        assert_eq!(summary.metadata.codec, "stub");
        assert_eq!(summary.segments.len(), 1);
        assert_relative_eq!(summary.segments[0].start(), 2.0);
        assert_relative_eq!(summary.segments[0].end(), 8.0);
        assert_relative_eq!(summary.total_multi_person_secs(), 6.0);
        assert_eq!(
            summary.clips,
            vec![PathBuf::from("segments/segment_1_2.00_8.00.mp4")]
        );
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(summary.failed_extractions.is_empty());
    }

    #[test]
    fn test_no_multi_person_samples_yields_empty_summary() {
        let (mut uc, calls) = use_case(
            Some("v.mp4"),
            10.0,
            &[0, 1, 1, 0, 1],
            ExtractionSettings::default(),
        );
        let summary = uc.execute("v.mp4").unwrap();
        assert!(summary.segments.is_empty());
        assert!(summary.clips.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_settings_shape_detection() {
        let settings = ExtractionSettings {
            min_duration: 2.0,
            max_gap_samples: 1,
            output_dir: PathBuf::from("clips"),
            ..Default::default()
        };
        let (mut uc, _) = use_case(Some("v.mp4"), 12.0, &[2, 2, 0, 2, 0, 0], settings);

        let summary = uc.execute("v.mp4").unwrap();

        assert_eq!(summary.segments.len(), 1);
        assert_relative_eq!(summary.segments[0].start(), 0.0);
        assert_relative_eq!(summary.segments[0].end(), 8.0);
        assert_eq!(
            summary.clips,
            vec![PathBuf::from("clips/segment_1_0.00_8.00.mp4")]
        );
    }

    #[test]
    fn test_fetch_failure_aborts() {
        let (mut uc, calls) = use_case(None, 10.0, &[2; 5], ExtractionSettings::default());
        let err = uc.execute("https://example.com/gone").unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { .. }));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_settings_abort_before_fetch() {
        let settings = ExtractionSettings {
            min_duration: 0.0,
            ..Default::default()
        };
        let (mut uc, _) = use_case(None, 10.0, &[], settings);
        let err = uc.execute("v.mp4").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfiguration(_)));
    }
}
