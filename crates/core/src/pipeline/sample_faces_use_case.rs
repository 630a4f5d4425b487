use std::path::{Path, PathBuf};

use crate::detection::domain::face_classifier::FaceClassifier;
use crate::sampling::domain::sample::{Sample, SampleSequence};
use crate::sampling::domain::sample_schedule::SampleSchedule;
use crate::shared::constants::FRAME_DUMP_EXTENSION;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_source::FrameSource;
use crate::video::domain::image_writer::ImageWriter;

/// `(current, total) -> keep_going`; returning `false` cancels the run.
pub type ProgressCallback = Box<dyn Fn(usize, usize) -> bool + Send>;

/// Where sampled frames are copied before classification.
pub struct FrameDump {
    writer: Box<dyn ImageWriter>,
    dir: PathBuf,
}

impl FrameDump {
    pub fn new(writer: Box<dyn ImageWriter>, dir: impl Into<PathBuf>) -> Self {
        Self {
            writer,
            dir: dir.into(),
        }
    }

    fn path_for(&self, timestamp: f64) -> PathBuf {
        let millis = (timestamp * 1000.0).round() as u64;
        self.dir
            .join(format!("frame_{millis:08}.{FRAME_DUMP_EXTENSION}"))
    }
}

/// Result of sampling one video.
#[derive(Debug)]
pub struct SamplingReport {
    pub metadata: VideoMetadata,
    pub sequence: SampleSequence,
    /// Timestamps that produced no sample, as `FrameUnavailable` errors.
    pub skipped: Vec<PipelineError>,
}

/// Decodes one frame per sampling tick and records its face count.
pub struct SampleFacesUseCase {
    source: Box<dyn FrameSource>,
    classifier: Box<dyn FaceClassifier>,
    frame_dump: Option<FrameDump>,
    on_progress: Option<ProgressCallback>,
}

impl SampleFacesUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        classifier: Box<dyn FaceClassifier>,
        frame_dump: Option<FrameDump>,
        on_progress: Option<ProgressCallback>,
    ) -> Self {
        Self {
            source,
            classifier,
            frame_dump,
            on_progress,
        }
    }

    /// Opens `video`, samples it at `sampling_rate` and closes it again,
    /// whether or not sampling succeeded.
    pub fn execute(
        &mut self,
        video: &Path,
        sampling_rate: f64,
    ) -> Result<SamplingReport, PipelineError> {
        let metadata = self
            .source
            .open(video)
            .map_err(|e| PipelineError::source_unavailable(video.display().to_string(), e))?;

        let result = self.sample_opened(metadata, sampling_rate);
        self.source.close();
        result
    }

    fn sample_opened(
        &mut self,
        metadata: VideoMetadata,
        sampling_rate: f64,
    ) -> Result<SamplingReport, PipelineError> {
        let video = metadata
            .source_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        if !(metadata.duration_secs.is_finite() && metadata.duration_secs > 0.0) {
            return Err(PipelineError::source_unavailable(
                video,
                "video reports no playable duration",
            ));
        }

        let schedule = SampleSchedule::new(sampling_rate, metadata.duration_secs)?;
        let mut sequence = SampleSequence::new(sampling_rate, metadata.duration_secs)?;
        let mut skipped = Vec::new();
        let total = metadata.expected_samples(sampling_rate);

        log::info!(
            "Sampling {:.1}s of video at {sampling_rate} samples/s ({total} samples)",
            metadata.duration_secs
        );

        for (i, timestamp) in schedule.enumerate() {
            match self.source.frame_at(timestamp) {
                Ok(Some(frame)) => {
                    self.dump(&frame, timestamp);
                    let face_count = self.classifier.classify(&frame).map_err(|e| {
                        PipelineError::ClassificationFailed {
                            timestamp,
                            reason: e.to_string(),
                        }
                    })?;
                    sequence.push(Sample::new(timestamp, face_count))?;
                }
                Ok(None) => {
                    log::warn!("No frame at {timestamp:.2}s, skipping sample");
                    skipped.push(PipelineError::FrameUnavailable {
                        timestamp,
                        reason: "no frame at or after timestamp".into(),
                    });
                }
                Err(e) => {
                    log::warn!("Failed to decode frame at {timestamp:.2}s: {e}");
                    skipped.push(PipelineError::FrameUnavailable {
                        timestamp,
                        reason: e.to_string(),
                    });
                }
            }

            if let Some(ref cb) = self.on_progress {
                if !cb(i + 1, total) {
                    return Err(PipelineError::Cancelled);
                }
            }
        }

        if sequence.is_empty() && !skipped.is_empty() {
            return Err(PipelineError::source_unavailable(
                video,
                format!("no frame could be decoded ({} attempts)", skipped.len()),
            ));
        }

        log::info!(
            "Collected {} samples ({} skipped)",
            sequence.len(),
            skipped.len()
        );

        Ok(SamplingReport {
            metadata,
            sequence,
            skipped,
        })
    }

    fn dump(&self, frame: &Frame, timestamp: f64) {
        let Some(ref dump) = self.frame_dump else {
            return;
        };
        let path = dump.path_for(timestamp);
        if let Err(e) = dump.writer.write(&path, frame) {
            log::warn!("Failed to write {}: {e}", path.display());
        }
    }
}
