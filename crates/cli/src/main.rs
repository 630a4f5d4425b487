use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use convoclip_core::detection::domain::face_classifier::FaceClassifier;
use convoclip_core::detection::infrastructure::onnx_yolo_face_counter::{
    OnnxYoloFaceCounter, DEFAULT_CONFIDENCE,
};
use convoclip_core::pipeline::extract_clips_use_case::ExtractClipsUseCase;
use convoclip_core::pipeline::extract_conversations_use_case::ExtractConversationsUseCase;
use convoclip_core::pipeline::sample_faces_use_case::{
    FrameDump, ProgressCallback, SampleFacesUseCase,
};
use convoclip_core::pipeline::settings::ExtractionSettings;
use convoclip_core::shared::constants::{
    DEFAULT_MIN_DURATION_SECS, DEFAULT_MIN_FACES, DEFAULT_OUTPUT_DIR, DEFAULT_SAMPLING_RATE,
    DEFAULT_VIDEO_DIR, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};
use convoclip_core::shared::model_resolver;
use convoclip_core::source::domain::source_fetcher::SourceFetcher;
use convoclip_core::source::infrastructure::local_file_fetcher::LocalFileFetcher;
use convoclip_core::source::infrastructure::ytdlp_fetcher::YtDlpFetcher;
use convoclip_core::video::infrastructure::ffmpeg_clip_extractor::FfmpegClipExtractor;
use convoclip_core::video::infrastructure::ffmpeg_frame_source::FfmpegFrameSource;
use convoclip_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Extract multi-person conversation clips from a video.
#[derive(Parser, Debug)]
#[command(name = "convoclip")]
struct Cli {
    /// Video URL (downloaded with yt-dlp) or local video file.
    source: String,

    /// Frames sampled per second of video.
    #[arg(long, default_value_t = DEFAULT_SAMPLING_RATE)]
    sampling_rate: f64,

    /// Shortest conversation worth extracting, in seconds.
    #[arg(long, default_value_t = DEFAULT_MIN_DURATION_SECS)]
    min_duration: f64,

    /// Consecutive non-matching samples tolerated inside a conversation.
    #[arg(long, default_value_t = 0)]
    max_gap_samples: usize,

    /// Faces needed in a frame to count as a conversation.
    #[arg(long, default_value_t = DEFAULT_MIN_FACES)]
    min_faces: usize,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Directory for extracted clips.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Directory for downloaded videos.
    #[arg(long, default_value = DEFAULT_VIDEO_DIR)]
    video_dir: PathBuf,

    /// Save every sampled frame to this directory.
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Use this ONNX face model instead of the cached download.
    #[arg(long)]
    model: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = settings(&cli);
    settings.validate()?;

    let classifier = build_classifier(&cli)?;
    let frame_dump = cli
        .frames_dir
        .as_ref()
        .map(|dir| FrameDump::new(Box::new(ImageFileWriter::new()), dir));

    let progress: ProgressCallback = Box::new(|current, total| {
        eprint!("\rSampling frame {current}/{total}");
        true
    });

    let sampler = SampleFacesUseCase::new(
        Box::new(FfmpegFrameSource::new()),
        classifier,
        frame_dump,
        Some(progress),
    );
    let clips = ExtractClipsUseCase::new(Box::new(FfmpegClipExtractor::new()));

    let mut use_case =
        ExtractConversationsUseCase::new(build_fetcher(&cli), sampler, clips, settings);
    let summary = use_case.execute(&cli.source);
    eprintln!();
    let summary = summary?;

    if summary.segments.is_empty() {
        log::info!("No multi-person segments found");
    }
    print!("{summary}");
    Ok(())
}

fn settings(cli: &Cli) -> ExtractionSettings {
    ExtractionSettings {
        sampling_rate: cli.sampling_rate,
        min_duration: cli.min_duration,
        max_gap_samples: cli.max_gap_samples,
        min_faces: cli.min_faces,
        output_dir: cli.output_dir.clone(),
    }
}

fn build_fetcher(cli: &Cli) -> Box<dyn SourceFetcher> {
    if Path::new(&cli.source).is_file() {
        Box::new(LocalFileFetcher)
    } else {
        Box::new(YtDlpFetcher::new(&cli.video_dir))
    }
}

fn build_classifier(cli: &Cli) -> Result<Box<dyn FaceClassifier>, Box<dyn std::error::Error>> {
    let model_path = match cli.model {
        Some(ref path) => path.clone(),
        None => {
            log::info!("Resolving model: {YOLO_MODEL_NAME}");
            let path = model_resolver::resolve(
                YOLO_MODEL_NAME,
                YOLO_MODEL_URL,
                None,
                Some(Box::new(download_progress)),
            )?;
            eprintln!();
            path
        }
    };

    Ok(Box::new(OnnxYoloFaceCounter::new(
        &model_path,
        cli.confidence,
    )?))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.source.trim().is_empty() {
        return Err("Source must not be empty".into());
    }
    if !(cli.sampling_rate.is_finite() && cli.sampling_rate > 0.0) {
        return Err(format!(
            "Sampling rate must be positive, got {}",
            cli.sampling_rate
        )
        .into());
    }
    if !(cli.min_duration.is_finite() && cli.min_duration > 0.0) {
        return Err(format!(
            "Minimum duration must be positive, got {}",
            cli.min_duration
        )
        .into());
    }
    if cli.min_faces == 0 {
        return Err("Minimum faces must be at least 1".into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if let Some(ref model) = cli.model {
        if !model.is_file() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
