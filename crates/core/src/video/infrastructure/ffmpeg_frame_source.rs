use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_source::FrameSource;

/// libavformat's internal time unit (microseconds), used by container-level
/// durations and seeks.
const AV_TIME_BASE: f64 = 1_000_000.0;

/// Decodes frames at arbitrary timestamps via ffmpeg-next.
///
/// Each lookup seeks to the nearest keyframe at or before the target, then
/// decodes forward until it reaches a frame presented at the target (within
/// half a frame interval). The demuxer lives from `open` to `close`; a fresh
/// decoder is built per lookup so no state leaks across seeks.
pub struct FfmpegFrameSource {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    video_stream_index: usize,
    time_base: ffmpeg_next::Rational,
    frame_slack: f64,
}

// Safety: FfmpegFrameSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegFrameSource {}

impl FfmpegFrameSource {
    pub fn new() -> Self {
        Self {
            input_ctx: None,
            video_stream_index: 0,
            time_base: ffmpeg_next::Rational(1, 1),
            frame_slack: 0.0,
        }
    }
}

impl Default for FfmpegFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FfmpegFrameSource {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let (metadata, video_stream_index, time_base) = {
            let stream = ictx
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or("No video stream found")?;

            let codec_ctx =
                ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
            let decoder = codec_ctx.decoder().video()?;

            let rate = stream.rate();
            let fps = if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            };

            let duration_secs = if ictx.duration() > 0 {
                ictx.duration() as f64 / AV_TIME_BASE
            } else if stream.duration() > 0 {
                stream.duration() as f64 * f64::from(stream.time_base())
            } else if fps > 0.0 {
                stream.frames() as f64 / fps
            } else {
                0.0
            };

            let metadata = VideoMetadata {
                width: decoder.width(),
                height: decoder.height(),
                fps,
                duration_secs,
                codec: decoder
                    .codec()
                    .map(|c| c.name().to_string())
                    .unwrap_or_default(),
                source_path: Some(path.to_path_buf()),
            };
            (metadata, stream.index(), stream.time_base())
        };

        log::debug!(
            "Opened {}: {}x{} {:.2} fps, {:.2}s",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.duration_secs
        );

        self.video_stream_index = video_stream_index;
        self.time_base = time_base;
        self.frame_slack = if metadata.fps > 0.0 {
            0.5 / metadata.fps
        } else {
            0.0
        };
        self.input_ctx = Some(ictx);

        Ok(metadata)
    }

    fn frame_at(&mut self, timestamp: f64) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(ictx) = self.input_ctx.as_mut() else {
            return Err("FfmpegFrameSource: not opened".into());
        };

        let target = (timestamp * AV_TIME_BASE) as i64;
        ictx.seek(target, ..target)?;

        let stream = ictx
            .stream(self.video_stream_index)
            .ok_or("Video stream disappeared")?;
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg_next::format::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let mut seek = SeekDecode {
            decoder,
            scaler,
            time_base: self.time_base,
            earliest: timestamp - self.frame_slack,
        };

        for (stream, packet) in ictx.packets() {
            if stream.index() != self.video_stream_index {
                continue;
            }
            if seek.decoder.send_packet(&packet).is_err() {
                continue;
            }
            if let Some(frame) = seek.receive_matching()? {
                return Ok(Some(frame));
            }
        }

        let _ = seek.decoder.send_eof();
        seek.receive_matching()
    }

    fn close(&mut self) {
        self.input_ctx = None;
    }
}

/// Decoder state for one lookup.
struct SeekDecode {
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    time_base: ffmpeg_next::Rational,
    earliest: f64,
}

impl SeekDecode {
    /// Drains decoded frames, returning the first one at or past the target.
    fn receive_matching(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let Some(pts) = decoded.timestamp().or(decoded.pts()) else {
                continue;
            };
            let presented_at = pts as f64 * f64::from(self.time_base);
            if presented_at < self.earliest {
                continue;
            }

            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
            self.scaler.run(&decoded, &mut rgb_frame)?;
            let (width, height) = (self.decoder.width(), self.decoder.height());
            let pixels = extract_rgb_pixels(&rgb_frame, width, height);
            return Ok(Some(Frame::new(pixels, width, height, 3, presented_at)));
        }
        Ok(None)
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row (stride > width*3).
/// This function strips that padding to produce a tightly-packed pixel buffer.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
