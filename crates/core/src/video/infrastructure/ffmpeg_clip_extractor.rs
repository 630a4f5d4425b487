use std::path::Path;

use crate::segmentation::domain::conversation_segment::ConversationSegment;
use crate::video::domain::clip_extractor::ClipExtractor;

/// libavformat's internal time unit (microseconds).
const AV_TIME_BASE: f64 = 1_000_000.0;

/// Bit rate for the re-encoded video when the source does not report one.
const DEFAULT_BIT_RATE: usize = 4_000_000;

/// Timestamps this close to a boundary count as on it.
const BOUNDARY_EPSILON: f64 = 1e-3;

/// Cuts `[start, end)` out of a video with ffmpeg-next.
///
/// The video stream is decoded from the keyframe at or before `start` and
/// re-encoded as MPEG-4 from the first frame presented at `start`, so the
/// clip never shows frames from before the segment. Packets of the best
/// audio stream that fall inside the range are copied unchanged. Both
/// streams are rebased so `start` becomes zero.
///
/// The clip is written next to its destination first and renamed into
/// place once the trailer is written.
pub struct FfmpegClipExtractor;

impl FfmpegClipExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegClipExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipExtractor for FfmpegClipExtractor {
    fn extract(
        &self,
        source: &Path,
        segment: &ConversationSegment,
        output: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp_path = output.with_extension("part.mp4");
        match cut_range(source, segment, &temp_path) {
            Ok(frames) => {
                std::fs::rename(&temp_path, output)?;
                log::debug!("Wrote {frames} frames to {}", output.display());
                Ok(())
            }
            Err(e) => {
                let _ = std::fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }
}

/// Copied audio stream: source index, source time base, output index.
#[derive(Clone, Copy)]
struct AudioCopy {
    source: usize,
    in_time_base: ffmpeg_next::Rational,
    output: usize,
}

/// Writes the clip to `output` and returns the number of video frames in it.
fn cut_range(
    source: &Path,
    segment: &ConversationSegment,
    output: &Path,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut ictx = ffmpeg_next::format::input(source)?;
    let mut octx = ffmpeg_next::format::output(output)?;

    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

    let (video_src_idx, video_in_tb, fps, decoder) = {
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream in source file")?;
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;
        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            f64::from(rate)
        } else {
            0.0
        };
        (stream.index(), stream.time_base(), fps, decoder)
    };

    let fps_i = fps.round() as i32;
    let fps_i = if fps_i <= 0 { 30 } else { fps_i };

    let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
        .ok_or("MPEG-4 encoder not found")?;
    let mut ost_video = octx.add_stream(Some(codec))?;
    let video_ost_idx = ost_video.index();

    let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()?;
    encoder_ctx.set_width(decoder.width());
    encoder_ctx.set_height(decoder.height());
    encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
    encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps_i));
    encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps_i, 1)));
    encoder_ctx.set_bit_rate(match decoder.bit_rate() {
        0 => DEFAULT_BIT_RATE,
        rate => rate,
    });
    if global_header {
        encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
    }
    let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
    ost_video.set_parameters(&encoder);

    let audio = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
        Some(stream) => {
            let mut ost_audio =
                octx.add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))?;
            ost_audio.set_parameters(stream.parameters());
            unsafe {
                (*ost_audio.parameters().as_mut_ptr()).codec_tag = 0;
            }
            Some(AudioCopy {
                source: stream.index(),
                in_time_base: stream.time_base(),
                output: ost_audio.index(),
            })
        }
        None => None,
    };

    octx.write_header()?;

    let out_time_bases: Vec<ffmpeg_next::Rational> =
        octx.streams().map(|stream| stream.time_base()).collect();

    let scaler = ffmpeg_next::software::scaling::Context::get(
        decoder.format(),
        decoder.width(),
        decoder.height(),
        ffmpeg_next::format::Pixel::YUV420P,
        decoder.width(),
        decoder.height(),
        ffmpeg_next::software::scaling::Flags::BILINEAR,
    )?;

    let mut cut = RangeEncode {
        decoder,
        scaler,
        encoder,
        in_time_base: video_in_tb,
        enc_time_base: ffmpeg_next::Rational(1, fps_i),
        out_time_base: out_time_bases[video_ost_idx],
        stream_index: video_ost_idx,
        fps: f64::from(fps_i),
        start: segment.start(),
        end: segment.end(),
        next_pts: None,
        written: 0,
        done: false,
    };

    let seek_to = (segment.start() * AV_TIME_BASE) as i64;
    ictx.seek(seek_to, ..seek_to)?;

    for (stream, mut packet) in ictx.packets() {
        let ist_idx = stream.index();
        if ist_idx == video_src_idx {
            if cut.done {
                if audio.is_none() {
                    break;
                }
                continue;
            }
            if cut.decoder.send_packet(&packet).is_err() {
                continue;
            }
            cut.drain_decoder(&mut octx)?;
            continue;
        }

        let Some(audio) = audio.filter(|a| a.source == ist_idx) else {
            continue;
        };
        let Some(ts) = packet.pts().or(packet.dts()) else {
            continue;
        };
        let seconds = ts as f64 * f64::from(audio.in_time_base);
        if seconds < segment.start() {
            continue;
        }
        if seconds >= segment.end() {
            if cut.done {
                break;
            }
            continue;
        }
        let shift = (segment.start() / f64::from(audio.in_time_base)).round() as i64;
        packet.set_pts(packet.pts().map(|p| p - shift));
        packet.set_dts(packet.dts().map(|d| d - shift));
        packet.rescale_ts(audio.in_time_base, out_time_bases[audio.output]);
        packet.set_position(-1);
        packet.set_stream(audio.output);
        packet.write_interleaved(&mut octx)?;
    }

    if !cut.done {
        let _ = cut.decoder.send_eof();
        cut.drain_decoder(&mut octx)?;
    }

    if cut.written == 0 {
        return Err(format!(
            "no video between {:.2}s and {:.2}s",
            segment.start(),
            segment.end()
        )
        .into());
    }

    cut.encoder.send_eof()?;
    cut.write_packets(&mut octx)?;
    octx.write_trailer()?;
    Ok(cut.written)
}

/// Decode-filter-encode state for the video stream of one clip.
struct RangeEncode {
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    encoder: ffmpeg_next::codec::encoder::video::Encoder,
    in_time_base: ffmpeg_next::Rational,
    enc_time_base: ffmpeg_next::Rational,
    out_time_base: ffmpeg_next::Rational,
    stream_index: usize,
    fps: f64,
    start: f64,
    end: f64,
    /// Set by the first frame kept, from its offset to `start`.
    next_pts: Option<i64>,
    written: usize,
    done: bool,
}

impl RangeEncode {
    /// Re-encodes every decoded frame presented inside `[start, end)`.
    fn drain_decoder(
        &mut self,
        octx: &mut ffmpeg_next::format::context::Output,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let Some(pts) = decoded.timestamp().or(decoded.pts()) else {
                continue;
            };
            let presented_at = pts as f64 * f64::from(self.in_time_base);
            if presented_at + BOUNDARY_EPSILON < self.start {
                continue;
            }
            if presented_at + BOUNDARY_EPSILON >= self.end {
                self.done = true;
                break;
            }

            let pts = *self
                .next_pts
                .get_or_insert(((presented_at - self.start).max(0.0) * self.fps).round() as i64);

            let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
            self.scaler.run(&decoded, &mut yuv_frame)?;
            yuv_frame.set_pts(Some(pts));
            self.encoder.send_frame(&yuv_frame)?;
            self.next_pts = Some(pts + 1);
            self.written += 1;
            self.write_packets(octx)?;
        }
        Ok(())
    }

    fn write_packets(
        &mut self,
        octx: &mut ffmpeg_next::format::context::Output,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut encoded = ffmpeg_next::Packet::empty();
        while self.encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.stream_index);
            encoded.rescale_ts(self.enc_time_base, self.out_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}
