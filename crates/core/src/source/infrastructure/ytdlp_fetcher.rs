use std::path::PathBuf;
use std::process::Command;

use reqwest::Url;

use crate::shared::constants::{CLIP_EXTENSION, YT_DLP_BINARY, YT_DLP_FORMAT};
use crate::shared::error::PipelineError;
use crate::source::domain::source_fetcher::SourceFetcher;

/// Downloads remote videos with the `yt-dlp` command-line tool.
///
/// Files are named after the video ID so a second run over the same URL
/// reuses the earlier download instead of fetching it again.
pub struct YtDlpFetcher {
    video_dir: PathBuf,
    binary: String,
}

impl YtDlpFetcher {
    pub fn new(video_dir: impl Into<PathBuf>) -> Self {
        Self {
            video_dir: video_dir.into(),
            binary: YT_DLP_BINARY.to_string(),
        }
    }

    /// Overrides the downloader executable (defaults to `yt-dlp` on `PATH`).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn download(&self, url: &str, dest: &std::path::Path) -> Result<(), PipelineError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["-f", YT_DLP_FORMAT, "-o"]).arg(dest).arg(url);
        log::debug!("Running {cmd:?}");

        let output = cmd.output().map_err(|e| {
            PipelineError::source_unavailable(url, format!("failed to run {}: {e}", self.binary))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("no output");
            return Err(PipelineError::source_unavailable(
                url,
                format!(
                    "{} exited with status {}: {detail}",
                    self.binary,
                    output.status.code().unwrap_or(-1)
                ),
            ));
        }
        if !dest.exists() {
            return Err(PipelineError::source_unavailable(
                url,
                format!("{} reported success but wrote no file", self.binary),
            ));
        }
        Ok(())
    }
}

impl SourceFetcher for YtDlpFetcher {
    fn fetch(&self, source: &str) -> Result<PathBuf, PipelineError> {
        let url = Url::parse(source)
            .map_err(|e| PipelineError::source_unavailable(source, format!("invalid URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PipelineError::source_unavailable(
                source,
                format!("unsupported URL scheme '{}'", url.scheme()),
            ));
        }
        let id = video_id(&url).ok_or_else(|| {
            PipelineError::source_unavailable(source, "cannot derive a video ID from URL")
        })?;

        let dest = self.video_dir.join(format!("{id}.{CLIP_EXTENSION}"));
        if dest.exists() {
            log::info!("Video already exists at {}", dest.display());
            return Ok(dest);
        }

        std::fs::create_dir_all(&self.video_dir)
            .map_err(|e| PipelineError::source_unavailable(source, e))?;

        log::info!("Downloading {source} to {}", dest.display());
        self.download(source, &dest)?;
        Ok(dest)
    }
}

/// Stable file stem for a video URL.
///
/// YouTube watch links use the `v` query parameter, `youtu.be` links their
/// first path segment; anything else falls back to the last path segment.
fn video_id(url: &Url) -> Option<String> {
    let host = url.host_str().unwrap_or_default();
    let mut segments = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect::<Vec<_>>())
        .unwrap_or_default();

    let raw = if host.ends_with("youtu.be") {
        segments.first().map(|s| s.to_string())
    } else if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        Some(v.into_owned())
    } else {
        segments.pop().map(|s| s.to_string())
    }?;

    let stem: String = raw
        .trim_end_matches(&format!(".{CLIP_EXTENSION}"))
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::watch("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case::watch_extra_params("https://www.youtube.com/watch?v=abc123&t=42s", "abc123")]
    #[case::short_link("https://youtu.be/abc-_123?si=xyz", "abc-_123")]
    #[case::plain_file("https://example.com/media/panel.mp4", "panel")]
    #[case::trailing_slash("https://example.com/videos/episode7/", "episode7")]
    fn test_video_id(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(video_id(&Url::parse(url).unwrap()).as_deref(), Some(expected));
    }

    #[test]
    fn test_video_id_without_path_or_query() {
        assert_eq!(video_id(&Url::parse("https://example.com/").unwrap()), None);
    }

    #[test]
    fn test_invalid_url_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = YtDlpFetcher::new(dir.path());
        assert!(matches!(
            fetcher.fetch("not a url"),
            Err(PipelineError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = YtDlpFetcher::new(dir.path());
        assert!(fetcher.fetch("ftp://example.com/video.mp4").is_err());
    }

    #[test]
    fn test_existing_download_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let cached = dir.path().join("abc123.mp4");
        std::fs::write(&cached, b"video").unwrap();

        let fetcher = YtDlpFetcher::new(dir.path()).with_binary("/nonexistent/yt-dlp");
        let path = fetcher
            .fetch("https://www.youtube.com/watch?v=abc123")
            .unwrap();
        assert_eq!(path, cached);
    }

    #[test]
    fn test_missing_binary_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = YtDlpFetcher::new(dir.path()).with_binary("/nonexistent/yt-dlp");
        let err = fetcher
            .fetch("https://www.youtube.com/watch?v=abc123")
            .unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { .. }));
        assert!(err.to_string().contains("failed to run"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_downloader_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = YtDlpFetcher::new(dir.path()).with_binary("false");
        let err = fetcher
            .fetch("https://www.youtube.com/watch?v=abc123")
            .unwrap_err();
        assert!(err.to_string().contains("exited with status"));
    }

    #[cfg(unix)]
    #[test]
    fn test_downloader_that_writes_nothing_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = YtDlpFetcher::new(dir.path()).with_binary("true");
        let err = fetcher
            .fetch("https://www.youtube.com/watch?v=abc123")
            .unwrap_err();
        assert!(err.to_string().contains("wrote no file"));
    }
}
