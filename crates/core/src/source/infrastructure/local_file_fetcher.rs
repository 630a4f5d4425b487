use std::path::PathBuf;

use crate::shared::error::PipelineError;
use crate::source::domain::source_fetcher::SourceFetcher;

/// Accepts sources that already exist on disk.
pub struct LocalFileFetcher;

impl SourceFetcher for LocalFileFetcher {
    fn fetch(&self, source: &str) -> Result<PathBuf, PipelineError> {
        let path = PathBuf::from(source);
        if path.is_file() {
            Ok(path)
        } else {
            Err(PipelineError::source_unavailable(source, "no such file"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_file_is_returned() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = file.path().to_str().unwrap();
        assert_eq!(LocalFileFetcher.fetch(source).unwrap(), file.path());
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        assert!(matches!(
            LocalFileFetcher.fetch("/nonexistent/video.mp4"),
            Err(PipelineError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LocalFileFetcher.fetch(dir.path().to_str().unwrap()).is_err());
    }
}
