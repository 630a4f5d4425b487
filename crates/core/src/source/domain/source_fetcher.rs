use std::path::PathBuf;

use crate::shared::error::PipelineError;

/// Turns a user-supplied source reference (URL or path) into a local file.
///
/// Failures must surface as [`PipelineError::SourceUnavailable`] so callers
/// can tell a bad source apart from a processing failure.
pub trait SourceFetcher: Send {
    fn fetch(&self, source: &str) -> Result<PathBuf, PipelineError>;
}
