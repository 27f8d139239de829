//! Extraction job runner: wraps the external media-extraction tool behind a
//! narrow async trait.
//!
//! The runner owns the full probe → download/transcode → verify sequence.
//! Callers hand it a source URL and an output directory and get back either a
//! verified on-disk audio file or a typed [`ExtractError`]; they never see
//! the external tool's raw output.

pub mod error;
pub mod ytdlp;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use audiofetch_core::AudioFormat;

pub use error::ExtractError;
pub use ytdlp::YtDlp;

/// A verified extraction artifact.
///
/// The physical file is owned by whoever registers it next; the runner does
/// not track it after returning.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Absolute path of the produced audio file.
    pub file_path: PathBuf,
    /// Human-readable title reported by the source probe.
    pub title: String,
    /// Size of the produced file in bytes. Always non-zero.
    pub size_bytes: u64,
    /// Container format the output was verified against.
    pub format: AudioFormat,
}

/// The extraction black box: URL + output directory in, verified file out.
///
/// Implementations block the calling task for the job's full duration, which
/// may be seconds to minutes. Within one call the probe always completes
/// before the download begins, and verification completes before the result
/// is returned.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Run a full extraction job for `url`, writing into `output_dir`.
    async fn extract(&self, url: &str, output_dir: &Path) -> Result<Extraction, ExtractError>;
}
