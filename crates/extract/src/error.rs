use thiserror::Error;

/// Errors that can occur while running an extraction job.
///
/// Each variant corresponds to a distinct failure stage so the HTTP layer can
/// pick an appropriate short message; the carried detail is for logs only and
/// must never reach a client verbatim.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The metadata probe failed: the source is missing, private, or the
    /// external tool could not reach it.
    #[error("source unreachable: {0}")]
    SourceUnreachable(String),

    /// The download/transcode job finished without producing the expected
    /// output file.
    #[error("conversion failed: {0}")]
    ConversionFailed(String),

    /// An output file exists but its leading bytes do not match the target
    /// format's signature (or the file is empty).
    #[error("invalid output format: {0}")]
    FormatInvalid(String),

    /// A filesystem error occurred while verifying the output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
