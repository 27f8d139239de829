use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use audiofetch_core::AudioFormat;

use crate::{error::ExtractError, Extraction, MediaExtractor};

/// Longest title prefix kept in generated file names.
const MAX_STEM_TITLE_LEN: usize = 80;

/// How many leading bytes to read for the signature check.
const SIGNATURE_PROBE_LEN: usize = 16;

/// Extraction runner backed by the `yt-dlp` command-line tool.
///
/// Each job runs the tool twice: once with `--dump-json` to probe metadata
/// without downloading (fail fast on dead or private sources), then again to
/// download and transcode the audio track. Output files are named from the
/// sanitized title plus a millisecond timestamp token, so concurrent jobs
/// for the same source cannot collide and the final path is computable
/// without parsing tool output.
pub struct YtDlp {
    binary: PathBuf,
    format: AudioFormat,
    audio_quality: String,
    probe_timeout: Duration,
    download_timeout: Duration,
}

impl YtDlp {
    /// Create a runner invoking the given `yt-dlp` binary, producing MP3 at
    /// 192K with default timeouts.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            format: AudioFormat::Mp3,
            audio_quality: "192K".to_owned(),
            probe_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(600),
        }
    }

    /// Override the probe and download timeouts.
    pub fn with_timeouts(mut self, probe: Duration, download: Duration) -> Self {
        self.probe_timeout = probe;
        self.download_timeout = download;
        self
    }

    /// Probe the source for its title without downloading anything.
    async fn probe(&self, url: &str) -> Result<String, ExtractError> {
        let output = self
            .run(
                &[
                    "--dump-json",
                    "--no-playlist",
                    "--no-warnings",
                    "--socket-timeout",
                    "15",
                    url,
                ],
                self.probe_timeout,
            )
            .await
            .map_err(ExtractError::SourceUnreachable)?;

        parse_probe_title(&output)
    }

    /// Run the actual download + transcode into `output_dir` using `stem` as
    /// the output template base.
    async fn download(
        &self,
        url: &str,
        output_dir: &Path,
        stem: &str,
    ) -> Result<(), ExtractError> {
        let template = format!("{stem}.%(ext)s");
        let dir = output_dir.display().to_string();
        let args = [
            "-x",
            "--audio-format",
            self.format.extension(),
            "--audio-quality",
            &self.audio_quality,
            "--no-playlist",
            "--no-warnings",
            "-P",
            &dir,
            "-o",
            &template,
            url,
        ];

        self.run(&args, self.download_timeout)
            .await
            .map(|_| ())
            .map_err(ExtractError::ConversionFailed)
    }

    /// Spawn the tool with `args`, enforcing `timeout`. Returns stdout on
    /// success; on any failure returns a short description with the raw
    /// stderr relegated to the debug log.
    async fn run(&self, args: &[&str], timeout: Duration) -> Result<Vec<u8>, String> {
        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = tokio::time::timeout(timeout, command.output()).await;

        match result {
            Ok(Ok(output)) if output.status.success() => Ok(output.stdout),
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                debug!(tool = %self.binary.display(), %stderr, "extraction tool failed");
                Err(summarize_stderr(&stderr))
            }
            Ok(Err(e)) => Err(format!("failed to start {}: {e}", self.binary.display())),
            Err(_) => Err(format!("timed out after {}s", timeout.as_secs())),
        }
    }

    /// Verify a finished output file: it must exist, be non-empty, and carry
    /// the target format's signature. A rejected artifact is removed so a
    /// corrupt file never lingers in the shared output directory.
    async fn verify(&self, path: &Path) -> Result<u64, ExtractError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExtractError::ConversionFailed(
                    "no output file after job completion".to_owned(),
                ));
            }
            Err(e) => return Err(ExtractError::Io(e)),
        };

        let mut file = tokio::fs::File::open(path).await?;
        let mut header = [0u8; SIGNATURE_PROBE_LEN];
        let read = file.read(&mut header).await?;
        drop(file);

        if metadata.len() == 0 || !self.format.matches_signature(&header[..read]) {
            if let Err(e) = tokio::fs::remove_file(path).await {
                warn!(path = %path.display(), error = %e, "failed to remove rejected output");
            }
            return Err(ExtractError::FormatInvalid(format!(
                "output does not look like {}",
                self.format.extension()
            )));
        }

        Ok(metadata.len())
    }
}

#[async_trait]
impl MediaExtractor for YtDlp {
    async fn extract(&self, url: &str, output_dir: &Path) -> Result<Extraction, ExtractError> {
        let title = self.probe(url).await?;
        info!(%title, "probe succeeded, starting download");

        let stem = output_stem(&title);
        self.download(url, output_dir, &stem).await?;

        // The template plus the chosen codec's extension fully determines
        // where the tool put the file.
        let file_path = output_dir.join(format!("{stem}.{}", self.format.extension()));
        let size_bytes = self.verify(&file_path).await?;
        info!(path = %file_path.display(), size_bytes, "extraction verified");

        Ok(Extraction {
            file_path,
            title,
            size_bytes,
            format: self.format,
        })
    }
}

/// Extract the title from a `--dump-json` probe payload.
fn parse_probe_title(stdout: &[u8]) -> Result<String, ExtractError> {
    let json: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| ExtractError::SourceUnreachable(format!("unparseable probe output: {e}")))?;

    Ok(json["title"].as_str().unwrap_or("unknown_title").to_owned())
}

/// Build the unique output-name base: sanitized title + timestamp token.
fn output_stem(title: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S%3f");
    format!("{}_{timestamp}", sanitize_title(title))
}

/// Reduce a source title to a filesystem-safe stem.
fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .take(MAX_STEM_TITLE_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "audio".to_owned()
    } else {
        cleaned
    }
}

/// Pick the most useful stderr lines for a short, categorized message.
fn summarize_stderr(stderr: &str) -> String {
    let line = stderr
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| stderr.lines().map(str::trim).rev().find(|l| !l.is_empty()))
        .unwrap_or("unknown tool error");

    line.chars().take(200).collect()
}
