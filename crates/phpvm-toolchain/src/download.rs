//! Artifact downloads.
//!
//! Downloads stream into `<dest>.part` and are renamed into place once the
//! body has been fully written, so an interrupted transfer never leaves a
//! truncated file at the final path. Transport failures and 5xx/429
//! responses are retried with exponential backoff; every request is bounded
//! by a timeout.

use async_trait::async_trait;
use futures_util::StreamExt;
use phpvm_core::{Error, Result};
use phpvm_ui::{Progress, Spinner, Style};
use reqwest::Client;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Longest pause between two attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Fetches a URL into a file.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` to `dest`, returning the number of bytes written.
    ///
    /// `label` is a human name for progress output ("PHP 8.4.1").
    async fn fetch(&self, url: &str, dest: &Path, label: &str) -> Result<u64>;
}

/// Timeout, retry and display settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Timeout for a whole request, body included.
    pub timeout: Duration,
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Pause before the first retry; doubled for each later one.
    pub backoff: Duration,
    /// Draw spinners and progress bars.
    pub show_progress: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            retries: 3,
            backoff: Duration::from_millis(500),
            show_progress: false,
        }
    }
}

impl DownloadOptions {
    /// Delay before retry number `attempt` (0-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff
            .checked_mul(2u32.saturating_pow(attempt))
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }
}

/// HTTP downloader backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    options: DownloadOptions,
}

impl HttpFetcher {
    /// Build a fetcher with its own HTTP client.
    pub fn new(options: DownloadOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.timeout.min(Duration::from_secs(30)))
            .user_agent(concat!("phpvm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, options })
    }

    async fn fetch_once(&self, url: &str, dest: &Path, label: &str) -> Result<u64> {
        let spinner = Spinner::with_visibility(
            format!("Downloading {}...", label),
            self.options.show_progress,
        );

        debug!("Downloading from {}", url);
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                spinner.finish_error(format!("Failed to download {}", label));
                return Err(transport_error(url, e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            spinner.finish_error(format!("Failed to download {}", label));
            return Err(Error::download_status(
                url,
                status.as_u16(),
                format!("bad status: {}", status),
            ));
        }

        let total_size = response.content_length().unwrap_or(0);
        spinner.finish_clear();

        let progress = (total_size > 0).then(|| {
            Progress::bytes(
                total_size,
                format!("Downloading {}", label),
                self.options.show_progress,
            )
        });

        let part = partial_path(dest);
        let file =
            File::create(&part).map_err(|e| Error::io("Failed to create download file", &part, e))?;

        let downloaded = match write_body(url, response, file, &part, progress.as_ref()).await {
            Ok(downloaded) => downloaded,
            Err(err) => {
                let _ = fs::remove_file(&part);
                if let Some(pb) = progress {
                    pb.abandon();
                }
                return Err(err);
            }
        };

        if let Err(e) = fs::rename(&part, dest) {
            let _ = fs::remove_file(&part);
            return Err(Error::io("Failed to finalize download", dest, e));
        }

        if let Some(pb) = progress {
            pb.finish(format!("Downloaded {} ({})", label, Style::bytes(downloaded)));
        }
        info!("Downloaded {} ({} bytes) to {}", label, downloaded, dest.display());

        Ok(downloaded)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path, label: &str) -> Result<u64> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url, dest, label).await {
                Ok(bytes) => return Ok(bytes),
                Err(err) if err.is_retryable() && attempt < self.options.retries => {
                    let delay = self.options.backoff_for(attempt);
                    attempt += 1;
                    warn!(
                        "Download of {} failed ({}), retrying in {:?} ({}/{})",
                        label, err, delay, attempt, self.options.retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Stream the response body into `file` and flush it to disk. The file is
/// closed on return; the caller owns cleanup of `part`.
async fn write_body(
    url: &str,
    response: reqwest::Response,
    mut file: File,
    part: &Path,
    progress: Option<&Progress>,
) -> Result<u64> {
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| transport_error(url, e))?;
        file.write_all(&chunk)
            .map_err(|e| Error::io("Failed to write download data", part, e))?;
        downloaded += chunk.len() as u64;
        if let Some(pb) = progress {
            pb.set_position(downloaded);
        }
    }

    file.sync_all()
        .map_err(|e| Error::io("Failed to flush download", part, e))?;
    Ok(downloaded)
}

fn transport_error(url: &str, e: reqwest::Error) -> Error {
    Error::DownloadFailed {
        url: url.to_string(),
        message: if e.is_timeout() {
            "request timed out".to_string()
        } else {
            e.to_string()
        },
        status: e.status().map(|s| s.as_u16()),
        version: None,
        source: Some(Box::new(e)),
        fixes: vec![],
    }
}

/// `<dest>.part`, next to the destination.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
