// ABOUTME: Fetches image bytes from http(s) URLs or local paths with a size cap
// ABOUTME: Implements timeouts, redirect limits, status checks and optional progress

use crate::constants::{http, timeouts};
use async_trait::async_trait;
use futures_util::StreamExt;
use gifpeek_decode::reader::read_all_limit;
use gifpeek_decode::DecodeError;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("image too large: more than {max} bytes")]
    TooLarge { max: u64 },

    #[error("invalid source '{0}'")]
    InvalidSource(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Http {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl FetchError {
    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            FetchError::Timeout => Some("Raise [fetch] timeout in the config"),
            FetchError::TooLarge { .. } => Some("Raise [fetch] max_bytes in the config, or use -1 for no limit"),
            _ => None,
        }
    }
}

/// Source of raw image bytes for the preview and extraction commands
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, source: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct ImageFetcher {
    client: Client,
    max_bytes: Option<u64>,
    show_progress: bool,
}

impl ImageFetcher {
    /// `max_bytes` of `None` disables the size cap
    pub fn new(timeout: Duration, max_bytes: Option<u64>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(http::USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(http::MAX_REDIRECTS))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_bytes,
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let (Some(max), Some(length)) = (self.max_bytes, response.content_length()) {
            if length > max {
                return Err(FetchError::TooLarge { max });
            }
        }

        let progress = self.progress_bar(url, response.content_length());
        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            bytes.extend_from_slice(&chunk);

            if let Some(ref pb) = progress {
                pb.set_position(bytes.len() as u64);
            }

            if let Some(max) = self.max_bytes {
                if bytes.len() as u64 > max {
                    if let Some(pb) = progress {
                        pb.abandon_with_message("size limit exceeded");
                    }
                    return Err(FetchError::TooLarge { max });
                }
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        log::debug!("fetched {} bytes from {url}", bytes.len());
        Ok(bytes)
    }

    fn fetch_path(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let io_error = |source| FetchError::Io {
            path: path.to_string(),
            source,
        };
        let file = std::fs::File::open(Path::new(path)).map_err(io_error)?;

        match read_all_limit(file, self.max_bytes) {
            Ok(bytes) => Ok(bytes),
            Err(DecodeError::TooLarge { max, .. }) => Err(FetchError::TooLarge { max }),
            Err(DecodeError::Io(source)) => Err(io_error(source)),
            Err(other) => Err(FetchError::Network(other.to_string())),
        }
    }

    fn progress_bar(&self, url: &str, length: Option<u64>) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let name = url.rsplit('/').next().unwrap_or("image");

        let pb = match length {
            Some(length) => {
                let pb = ProgressBar::new(length);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{msg} [{bar:25.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
                {
                    pb.set_style(style.progress_chars("=>-"));
                }
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} {bytes}") {
                    pb.set_style(style);
                }
                pb.enable_steady_tick(Duration::from_millis(timeouts::PROGRESS_BAR_TICK_MS));
                pb
            }
        };
        pb.set_message(format!("Fetching {name}"));
        Some(pb)
    }
}

#[async_trait]
impl Fetcher for ImageFetcher {
    async fn fetch(&self, source: &str) -> Result<Vec<u8>, FetchError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(FetchError::InvalidSource(source.to_string()));
        }
        if is_remote(source) {
            url::Url::parse(source).map_err(|_| FetchError::InvalidSource(source.to_string()))?;
            self.fetch_url(source).await
        } else {
            self.fetch_path(source)
        }
    }
}

pub fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
