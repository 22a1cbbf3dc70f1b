//! Lyric file transport: where lyric files are fetched from.

use crate::error::{CoreError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Identifies the kind of lyric source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// HTTP GET relative to a base URL
    #[default]
    Http,
    /// Local files relative to a base directory
    File,
}

impl SourceKind {
    /// Get the string identifier used in config files and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for anything that can hand back the raw text of a lyric file.
///
/// Implementations should map a missing file or a non-success response to
/// [`CoreError::FetchFailed`]. Timeouts are enforced by the caller.
#[async_trait]
pub trait LyricSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Fetch the text of the lyric file at `path`
    async fn fetch_text(&self, path: &str) -> Result<String>;
}

/// Fetches lyric files over HTTP relative to a base URL
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpSource {
    /// Create a source rooted at `base`.
    ///
    /// A trailing slash is added to `base` so relative paths resolve beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not a valid URL or the HTTP client cannot be created.
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent("karasync/0.1")
            .build()?;

        Self::with_client(base, client)
    }

    /// Create a source rooted at `base` that sends requests through `client`
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not a valid URL.
    pub fn with_client(base: &str, client: reqwest::Client) -> Result<Self> {
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let base = Url::parse(&normalized).map_err(|e| CoreError::ConfigInvalid {
            message: format!("source.base is not a valid URL ({base}): {e}"),
        })?;

        Ok(Self { client, base })
    }

    /// Resolve a lyric path against the base URL
    ///
    /// The result must stay under the base, so absolute URLs, root-relative
    /// paths and `..` segments that climb above it are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FetchFailed`] if the joined URL is invalid, or
    /// [`CoreError::ConfigInvalid`] if it leaves the base.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        let url = self.base.join(path).map_err(|e| CoreError::FetchFailed {
            path: path.to_string(),
            reason: format!("invalid lyric URL: {e}"),
        })?;
        if !url.as_str().starts_with(self.base.as_str()) {
            return Err(outside_base(path));
        }
        Ok(url)
    }
}

#[async_trait]
impl LyricSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = self.resolve(path)?;
        info!("GET {}", url);

        let response = self.client.get(url).send().await?;
        debug!("Lyric response status: {}", response.status());

        if !response.status().is_success() {
            return Err(CoreError::FetchFailed {
                path: path.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        Ok(response.text().await?)
    }
}

/// Reads lyric files from a local directory
pub struct FileSource {
    base_dir: PathBuf,
}

impl FileSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Join a lyric path onto the base directory.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] for absolute paths or paths containing `..`.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(outside_base(path));
        }
        Ok(self.base_dir.join(relative))
    }
}

fn outside_base(path: &str) -> CoreError {
    CoreError::ConfigInvalid {
        message: format!("lyric path {path} points outside source.base"),
    }
}

#[async_trait]
impl LyricSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch_text(&self, path: &str) -> Result<String> {
        let full_path = self.resolve(path)?;
        info!("Reading {}", full_path.display());

        tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| CoreError::FetchFailed {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }
}
