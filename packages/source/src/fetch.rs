//! Where dataset files are read from.
//!
//! The report can run against a local `data/` directory or against the
//! published site, where every file sits under one base URL.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::SourceError;

/// A location that serves dataset files by name.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable description for log messages.
    fn describe(&self) -> String;

    /// Reads one file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file cannot be read.
    async fn read_text(&self, file: &str) -> Result<String, SourceError>;
}

/// Reads datasets from a directory on disk.
#[derive(Debug, Clone)]
pub struct LocalDirSource {
    root: PathBuf,
}

impl LocalDirSource {
    /// Creates a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataSource for LocalDirSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    async fn read_text(&self, file: &str) -> Result<String, SourceError> {
        let path = self.root.join(file);
        log::debug!("Reading {}", path.display());
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

/// Fetches datasets over HTTP relative to a base URL.
///
/// There are no retries: a failed request is reported once and the dataset
/// is treated as missing.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Creates a source that fetches `<base_url>/<file>`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// Full URL for a dataset file.
    #[must_use]
    pub fn url_for(&self, file: &str) -> String {
        format!("{}/{}", self.base_url, file.trim_start_matches('/'))
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn read_text(&self, file: &str) -> Result<String, SourceError> {
        let url = self.url_for(file);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let text = response.text().await?;
        log::debug!("Downloaded {} bytes from {url}", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_urls_join_without_double_slashes() {
        let source = HttpSource::new("https://example.org/reporte/");
        assert_eq!(
            source.url_for("/data/spillover_data.json"),
            "https://example.org/reporte/data/spillover_data.json"
        );
    }

    #[tokio::test]
    async fn local_source_reads_files() {
        let dir = std::env::temp_dir().join(format!("sinaloa_fetch_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.csv"), "A,B\n1,2\n").unwrap();

        let source = LocalDirSource::new(&dir);
        let text = source.read_text("a.csv").await.unwrap();
        assert_eq!(text, "A,B\n1,2\n");
        assert!(source.read_text("missing.csv").await.is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
