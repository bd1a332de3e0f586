//! Raw text acquisition.
//!
//! The pipeline works on resident text only. Getting that text (reading a
//! file, fetching a URL) is the single async step of a load and the only
//! place a load can wait. Failures here are [`SourceError`]s and never reach
//! the pipeline.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{SourceError, SourceResult};

/// Where a load's raw document comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "location", rename_all = "lowercase")]
pub enum TextSource {
    /// Local file.
    File(PathBuf),
    /// `http://` or `https://` URL.
    Url(String),
}

impl TextSource {
    /// Interpret a configuration string: URLs by scheme, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            TextSource::Url(location.to_string())
        } else {
            TextSource::File(PathBuf::from(location))
        }
    }

    /// Acquire the complete document.
    pub async fn fetch(&self) -> SourceResult<Vec<u8>> {
        match self {
            TextSource::File(path) => tokio::fs::read(path).await.map_err(|source| SourceError::Io {
                path: path.display().to_string(),
                source,
            }),
            TextSource::Url(url) => fetch_url(url).await,
        }
    }
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::File(path) => write!(f, "{}", path.display()),
            TextSource::Url(url) => write!(f, "{}", url),
        }
    }
}

async fn fetch_url(url: &str) -> SourceResult<Vec<u8>> {
    let response = reqwest::get(url).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_location() {
        assert_eq!(
            TextSource::parse("https://example.test/report.csv"),
            TextSource::Url("https://example.test/report.csv".into())
        );
        assert_eq!(
            TextSource::parse(" data/report.csv "),
            TextSource::File(PathBuf::from("data/report.csv"))
        );
    }

    #[tokio::test]
    async fn test_fetch_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "L1 metric,MTM\nBookings,Total").unwrap();

        let source = TextSource::File(file.path().to_path_buf());
        let bytes = source.fetch().await.unwrap();
        assert_eq!(bytes, b"L1 metric,MTM\nBookings,Total");
    }

    #[tokio::test]
    async fn test_missing_file_is_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = TextSource::File(dir.path().join("missing.csv"));

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("missing.csv"));
    }
}
