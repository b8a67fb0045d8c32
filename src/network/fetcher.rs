use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use crate::core::detect_media_type_by_file_name;
use crate::utils::url::Url;

/// Why a location could not be retrieved
///
/// The crawler never looks past "unavailable"; the variants exist for the
/// log line.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("cannot read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported location: {0}")]
    UnsupportedUrl(String),
}

/// Raw bytes of a location together with the content type it was served as
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedResource {
    pub content_type: String,
    pub data: Vec<u8>,
}

impl FetchedResource {
    pub fn new(content_type: &str, data: impl Into<Vec<u8>>) -> Self {
        FetchedResource {
            content_type: content_type.to_string(),
            data: data.into(),
        }
    }
}

/// Anything able to turn a location into bytes
pub trait Fetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError>;
}

/// Blocking HTTP(S) fetcher, also able to read `file://` locations
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: u64) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if timeout > 0 {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(HttpFetcher {
            client: builder.build().map_err(FetchError::Client)?,
        })
    }

    fn fetch_http(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Servers omitting Content-Type get a guess from the final path
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| detect_media_type_by_file_name(response.url().path()));

        let data = response.bytes().map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

        Ok(FetchedResource {
            content_type,
            data: data.to_vec(),
        })
    }

    fn fetch_file(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|_| FetchError::UnsupportedUrl(url.to_string()))?;
        let data = fs::read(&path).map_err(|source| FetchError::File {
            path: path.clone(),
            source,
        })?;

        Ok(FetchedResource {
            content_type: detect_media_type_by_file_name(url.path()),
            data,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        match url.scheme() {
            "http" | "https" => self.fetch_http(url),
            "file" => self.fetch_file(url),
            _ => Err(FetchError::UnsupportedUrl(url.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_fetch_local_file() {
        let mut file = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
        file.write_all(b"<p>hello</p>").unwrap();

        let fetcher = HttpFetcher::new("test", 5).unwrap();
        let url = Url::from_file_path(file.path()).unwrap();
        let resource = fetcher.fetch(&url).unwrap();

        assert_eq!(resource.content_type, "text/html");
        assert_eq!(resource.data, b"<p>hello</p>");
    }

    #[test]
    fn test_fetch_missing_file() {
        let fetcher = HttpFetcher::new("test", 5).unwrap();
        let url = Url::parse("file:///nonexistent/topshelf/page.html").unwrap();
        assert!(matches!(fetcher.fetch(&url), Err(FetchError::File { .. })));
    }

    #[test]
    fn test_fetch_unsupported_scheme() {
        let fetcher = HttpFetcher::new("test", 5).unwrap();
        let url = Url::parse("ftp://example.com/file").unwrap();
        assert!(matches!(
            fetcher.fetch(&url),
            Err(FetchError::UnsupportedUrl(_))
        ));
    }
}
