//! Retrieval of the source document named by a load request.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use ureq::Agent;
use url::{ParseError, Url};

use crate::config::LoaderConfig;
use crate::errors::{Error, Result};

/// Fetches the document at `locator` and returns its raw body. Decoding is
/// left to the caller.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    agent: Agent,
    user_agent: String,
    max_body_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &LoaderConfig) -> Self {
        // Status codes are checked below so a non-2xx maps to `Error::Http`.
        let agent_config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.http_timeout_secs.map(Duration::from_secs))
            .build();
        let agent: Agent = agent_config.into();
        HttpFetcher {
            agent,
            user_agent: config.user_agent.clone(),
            max_body_bytes: config.max_body_bytes,
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        let mut response = self
            .agent
            .get(locator)
            .header("User-Agent", self.user_agent.as_str())
            .call()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_body_bytes)
            .read_to_vec()?;
        debug!(url = locator, bytes = body.len(); "Fetched document over HTTP");
        Ok(body)
    }
}

/// Reads `file://` URLs and bare filesystem paths.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    max_body_bytes: u64,
}

impl FileFetcher {
    pub fn new(config: &LoaderConfig) -> Self {
        FileFetcher {
            max_body_bytes: config.max_body_bytes,
        }
    }

    fn resolve(locator: &str) -> Result<PathBuf> {
        if locator.starts_with("file:") {
            let url = Url::parse(locator)
                .map_err(|err| Error::Transport(format!("invalid file URL {}: {}", locator, err)))?;
            url.to_file_path()
                .map_err(|_| Error::Transport(format!("not a local file URL: {}", locator)))
        } else {
            Ok(PathBuf::from(locator))
        }
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        let path = Self::resolve(locator)?;
        let read_error =
            |err: std::io::Error| Error::Transport(format!("could not read {}: {}", path.display(), err));

        let size = fs::metadata(&path).map_err(read_error)?.len();
        if size > self.max_body_bytes {
            return Err(Error::Transport(format!(
                "{} is {} bytes, larger than the {} byte limit",
                path.display(),
                size,
                self.max_body_bytes
            )));
        }
        let body = fs::read(&path).map_err(read_error)?;
        debug!(path = path.display().to_string().as_str(), bytes = body.len(); "Read document from disk");
        Ok(body)
    }
}

/// Picks the HTTP or file fetcher based on the locator's scheme.
#[derive(Clone)]
pub struct SourceFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl SourceFetcher {
    pub fn new(config: &LoaderConfig) -> Self {
        SourceFetcher {
            http: HttpFetcher::new(config),
            file: FileFetcher::new(config),
        }
    }
}

impl Fetcher for SourceFetcher {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        match Url::parse(locator) {
            Ok(url) => match url.scheme() {
                "http" | "https" => self.http.fetch(locator),
                "file" => self.file.fetch(locator),
                scheme => Err(Error::Transport(format!(
                    "unsupported URL scheme '{}' in {}",
                    scheme, locator
                ))),
            },
            Err(ParseError::RelativeUrlWithoutBase) => self.file.fetch(locator),
            Err(err) => Err(Error::Transport(format!("invalid URL {}: {}", locator, err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn temp_document(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn file_fetcher_reads_bare_paths_and_file_urls() {
        let file = temp_document(r#"{"elements": []}"#);
        let fetcher = FileFetcher::new(&LoaderConfig::default());

        let by_path = fetcher.fetch(file.path().to_str().unwrap()).unwrap();
        let url = Url::from_file_path(file.path()).unwrap();
        let by_url = fetcher.fetch(url.as_str()).unwrap();

        assert_eq!(by_path, br#"{"elements": []}"#);
        assert_eq!(by_path, by_url);
    }

    #[test]
    fn file_fetcher_returns_bytes_verbatim() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"elements\": [\xff]}").unwrap();
        let body = FileFetcher::new(&LoaderConfig::default())
            .fetch(file.path().to_str().unwrap())
            .unwrap();
        assert_eq!(body, b"{\"elements\": [\xff]}");
    }

    #[test]
    fn file_fetcher_enforces_size_limit() {
        let file = temp_document(r#"{"elements": []}"#);
        let config = LoaderConfig {
            max_body_bytes: 4,
            ..LoaderConfig::default()
        };
        let err = FileFetcher::new(&config)
            .fetch(file.path().to_str().unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn missing_file_is_a_transport_error() {
        let fetcher = SourceFetcher::new(&LoaderConfig::default());
        let err = fetcher.fetch("/nonexistent/roads.json").unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let fetcher = SourceFetcher::new(&LoaderConfig::default());
        let err = fetcher.fetch("ftp://example.org/roads.json").unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme"));
    }
}
