//! `url` sources: blocking HTTP GET.
//!
//! One request per file, no retries. A non-success status or a transport
//! failure surfaces as [`HubError::Transport`] carrying the URL. The body is
//! buffered in full and written atomically, so nothing is staged on failure.

use super::FetchStrategy;
use crate::config::schema::param_str;
use crate::config::SourceSpec;
use crate::error::{HubError, Result};
use crate::staging::write_atomic;
use std::path::Path;
use std::time::Duration;

/// Per-request timeout. The only timeout in the pipeline.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("datahub/", env!("CARGO_PKG_VERSION"));

/// Fetches `source_info.url` over HTTP(S).
pub struct UrlFetcher {
    client: reqwest::blocking::Client,
}

impl UrlFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(HubError::HttpClient)?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// GET `url` and return the whole body.
    pub fn download(&self, url: &str) -> Result<Vec<u8>> {
        let transport = |source| HubError::Transport {
            url: url.to_string(),
            source,
        };
        let resp = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(transport)?;
        let body = resp.bytes().map_err(transport)?;
        Ok(body.to_vec())
    }
}

impl FetchStrategy for UrlFetcher {
    fn source_type(&self) -> &'static str {
        "url"
    }

    fn fetch(&self, source: &SourceSpec, dest: &Path) -> Result<()> {
        let context = format!("source '{}'", source.file);
        let url = param_str(&source.source_info, "url", &context)?;
        let body = self.download(url)?;
        log::debug!("{url}: {} bytes -> {}", body.len(), dest.display());
        write_atomic(dest, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Params;
    use crate::error::ErrorKind;
    use crate::staging::part_files;

    fn url_source(url: &str) -> SourceSpec {
        let mut info = Params::new();
        info.insert("url".into(), url.into());
        SourceSpec {
            file: "data.csv".into(),
            source_type: "url".into(),
            source_info: info,
        }
    }

    #[test]
    fn writes_body_to_destination() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/data.csv")
            .with_status(200)
            .with_body("a,b\n1,2\n")
            .expect(1)
            .create();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("data.csv");
        let fetcher = UrlFetcher::new().unwrap();
        fetcher
            .fetch(&url_source(&format!("{}/data.csv", server.url())), &dest)
            .unwrap();

        mock.assert();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "a,b\n1,2\n");
        assert!(part_files(dir.path()).is_empty());
    }

    #[test]
    fn not_found_status_is_transport_error_without_retry() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/missing.csv")
            .with_status(404)
            .expect(1)
            .create();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("data.csv");
        let url = format!("{}/missing.csv", server.url());
        let err = UrlFetcher::new()
            .unwrap()
            .fetch(&url_source(&url), &dest)
            .unwrap_err();

        mock.assert();
        assert_eq!(err.kind(), ErrorKind::Transport);
        match &err {
            HubError::Transport { url: failed, source } => {
                assert_eq!(failed, &url);
                assert_eq!(source.status().map(|s| s.as_u16()), Some(404));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
        assert!(!dest.exists());
        assert!(part_files(dir.path()).is_empty());
    }

    #[test]
    fn server_error_is_not_retried() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/flaky.csv")
            .with_status(503)
            .expect(1)
            .create();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("flaky.csv");
        let result = UrlFetcher::new()
            .unwrap()
            .fetch(&url_source(&format!("{}/flaky.csv", server.url())), &dest);

        assert!(result.is_err());
        mock.assert();
        assert!(!dest.exists());
    }

    #[test]
    fn missing_url_parameter_is_configuration_error() {
        let source = SourceSpec {
            file: "data.csv".into(),
            source_type: "url".into(),
            source_info: Params::new(),
        };
        let dir = tempfile::tempdir().unwrap();
        let err = UrlFetcher::new()
            .unwrap()
            .fetch(&source, &dir.path().join("data.csv"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("'url'"));
    }

    #[test]
    fn connection_refused_is_transport_error() {
        // Port 9 (discard) on localhost is closed on test machines.
        let dir = tempfile::tempdir().unwrap();
        let err = UrlFetcher::new()
            .unwrap()
            .fetch(
                &url_source("http://127.0.0.1:9/x.csv"),
                &dir.path().join("x.csv"),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("http://127.0.0.1:9/x.csv"));
    }
}
