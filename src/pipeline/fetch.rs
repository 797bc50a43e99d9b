//! Content fetching: one HTTP GET for the raw Markdown text.
//!
//! The fetcher sits behind the [`ContentFetcher`] trait so the orchestrator
//! can be driven by a stub (tests) or a host-provided client (proxies,
//! auth headers) without changing the pipeline. The default [`HttpFetcher`]
//! does exactly one request: no retries, no cache, and anything other than
//! `200 OK` is fatal.

use crate::error::Md2PdfError;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info};

/// Retrieves raw text content from a URL.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, Md2PdfError>;
}

/// Default fetcher backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout_secs`.
    pub fn new(timeout_secs: u64) -> Result<Self, Md2PdfError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("md2pdf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Md2PdfError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, Md2PdfError> {
        info!("Downloading Markdown from: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                Md2PdfError::DownloadTimeout {
                    url: url.to_string(),
                    secs: self.timeout_secs,
                }
            } else {
                Md2PdfError::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Md2PdfError::FetchFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                Md2PdfError::DownloadTimeout {
                    url: url.to_string(),
                    secs: self.timeout_secs,
                }
            } else {
                Md2PdfError::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        debug!("Downloaded {} bytes", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tiny_http::{Response, Server, StatusCode as HttpStatus};

    /// Serve `body` with `status` to every request on an ephemeral port.
    fn serve(status: u16, body: &'static str) -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        thread::spawn(move || {
            for request in server.incoming_requests() {
                let response = Response::from_string(body).with_status_code(HttpStatus(status));
                let _ = request.respond(response);
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn fetch_returns_body_on_200() {
        let base = serve(200, "# Title\n\nBody text.\n");
        let fetcher = HttpFetcher::new(5).unwrap();
        let text = fetcher.fetch(&format!("{base}/o/r/main/README.md")).await.unwrap();
        assert_eq!(text, "# Title\n\nBody text.\n");
    }

    #[tokio::test]
    async fn fetch_reports_status_on_404() {
        let base = serve(404, "404: Not Found");
        let fetcher = HttpFetcher::new(5).unwrap();
        let err = fetcher
            .fetch(&format!("{base}/o/r/main/missing.md"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, Md2PdfError::FetchFailed { status: 404, .. }),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn non_200_success_codes_are_rejected() {
        let base = serve(204, "");
        let fetcher = HttpFetcher::new(5).unwrap();
        let err = fetcher.fetch(&format!("{base}/a.md")).await.unwrap_err();
        assert!(matches!(err, Md2PdfError::FetchFailed { status: 204, .. }));
    }

    #[tokio::test]
    async fn slow_server_maps_to_download_timeout() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        thread::spawn(move || {
            for request in server.incoming_requests() {
                thread::sleep(std::time::Duration::from_secs(3));
                let _ = request.respond(Response::from_string("# late"));
            }
        });

        let fetcher = HttpFetcher::new(1).unwrap();
        let err = fetcher
            .fetch(&format!("http://{addr}/slow.md"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, Md2PdfError::DownloadTimeout { secs: 1, .. }),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn connection_refused_is_download_failed() {
        // Bind then drop to obtain a port with nothing listening.
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let fetcher = HttpFetcher::new(5).unwrap();
        let err = fetcher
            .fetch(&format!("http://127.0.0.1:{port}/a.md"))
            .await
            .unwrap_err();
        assert!(matches!(err, Md2PdfError::DownloadFailed { .. }), "got: {err:?}");
    }
}
