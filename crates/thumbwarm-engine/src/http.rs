//! HTTP backend: warm thumbnails by fetching them from the site's
//! thumbnail route.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use thumbwarm_core::VariantRequest;
use tracing::debug;

use crate::backend::{Realization, ThumbnailBackend};
use crate::config::HttpBackendConfig;
use crate::error::BackendError;

/// Fetches `{base_url}/thumbs/{w}x{h}{crop}/{file}` so the site renders and
/// caches the variant.
pub struct HttpBackend {
    inner: reqwest::Client,
    base_url: Url,
    placeholder_file: String,
}

impl HttpBackend {
    /// Create a new HTTP backend.
    pub fn new(config: &HttpBackendConfig) -> Result<Self, BackendError> {
        let invalid = |reason: String| BackendError::InvalidUrl {
            url: config.base_url.clone(),
            reason,
        };

        let base_url = Url::parse(&config.base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("cannot be a base URL".to_string()));
        }

        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self {
            inner,
            base_url,
            placeholder_file: config.placeholder_file.clone(),
        })
    }

    /// URL that renders the given variant. Each path segment of the source
    /// file is percent-encoded on its own.
    pub fn thumb_url(&self, request: &VariantRequest) -> Result<Url, BackendError> {
        let identity = request.identity();
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);

        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .push("thumbs")
            .push(&identity.size_segment())
            .extend(identity.source_segments());

        Ok(url)
    }

    fn is_placeholder(&self, path: &str) -> bool {
        !self.placeholder_file.is_empty()
            && path
                .rsplit('/')
                .next()
                .is_some_and(|name| name == self.placeholder_file)
    }
}

#[async_trait]
impl ThumbnailBackend for HttpBackend {
    async fn realize(&self, request: &VariantRequest) -> Result<Realization, BackendError> {
        let url = self.thumb_url(request)?;
        debug!(url = %url, "GET thumbnail");

        let response = self
            .inner
            .get(url.clone())
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Ok(Realization::Placeholder(format!(
                "HTTP {}: source image '{}' not found",
                status.as_u16(),
                request.source_file()
            )));
        }
        if !status.is_success() {
            return Err(BackendError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // Only a redirect to the placeholder image means the source is missing.
        let placeholder = response.url() != &url && self.is_placeholder(response.url().path());

        // Drain the body so the site finishes rendering and caching.
        response
            .bytes()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if placeholder {
            return Ok(Realization::Placeholder(format!(
                "Placeholder served for source image '{}'",
                request.source_file()
            )));
        }

        Ok(Realization::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use thumbwarm_core::{CropMode, VariantOrigin};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn request(file: &str) -> VariantRequest {
        VariantRequest::new(file, 200, 100, CropMode::Fit, VariantOrigin::alias("image", "small"))
            .unwrap()
    }

    /// Minimal HTTP/1.1 server answering by path. Returns its base URL and
    /// the request paths it has seen.
    async fn serve() -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&buf);
                    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    log.lock().unwrap().push(path.clone());

                    let (status, extra) = if path.contains("missing") {
                        ("404 Not Found", String::new())
                    } else if path.contains("broken") {
                        ("500 Internal Server Error", String::new())
                    } else if path.contains("gone-quiet") {
                        ("302 Found", "Location: /files/default.png\r\n".to_string())
                    } else {
                        ("200 OK", String::new())
                    };
                    let response = format!(
                        "HTTP/1.1 {}\r\n{}Content-Length: 2\r\nConnection: close\r\n\r\nok",
                        status, extra
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}", addr), seen)
    }

    fn backend(base_url: String) -> HttpBackend {
        HttpBackend::new(&HttpBackendConfig {
            base_url,
            ..HttpBackendConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_thumb_url() {
        let root = backend("http://example.test/".to_string());
        assert_eq!(
            root.thumb_url(&request("2024-05/photo.jpg")).unwrap().as_str(),
            "http://example.test/thumbs/200x100f/2024-05/photo.jpg"
        );

        let nested = backend("http://example.test/site/".to_string());
        assert_eq!(
            nested.thumb_url(&request("/2024-05/photo.jpg")).unwrap().as_str(),
            "http://example.test/site/thumbs/200x100f/2024-05/photo.jpg"
        );
    }

    #[test]
    fn test_thumb_url_encodes_reserved_characters() {
        let backend = backend("http://example.test".to_string());
        let url = backend
            .thumb_url(&request("2024-05/summer #1?v=2 final.jpg"))
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://example.test/thumbs/200x100f/2024-05/summer%20%231%3Fv=2%20final.jpg"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_invalid_base_url() {
        for base_url in ["not a url", "mailto:thumbs@example.test"] {
            let result = HttpBackend::new(&HttpBackendConfig {
                base_url: base_url.to_string(),
                ..HttpBackendConfig::default()
            });
            assert!(matches!(result, Err(BackendError::InvalidUrl { .. })));
        }
    }

    #[test]
    fn test_placeholder_detection() {
        let backend = backend("http://example.test".to_string());
        assert!(backend.is_placeholder("/files/default.png"));
        assert!(!backend.is_placeholder("/thumbs/200x100f/default.png.jpg"));
        assert!(!backend.is_placeholder("/thumbs/200x100f/photo.jpg"));
    }

    #[tokio::test]
    async fn test_realize_maps_responses() {
        let (base_url, _) = serve().await;
        let backend = backend(base_url);

        assert_eq!(
            backend.realize(&request("photo.jpg")).await.unwrap(),
            Realization::Ready
        );
        assert!(matches!(
            backend.realize(&request("missing.jpg")).await,
            Ok(Realization::Placeholder(_))
        ));
        assert!(matches!(
            backend.realize(&request("gone-quiet.jpg")).await,
            Ok(Realization::Placeholder(_))
        ));
        assert!(matches!(
            backend.realize(&request("broken.jpg")).await,
            Err(BackendError::Http { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_realize_requests_the_whole_file_name() {
        let (base_url, seen) = serve().await;
        let backend = backend(base_url);

        assert_eq!(
            backend.realize(&request("2024-05/summer #1.jpg")).await.unwrap(),
            Realization::Ready
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["/thumbs/200x100f/2024-05/summer%20%231.jpg".to_string()]
        );
    }

    #[tokio::test]
    async fn test_source_named_like_placeholder_is_ready() {
        let (base_url, seen) = serve().await;
        let backend = backend(base_url);

        assert_eq!(
            backend.realize(&request("2024-05/default.png")).await.unwrap(),
            Realization::Ready
        );
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = backend(format!("http://{}", addr));
        assert!(matches!(
            backend.realize(&request("photo.jpg")).await,
            Err(BackendError::Transport(_))
        ));
    }
}
