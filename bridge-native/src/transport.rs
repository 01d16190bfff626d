//! HTTP Transport Implementation using Reqwest

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{
    error::{BridgeError, Result},
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MultipartForm, ProgressCallback,
    RequestBody, TransportError, UploadProgress,
};
use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

/// Timeout applied when a request does not carry its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upload bodies are handed to the connection in chunks of this size so
/// progress can be reported while the body is written.
const UPLOAD_CHUNK_SIZE: usize = 16 * 1024;

/// Reqwest-based transport.
///
/// Performs exactly one attempt per call. Every response that arrives is
/// returned as-is, whatever its status.
pub struct ReqwestTransport {
    client: Client,
    default_timeout: Duration,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(10)
            .user_agent(concat!("katalog-runtime/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }

    fn build_request(
        &self,
        request: HttpRequest,
        timeout: Duration,
        progress: Option<ProgressCallback>,
    ) -> std::result::Result<reqwest::RequestBuilder, TransportError> {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url).timeout(timeout);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        match request.body {
            Some(RequestBody::Bytes(body)) => {
                req = req.body(body);
            }
            Some(RequestBody::Multipart(form)) => {
                let tracker = progress.map(|progress| {
                    Arc::new(UploadTracker {
                        progress,
                        loaded: AtomicU64::new(0),
                        total: form.file_bytes(),
                    })
                });
                req = req.multipart(build_form(form, tracker)?);
            }
            None => {}
        }

        Ok(req)
    }

    async fn execute(
        &self,
        request: HttpRequest,
        progress: Option<ProgressCallback>,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let method = request.method;
        let url = request.url.clone();

        let response = self
            .build_request(request, timeout, progress)?
            .send()
            .await
            .map_err(|e| map_error(e, timeout))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();
        let body = response.bytes().await.map_err(|e| map_error(e, timeout))?;

        debug!(
            method = %method,
            url = %url,
            status,
            bytes = body.len(),
            "HTTP exchange completed"
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        self.execute(request, None).await
    }

    async fn send_with_progress(
        &self,
        request: HttpRequest,
        progress: ProgressCallback,
    ) -> std::result::Result<HttpResponse, TransportError> {
        self.execute(request, Some(progress)).await
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

fn map_error(error: reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(timeout)
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

/// Shared upload counter across all file parts of one form.
struct UploadTracker {
    progress: ProgressCallback,
    loaded: AtomicU64,
    total: u64,
}

impl UploadTracker {
    fn advance(&self, bytes: usize) {
        let loaded = self.loaded.fetch_add(bytes as u64, Ordering::SeqCst) + bytes as u64;
        (self.progress)(UploadProgress {
            loaded,
            total: Some(self.total),
        });
    }
}

fn build_form(
    form: MultipartForm,
    tracker: Option<Arc<UploadTracker>>,
) -> std::result::Result<Form, TransportError> {
    let mut out = Form::new();

    for (name, value) in form.text_fields {
        out = out.text(name, value);
    }

    for file in form.files {
        let length = file.data.len() as u64;
        let part = match &tracker {
            Some(tracker) => Part::stream_with_length(
                reqwest::Body::wrap_stream(tracked_chunks(file.data, Arc::clone(tracker))),
                length,
            ),
            None => Part::bytes(file.data.to_vec()),
        };
        let mut part = part.file_name(file.file_name);
        if let Some(content_type) = file.content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        }
        out = out.part(file.field_name, part);
    }

    Ok(out)
}

fn tracked_chunks(
    data: Bytes,
    tracker: Arc<UploadTracker>,
) -> impl Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send + 'static {
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| data.slice(start..(start + UPLOAD_CHUNK_SIZE).min(data.len())))
        .collect();

    stream::iter(chunks).map(move |chunk| {
        tracker.advance(chunk.len());
        Ok(chunk)
    })
}
