//! # API Client
//!
//! ## Usage
//!
//! ```ignore
//! use core_http::{ApiClient, UploadFile};
//!
//! let client = ApiClient::builder()
//!     .transport(transport)
//!     .token_store(tokens)
//!     .facts(facts)
//!     .config(&config)
//!     .build()?;
//!
//! let items: Vec<Item> = client.get_json("/items").await?;
//!
//! let photo = UploadFile::new("photo.jpg", bytes).content_type("image/jpeg");
//! client
//!     .upload("/items/42/photo", photo, Some(|percent| println!("{percent}%")))
//!     .await?;
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{
    EventCallback, HttpMethod, HttpRequest, HttpTransport, MultipartFile, MultipartForm,
    PlatformFacts, PlatformSendSync, ProgressCallback, RequestBody, TokenStore, UploadProgress,
};
use bytes::Bytes;
use core_runtime::config::AppConfig;
use core_runtime::events::EventBus;
use core_runtime::logging::strip_path;
use core_runtime::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::body::Body;
use crate::error::ClassifiedError;
use crate::messages::UserMessages;
use crate::pipeline::{OutboundPipeline, ResponseClassifier};

/// Multipart field the upload endpoint expects.
pub const UPLOAD_FIELD: &str = "file";

/// A file for [`ApiClient::upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Resolve `path` against `base`.
///
/// Absolute `http(s)://` URLs are used as-is; anything else is appended to
/// the base with exactly one `/` in between.
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// Upload percentage, `round(loaded * 100 / total)` clamped to 100.
///
/// `None` when the total size is unknown or zero.
pub fn upload_percent(progress: UploadProgress) -> Option<u8> {
    let total = u128::from(progress.total.filter(|total| *total > 0)?);
    let loaded = u128::from(progress.loaded);
    let percent = (loaded * 100 + total / 2) / total;
    Some(percent.min(100) as u8)
}

/// HTTP client shared by the whole application.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    outbound: OutboundPipeline,
    inbound: ResponseClassifier,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> std::result::Result<Body, ClassifiedError> {
        self.execute(self.request(HttpMethod::Get, path), None).await
    }

    pub async fn delete(&self, path: &str) -> std::result::Result<Body, ClassifiedError> {
        self.execute(self.request(HttpMethod::Delete, path), None)
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<Body, ClassifiedError> {
        let request = self.json_request(HttpMethod::Post, path, body)?;
        self.execute(request, None).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<Body, ClassifiedError> {
        let request = self.json_request(HttpMethod::Put, path, body)?;
        self.execute(request, None).await
    }

    /// GET and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> std::result::Result<T, ClassifiedError> {
        let body = self.get(path).await?;
        body.json()
            .map_err(|e| self.inbound.decode_error(&self.url(path), e))
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<T, ClassifiedError> {
        let body = self.post(path, body).await?;
        body.json()
            .map_err(|e| self.inbound.decode_error(&self.url(path), e))
    }

    /// Multipart upload under the `file` field.
    ///
    /// `on_progress` receives whole percentages. It is not called when the
    /// transport cannot tell the total size.
    pub async fn upload<F>(
        &self,
        path: &str,
        file: UploadFile,
        on_progress: Option<F>,
    ) -> std::result::Result<Body, ClassifiedError>
    where
        F: Fn(u8) + PlatformSendSync + 'static,
    {
        debug!(
            file = strip_path(&file.file_name),
            size = file.data.len(),
            "Uploading file"
        );

        let form = MultipartForm::new().file(MultipartFile {
            field_name: UPLOAD_FIELD.to_string(),
            file_name: file.file_name,
            content_type: file.content_type,
            data: file.data,
        });
        let request = self.request(HttpMethod::Post, path).multipart(form);

        let progress = on_progress.map(|callback| -> ProgressCallback {
            let callback: EventCallback<u8> = Arc::new(callback);
            Arc::new(move |progress: UploadProgress| {
                if let Some(percent) = upload_percent(progress) {
                    callback(percent);
                }
            })
        });

        self.execute(request, progress).await
    }

    /// Run a caller-built request through the pipeline. Relative URLs are
    /// resolved against the base URL, and the configured timeout replaces any
    /// timeout set on the request.
    pub async fn send(&self, mut request: HttpRequest) -> std::result::Result<Body, ClassifiedError> {
        request.url = self.url(&request.url);
        request.timeout = Some(self.timeout);
        self.execute(request, None).await
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, self.url(path))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
    }

    fn json_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> std::result::Result<HttpRequest, ClassifiedError> {
        let request = self.request(method, path);
        let url = request.url.clone();
        request
            .json(body)
            .map_err(|e| self.inbound.request_error(&url, e))
    }

    async fn execute(
        &self,
        mut request: HttpRequest,
        progress: Option<ProgressCallback>,
    ) -> std::result::Result<Body, ClassifiedError> {
        self.outbound.apply(&mut request);

        let url = request.url.clone();
        let method = request.method;
        let outcome = match progress {
            Some(progress) => self.transport.send_with_progress(request, progress).await,
            None => self.transport.send(request).await,
        };

        match outcome {
            Ok(response) => {
                debug!(method = %method, url = %url, status = response.status, "API response");
                self.inbound.classify_response(&url, response).map(Body::new)
            }
            Err(e) => Err(self.inbound.classify_transport_error(&url, e)),
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("outbound", &self.outbound)
            .finish()
    }
}

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    transport: Option<Arc<dyn HttpTransport>>,
    tokens: Option<Arc<dyn TokenStore>>,
    facts: Option<PlatformFacts>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    messages: Option<UserMessages>,
    events: Option<EventBus>,
}

impl ApiClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn facts(mut self, facts: PlatformFacts) -> Self {
        self.facts = Some(facts);
        self
    }

    /// Take base URL and timeout from the application config.
    pub fn config(mut self, config: &AppConfig) -> Self {
        self.base_url = Some(config.api_base_url.clone());
        self.timeout = Some(config.request_timeout);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn messages(mut self, messages: UserMessages) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let transport = self.transport.ok_or_else(|| Error::CapabilityMissing {
            capability: "HttpTransport".to_string(),
            message: "No HTTP transport provided. Use .transport() to set one.".to_string(),
        })?;
        let tokens = self.tokens.ok_or_else(|| Error::CapabilityMissing {
            capability: "TokenStore".to_string(),
            message: "No token store provided. Use .token_store() to set one.".to_string(),
        })?;
        let facts = self.facts.unwrap_or_default();

        let defaults = AppConfig::defaults_for(facts);
        let base_url = self.base_url.unwrap_or(defaults.api_base_url);
        let timeout = self.timeout.unwrap_or(defaults.request_timeout);
        if base_url.trim().is_empty() {
            return Err(Error::Config("API base URL cannot be empty".to_string()));
        }
        if timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        Ok(ApiClient {
            transport,
            outbound: OutboundPipeline::standard(facts, Arc::clone(&tokens)),
            inbound: ResponseClassifier::new(
                facts,
                self.messages.unwrap_or_default(),
                tokens,
                self.events,
            ),
            base_url,
            timeout,
        })
    }
}
