//! Request and response stages.
//!
//! The outbound pipeline runs a fixed list of [`RequestStage`]s over every
//! request before it reaches the transport. The [`ResponseClassifier`] is the
//! inbound stage: it lets 2xx responses through and turns everything else into
//! a [`ClassifiedError`].

use std::fmt;
use std::sync::Arc;

use bridge_traits::{
    HttpRequest, HttpResponse, PlatformFacts, PlatformSendSync, TokenStore, TransportError,
};
use core_runtime::events::{EventBus, RuntimeEvent, SessionEvent};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ClassifiedError, ErrorCause, ErrorKind};
use crate::messages::UserMessages;

pub const PLATFORM_HEADER: &str = "X-Platform";

/// One outbound step. Stages run synchronously and never fail.
pub trait RequestStage: PlatformSendSync {
    fn name(&self) -> &'static str;

    fn apply(&self, request: &mut HttpRequest);
}

/// Tags the request with `X-Platform: mobile|web`.
#[derive(Debug, Clone, Copy)]
pub struct PlatformHeaderStage {
    facts: PlatformFacts,
}

impl PlatformHeaderStage {
    pub fn new(facts: PlatformFacts) -> Self {
        Self { facts }
    }
}

impl RequestStage for PlatformHeaderStage {
    fn name(&self) -> &'static str {
        "platform-header"
    }

    fn apply(&self, request: &mut HttpRequest) {
        request.set_header(PLATFORM_HEADER, self.facts.platform_header());
    }
}

/// Attaches `Authorization: Bearer <token>` when the store holds a token.
pub struct BearerTokenStage {
    store: Arc<dyn TokenStore>,
}

impl BearerTokenStage {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }
}

impl RequestStage for BearerTokenStage {
    fn name(&self) -> &'static str {
        "bearer-token"
    }

    fn apply(&self, request: &mut HttpRequest) {
        if let Some(token) = self.store.read() {
            request.set_header("Authorization", format!("Bearer {}", token));
        }
    }
}

/// Logs method and URL at `debug`. Never logs headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogStage;

impl RequestStage for RequestLogStage {
    fn name(&self) -> &'static str {
        "request-log"
    }

    fn apply(&self, request: &mut HttpRequest) {
        debug!(method = %request.method, url = %request.url, "API request");
    }
}

/// Ordered outbound stages.
#[derive(Clone)]
pub struct OutboundPipeline {
    stages: Vec<Arc<dyn RequestStage>>,
}

impl OutboundPipeline {
    /// Platform header, then bearer token, then logging.
    pub fn standard(facts: PlatformFacts, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            stages: vec![
                Arc::new(PlatformHeaderStage::new(facts)),
                Arc::new(BearerTokenStage::new(tokens)),
                Arc::new(RequestLogStage),
            ],
        }
    }

    pub fn apply(&self, request: &mut HttpRequest) {
        for stage in &self.stages {
            stage.apply(request);
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }
}

impl fmt::Debug for OutboundPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundPipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

#[derive(Deserialize)]
struct ServerMessage {
    message: Option<String>,
}

/// Inbound stage: error classification plus the 401 side effects.
#[derive(Clone)]
pub struct ResponseClassifier {
    facts: PlatformFacts,
    messages: UserMessages,
    tokens: Arc<dyn TokenStore>,
    events: Option<EventBus>,
}

impl ResponseClassifier {
    pub fn new(
        facts: PlatformFacts,
        messages: UserMessages,
        tokens: Arc<dyn TokenStore>,
        events: Option<EventBus>,
    ) -> Self {
        Self {
            facts,
            messages,
            tokens,
            events,
        }
    }

    pub fn messages(&self) -> &UserMessages {
        &self.messages
    }

    /// Pass 2xx responses through; classify everything else.
    pub fn classify_response(
        &self,
        url: &str,
        response: HttpResponse,
    ) -> Result<HttpResponse, ClassifiedError> {
        if response.is_success() {
            return Ok(response);
        }

        let status = response.status;
        let (kind, message) = match status {
            401 => (ErrorKind::Unauthorized, self.messages.unauthorized.clone()),
            403 => (ErrorKind::Forbidden, self.messages.forbidden.clone()),
            404 => (ErrorKind::NotFound, self.messages.not_found.clone()),
            s if s >= 500 => (ErrorKind::ServerError, self.messages.server_error.clone()),
            _ => (
                ErrorKind::Other,
                server_message(&response).unwrap_or_else(|| self.messages.generic.clone()),
            ),
        };

        if kind == ErrorKind::Unauthorized {
            self.expire_session(url);
        } else {
            debug!(status, url, kind = ?kind, "API request failed");
        }

        Err(ClassifiedError::new(
            kind,
            Some(status),
            message,
            ErrorCause::Status(response),
        ))
    }

    /// Classify a request that produced no response at all.
    pub fn classify_transport_error(&self, url: &str, error: TransportError) -> ClassifiedError {
        warn!(url, error = %error, "API request got no response");
        ClassifiedError::new(
            ErrorKind::Network,
            None,
            self.messages.network(self.facts),
            ErrorCause::NoResponse(error),
        )
    }

    /// A 2xx body that could not be decoded into the expected type.
    pub fn decode_error(&self, url: &str, error: impl fmt::Display) -> ClassifiedError {
        warn!(url, error = %error, "API response could not be decoded");
        ClassifiedError::new(
            ErrorKind::Other,
            None,
            self.messages.generic.clone(),
            ErrorCause::Decode(error.to_string()),
        )
    }

    /// A request that could not be built, e.g. an unserializable body.
    pub fn request_error(&self, url: &str, error: impl fmt::Display) -> ClassifiedError {
        warn!(url, error = %error, "API request could not be built");
        ClassifiedError::new(
            ErrorKind::Other,
            None,
            self.messages.generic.clone(),
            ErrorCause::Request(error.to_string()),
        )
    }

    fn expire_session(&self, url: &str) {
        info!(url, "Session expired, clearing stored token");
        self.tokens.clear();

        if let Some(bus) = &self.events {
            let _ = bus.emit(RuntimeEvent::Session(SessionEvent::Expired {
                url: url.to_string(),
            }));
        }
    }
}

impl fmt::Debug for ResponseClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseClassifier")
            .field("facts", &self.facts)
            .field("events", &self.events.is_some())
            .finish()
    }
}

/// Non-empty `message` field of a JSON error body.
fn server_message(response: &HttpResponse) -> Option<String> {
    serde_json::from_slice::<ServerMessage>(&response.body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{HttpMethod, MemoryTokenStore};
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;
    use std::time::Duration;

    mock! {
        Tokens {}

        impl TokenStore for Tokens {
            fn read(&self) -> Option<String>;
            fn clear(&self);
        }
    }

    fn response(status: u16, body: &'static str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    fn classifier(facts: PlatformFacts, tokens: Arc<dyn TokenStore>) -> ResponseClassifier {
        ResponseClassifier::new(facts, UserMessages::turkish(), tokens, None)
    }

    #[test]
    fn test_outbound_headers() {
        let tokens = Arc::new(MemoryTokenStore::with_token("abc"));
        let pipeline = OutboundPipeline::standard(PlatformFacts::IOS, tokens);
        let mut request = HttpRequest::new(HttpMethod::Get, "https://api.example.com/items");

        pipeline.apply(&mut request);

        assert_eq!(request.header_value("x-platform"), Some("mobile"));
        assert_eq!(request.header_value("authorization"), Some("Bearer abc"));
        assert_eq!(
            pipeline.stage_names(),
            vec!["platform-header", "bearer-token", "request-log"]
        );
    }

    #[test]
    fn test_outbound_without_token() {
        let pipeline =
            OutboundPipeline::standard(PlatformFacts::WEB, Arc::new(MemoryTokenStore::new()));
        let mut request = HttpRequest::new(HttpMethod::Get, "/items");

        pipeline.apply(&mut request);

        assert_eq!(request.header_value(PLATFORM_HEADER), Some("web"));
        assert_eq!(request.header_value("Authorization"), None);
    }

    #[test]
    fn test_success_passes_through() {
        let classifier = classifier(PlatformFacts::WEB, Arc::new(MemoryTokenStore::new()));
        let ok = classifier
            .classify_response("/items", response(204, ""))
            .unwrap();
        assert_eq!(ok.status, 204);
    }

    #[test]
    fn test_unauthorized_clears_token_once() {
        let mut tokens = MockTokens::new();
        tokens.expect_clear().times(1).return_const(());
        let classifier = classifier(PlatformFacts::WEB, Arc::new(tokens));

        let err = classifier
            .classify_response("/items", response(401, "{}"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(err.is_auth_error());
        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.user_message(),
            "Oturum süreniz dolmuş. Lütfen tekrar giriş yapın."
        );
    }

    #[test]
    fn test_status_table() {
        let mut tokens = MockTokens::new();
        tokens.expect_clear().times(0);
        let classifier = classifier(PlatformFacts::WEB, Arc::new(tokens));

        let cases = [
            (403, ErrorKind::Forbidden, "Bu işlem için yetkiniz yok."),
            (404, ErrorKind::NotFound, "İstenen kaynak bulunamadı."),
            (500, ErrorKind::ServerError, "Sunucu hatası oluştu."),
            (503, ErrorKind::ServerError, "Sunucu hatası oluştu."),
        ];
        for (status, kind, message) in cases {
            let err = classifier
                .classify_response("/items", response(status, "{}"))
                .unwrap_err();
            assert_eq!(err.kind(), kind, "status {status}");
            assert_eq!(err.user_message(), message);
            assert!(matches!(err.cause(), ErrorCause::Status(r) if r.status == status));
        }
    }

    #[test]
    fn test_other_status_prefers_server_message() {
        let classifier = classifier(PlatformFacts::WEB, Arc::new(MemoryTokenStore::new()));

        let err = classifier
            .classify_response("/items", response(422, r#"{"message":"Fiyat geçersiz"}"#))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(err.user_message(), "Fiyat geçersiz");
        assert_eq!(err.to_string(), "Fiyat geçersiz");

        let err = classifier
            .classify_response("/items", response(409, "not json"))
            .unwrap_err();
        assert_eq!(err.user_message(), "Bir hata oluştu.");
    }

    #[test]
    fn test_no_response_is_network_error() {
        let classifier = classifier(PlatformFacts::ANDROID, Arc::new(MemoryTokenStore::new()));

        let err = classifier
            .classify_transport_error("/items", TransportError::Timeout(Duration::from_secs(10)));

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.status(), None);
        assert_eq!(err.user_message(), "İnternet bağlantınızı kontrol edin");
        assert!(matches!(
            err.cause(),
            ErrorCause::NoResponse(TransportError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_unauthorized_publishes_session_expired() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        let tokens = Arc::new(MemoryTokenStore::with_token("stale"));
        let classifier = ResponseClassifier::new(
            PlatformFacts::WEB,
            UserMessages::default(),
            tokens.clone(),
            Some(bus),
        );

        let _ = classifier.classify_response("/me", response(401, ""));

        assert_eq!(tokens.read(), None);
        assert_eq!(
            rx.recv().await.unwrap(),
            RuntimeEvent::Session(SessionEvent::Expired {
                url: "/me".to_string()
            })
        );
    }
}
