//! Successful response bodies.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use bridge_traits::HttpResponse;

/// A 2xx response, passed through exactly as the transport returned it.
#[derive(Debug, Clone)]
pub struct Body {
    response: HttpResponse,
}

impl Body {
    pub(crate) fn new(response: HttpResponse) -> Self {
        Self { response }
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.response.header(key)
    }

    pub fn bytes(&self) -> &Bytes {
        &self.response.body
    }

    pub fn is_empty(&self) -> bool {
        self.response.body.is_empty()
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.response.body)
    }

    /// Body as UTF-8 text, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.response.body).into_owned()
    }

    pub fn into_response(self) -> HttpResponse {
        self.response
    }
}

impl From<Body> for Bytes {
    fn from(body: Body) -> Self {
        body.response.body
    }
}
