//! # Catalog API Client
//!
//! Every network call of the catalog client goes through [`ApiClient`]:
//!
//! 1. **Outbound**: `X-Platform` header, bearer token from the
//!    [`TokenStore`](bridge_traits::TokenStore), default JSON content type
//! 2. **Transport**: one attempt with the configured timeout, no retries
//! 3. **Inbound**: 2xx bodies pass through untouched; everything else becomes
//!    a [`ClassifiedError`] carrying a user-facing message
//!
//! A 401 clears the token store and publishes
//! [`SessionEvent::Expired`](core_runtime::events::SessionEvent) so the
//! application can send the user back to sign-in.

pub mod body;
pub mod client;
pub mod error;
pub mod messages;
pub mod pipeline;

pub use body::Body;
pub use client::{join_url, upload_percent, ApiClient, ApiClientBuilder, UploadFile};
pub use error::{ClassifiedError, ErrorCause, ErrorKind};
pub use messages::UserMessages;
pub use pipeline::{OutboundPipeline, RequestStage, ResponseClassifier};
