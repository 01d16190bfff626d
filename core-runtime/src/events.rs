//! # Event Bus System
//!
//! Broadcast channel for runtime-wide notifications, built on
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! Producers in the capability layer and the HTTP client publish
//! [`RuntimeEvent`]s; the application subscribes to react to them (for example
//! redirecting to sign-in when the session expires). Publishing never blocks
//! and never fails the producer: with no subscribers the event is dropped.
//!
//! ```text
//! ┌──────────────┐   emit   ┌───────────┐  subscribe  ┌─────────────┐
//! │ HTTP client  ├─────────>│           ├────────────>│ Application │
//! └──────────────┘          │ EventBus  │             └─────────────┘
//! ┌──────────────┐   emit   │           │  subscribe  ┌─────────────┐
//! │ Capabilities ├─────────>│           ├────────────>│   Logger    │
//! └──────────────┘          └───────────┘             └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, RuntimeEvent, SessionEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(RuntimeEvent::Session(SessionEvent::Expired {
//!     url: "/items".to_string(),
//! }))
//! .ok();
//!
//! assert!(matches!(rx.recv().await, Ok(RuntimeEvent::Session(_))));
//! # }
//! ```

use std::fmt;

use bridge_traits::{Capability, ConnectionType};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, SendError},
    Receiver,
};

/// Default per-subscriber buffer size.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum RuntimeEvent {
    Session(SessionEvent),
    Capability(CapabilityEvent),
    Network(NetworkEvent),
}

impl RuntimeEvent {
    pub fn description(&self) -> &str {
        match self {
            RuntimeEvent::Session(e) => e.description(),
            RuntimeEvent::Capability(e) => e.description(),
            RuntimeEvent::Network(e) => e.description(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            RuntimeEvent::Session(SessionEvent::Expired { .. }) => EventSeverity::Warning,
            RuntimeEvent::Capability(CapabilityEvent::Unavailable { .. }) => {
                EventSeverity::Warning
            }
            RuntimeEvent::Network(NetworkEvent::StatusChanged {
                connected: false, ..
            }) => EventSeverity::Warning,
            RuntimeEvent::Capability(CapabilityEvent::Acquired { .. }) => EventSeverity::Debug,
            RuntimeEvent::Network(_) => EventSeverity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Authentication session events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// The server rejected the stored credential; the token store has been
    /// cleared and the user has to sign in again.
    Expired {
        /// Request URL that received the 401.
        url: String,
    },
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::Expired { .. } => "Session expired",
        }
    }
}

/// Native capability binding events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CapabilityEvent {
    Acquired { capability: Capability },
    Unavailable { capability: Capability, reason: String },
}

impl CapabilityEvent {
    fn description(&self) -> &str {
        match self {
            CapabilityEvent::Acquired { .. } => "Native capability bound",
            CapabilityEvent::Unavailable { .. } => "Native capability unavailable",
        }
    }
}

/// Connectivity events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum NetworkEvent {
    StatusChanged {
        connected: bool,
        connection_type: ConnectionType,
    },
}

impl NetworkEvent {
    fn description(&self) -> &str {
        match self {
            NetworkEvent::StatusChanged {
                connected: true, ..
            } => "Network connected",
            NetworkEvent::StatusChanged {
                connected: false, ..
            } => "Network disconnected",
        }
    }
}

/// Central event bus.
///
/// Cloning is cheap; all clones publish into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RuntimeEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    ///
    /// `capacity` bounds how far a subscriber may fall behind before it
    /// receives `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when there are none.
    pub fn emit(&self, event: RuntimeEvent) -> Result<usize, SendError<RuntimeEvent>> {
        self.sender.send(event)
    }

    /// Creates a new receiver for all future events. Past events are not
    /// replayed.
    pub fn subscribe(&self) -> Receiver<RuntimeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&RuntimeEvent) -> bool + Send + Sync>;

/// Receiver wrapper with optional filtering.
pub struct EventStream {
    receiver: Receiver<RuntimeEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<RuntimeEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&RuntimeEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &RuntimeEvent) -> bool {
        self.filter.as_ref().map_or(true, |f| f(event))
    }

    /// Receives the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<RuntimeEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking receive; `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<Result<RuntimeEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
