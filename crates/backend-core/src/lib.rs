//! # Colloq Backend Core - Streaming Backend Contract
//!
//! This crate defines the capability-level contract between Colloq's media
//! session coordination layer and the external real-time streaming SDK:
//!
//! - **[`MediaBackend`]** - capability probe plus session/publisher factories
//! - **[`MediaSession`]** - connect, publish, unpublish, disconnect, events
//! - **[`MediaPublisher`]** - a local camera or screen source with dynamic
//!   device switching and track enable/disable
//!
//! Concrete SDK bindings live outside this workspace; everything here is
//! traits and the data types that cross the boundary. Vendor callback APIs
//! are expected to be wrapped so that each interaction is one awaitable
//! operation with a typed success/failure result, and asynchronous SDK events
//! are delivered over broadcast channels.

#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod session;
pub mod types;

// Re-export main types
pub use backend::MediaBackend;
pub use error::{BackendError, BackendResult};
pub use session::{MediaPublisher, MediaSession, PublisherEvent, SessionEvent};
pub use types::{
    ConnectionId, ConnectionInfo, DeviceId, Dimension, ElementId, InsertMode, PublisherId,
    PublisherOptions, ScreenShareCapability, SessionId, StreamDestroyedReason, StreamId,
    StreamInfo, VideoResolution, VideoSource,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
