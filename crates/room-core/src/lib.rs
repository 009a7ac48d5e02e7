//! # Colloq Room Core - Media Session Coordination Layer
//!
//! This crate owns the lifecycle of one conference room's real-time media
//! session on top of a pluggable streaming backend
//! ([`colloq_backend_core`]):
//!
//! - **State machine**: uninitialized → initialized (configured, not
//!   connected) → connected (live session), with strict transition
//!   validation and compensating cleanup on failure
//! - **Publisher lifecycle**: camera publish/stop with in-place device
//!   switching where the SDK allows it and full republish where it does not;
//!   single-slot screen sharing
//! - **Roster tracking**: remote streams and connections, ordered by
//!   arrival and unique by id, with change notifications carrying full
//!   snapshots
//! - **Event adaptation**: asynchronous backend events are folded into
//!   manager state under the same lock as caller operations, so the two can
//!   never interleave mid-transition
//!
//! The hosting layer supplies a [`TokenProvider`], a [`RoomEventHandler`],
//! and a backend implementation, and drives the manager through its narrow
//! imperative API: `initialize`, `connect`, `publish_camera`,
//! `publish_screen`, `unpublish_screen`, `disconnect`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use colloq_room_core::{RoomSessionConfig, RoomSessionManager, RoomResult};
//! use colloq_backend_core::{DeviceId, ElementId, MediaBackend, SessionId};
//! use std::sync::Arc;
//!
//! # struct Host;
//! # #[async_trait::async_trait]
//! # impl colloq_room_core::RoomEventHandler for Host {}
//! # async fn example(backend: Arc<dyn MediaBackend>) -> RoomResult<()> {
//! let manager = RoomSessionManager::new(backend, RoomSessionConfig::default());
//!
//! let provider = |session_id: SessionId| async move {
//!     Ok::<_, colloq_room_core::RoomError>(format!("token-for-{session_id}"))
//! };
//! manager
//!     .initialize(Arc::new(provider), SessionId::new("room-42"), Arc::new(Host))
//!     .await?;
//! manager.connect().await?;
//! manager
//!     .publish_camera(
//!         &ElementId::new("camera-preview"),
//!         Some(DeviceId::new("front-camera")),
//!         None,
//!     )
//!     .await?;
//! manager.disconnect().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod token;

mod state;

// Re-export main types
pub use config::RoomSessionConfig;
pub use error::{RoomError, RoomResult};
pub use events::RoomEventHandler;
pub use manager::RoomSessionManager;
pub use state::RoomStateKind;
pub use token::TokenProvider;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
