//! Session token acquisition

use async_trait::async_trait;
use std::future::Future;

use crate::error::RoomResult;
use colloq_backend_core::SessionId;

/// Issues connection tokens for media sessions
///
/// Token issuance belongs to the hosting application (it knows the user, the
/// room, and the backend credentials); the session manager only asks for a
/// token at connect time and never caches one. Implementations should return
/// [`RoomError::token`](crate::RoomError::token) for issuance failures so
/// callers can tell them apart from backend failures.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Issue a token for the given session
    async fn token(&self, session_id: &SessionId) -> RoomResult<String>;
}

/// Any async closure from session id to token works as a provider
#[async_trait]
impl<F, Fut> TokenProvider for F
where
    F: Fn(SessionId) -> Fut + Send + Sync,
    Fut: Future<Output = RoomResult<String>> + Send + 'static,
{
    async fn token(&self, session_id: &SessionId) -> RoomResult<String> {
        (self)(session_id.clone()).await
    }
}
