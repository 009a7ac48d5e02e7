//! Shared test support: a scripted in-memory backend, a notification
//! recorder, and a fixture wiring them to a manager.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

use colloq_backend_core::{
    BackendError, BackendResult, ConnectionId, ConnectionInfo, DeviceId, ElementId, MediaBackend,
    MediaPublisher, MediaSession, PublisherEvent, PublisherId, PublisherOptions,
    ScreenShareCapability, SessionEvent, SessionId, StreamDestroyedReason, StreamId, StreamInfo,
};
use colloq_room_core::{
    RoomError, RoomEventHandler, RoomResult, RoomSessionConfig, RoomSessionManager, TokenProvider,
};

/// Session id used by every fixture
pub const ROOM: &str = "room-under-test";

/// Failure and capability switches shared between the backend and the
/// sessions/publishers it mints
pub struct Controls {
    pub capability: Mutex<ScreenShareCapability>,
    pub fail_capability: AtomicBool,
    pub fail_connect: AtomicBool,
    pub fail_publish: AtomicBool,
    pub hang_publish: AtomicBool,
    pub fail_init_publisher: AtomicBool,
}

impl Controls {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            capability: Mutex::new(ScreenShareCapability {
                supported: true,
                extension_registered: None,
            }),
            fail_capability: AtomicBool::new(false),
            fail_connect: AtomicBool::new(false),
            fail_publish: AtomicBool::new(false),
            hang_publish: AtomicBool::new(false),
            fail_init_publisher: AtomicBool::new(false),
        })
    }

    pub fn set_capability(&self, capability: ScreenShareCapability) {
        *self.capability.lock().unwrap() = capability;
    }
}

/// In-memory stand-in for a streaming SDK binding
pub struct MockBackend {
    pub controls: Arc<Controls>,
    pub sessions: Mutex<Vec<Arc<MockSession>>>,
    pub publishers: Mutex<Vec<Arc<MockPublisher>>>,
}

impl MockBackend {
    pub fn new(controls: Arc<Controls>) -> Arc<Self> {
        Arc::new(Self {
            controls,
            sessions: Mutex::new(Vec::new()),
            publishers: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl MediaBackend for MockBackend {
    async fn screen_share_capability(&self) -> BackendResult<ScreenShareCapability> {
        if self.controls.fail_capability.load(Ordering::SeqCst) {
            return Err(BackendError::capability("probe offline"));
        }
        Ok(*self.controls.capability.lock().unwrap())
    }

    async fn init_session(&self, session_id: &SessionId) -> BackendResult<Arc<dyn MediaSession>> {
        let session = Arc::new(MockSession {
            id: session_id.clone(),
            controls: self.controls.clone(),
            events: broadcast::channel(64).0,
            connected: AtomicBool::new(false),
            connect_calls: AtomicUsize::new(0),
            published: Mutex::new(Vec::new()),
        });
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    async fn init_publisher(
        &self,
        _target: &ElementId,
        options: PublisherOptions,
    ) -> BackendResult<Arc<dyn MediaPublisher>> {
        if self.controls.fail_init_publisher.load(Ordering::SeqCst) {
            return Err(BackendError::device("capture device unavailable"));
        }
        let publisher = Arc::new(MockPublisher {
            id: PublisherId::generate(),
            options: options.clone(),
            events: broadcast::channel(16).0,
            destroyed: AtomicBool::new(false),
            audio_source: Mutex::new(options.audio_device.clone()),
            video_source: Mutex::new(options.video_device.clone()),
            audio_enabled: AtomicBool::new(options.publish_audio),
            video_enabled: AtomicBool::new(options.publish_video),
        });
        self.publishers.lock().unwrap().push(publisher.clone());
        Ok(publisher)
    }
}

/// Scripted session: records connect/publish/unpublish calls and lets tests
/// emit backend events at will
pub struct MockSession {
    pub id: SessionId,
    pub controls: Arc<Controls>,
    pub events: broadcast::Sender<SessionEvent>,
    pub connected: AtomicBool,
    pub connect_calls: AtomicUsize,
    pub published: Mutex<Vec<PublisherId>>,
}

impl MockSession {
    pub fn emit(&self, event: SessionEvent) {
        // no receiver just means nobody is pumping yet
        let _ = self.events.send(event);
    }

    pub fn is_published(&self, id: &PublisherId) -> bool {
        self.published.lock().unwrap().contains(id)
    }
}

#[async_trait]
impl MediaSession for MockSession {
    fn id(&self) -> &SessionId {
        &self.id
    }

    async fn connect(&self, _token: &str) -> BackendResult<()> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.controls.fail_connect.load(Ordering::SeqCst) {
            return Err(BackendError::connect("service rejected token"));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn publish(&self, publisher: Arc<dyn MediaPublisher>) -> BackendResult<()> {
        if self.controls.hang_publish.load(Ordering::SeqCst) {
            futures::future::pending::<()>().await;
        }
        if self.controls.fail_publish.load(Ordering::SeqCst) {
            return Err(BackendError::publish("simulated publish failure"));
        }
        self.published.lock().unwrap().push(publisher.id().clone());
        Ok(())
    }

    async fn unpublish(&self, publisher: Arc<dyn MediaPublisher>) -> BackendResult<()> {
        self.published.lock().unwrap().retain(|id| id != publisher.id());
        Ok(())
    }

    async fn disconnect(&self) -> BackendResult<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// Scripted publisher: records device switches and destruction
pub struct MockPublisher {
    pub id: PublisherId,
    pub options: PublisherOptions,
    pub events: broadcast::Sender<PublisherEvent>,
    pub destroyed: AtomicBool,
    pub audio_source: Mutex<Option<DeviceId>>,
    pub video_source: Mutex<Option<DeviceId>>,
    pub audio_enabled: AtomicBool,
    pub video_enabled: AtomicBool,
}

impl MockPublisher {
    pub fn emit_stream_destroyed(&self, reason: StreamDestroyedReason) {
        let _ = self.events.send(PublisherEvent::StreamDestroyed { reason });
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaPublisher for MockPublisher {
    fn id(&self) -> &PublisherId {
        &self.id
    }

    async fn destroy(&self) -> BackendResult<()> {
        self.destroyed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn set_audio_source(&self, device: &DeviceId) -> BackendResult<()> {
        *self.audio_source.lock().unwrap() = Some(device.clone());
        Ok(())
    }

    async fn set_video_source(&self, device: &DeviceId) -> BackendResult<()> {
        *self.video_source.lock().unwrap() = Some(device.clone());
        Ok(())
    }

    async fn set_audio_enabled(&self, enabled: bool) -> BackendResult<()> {
        self.audio_enabled.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    async fn set_video_enabled(&self, enabled: bool) -> BackendResult<()> {
        self.video_enabled.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PublisherEvent> {
        self.events.subscribe()
    }
}

/// Everything a handler was told, in order
#[derive(Debug, Clone)]
pub enum Note {
    StreamsChanged(Vec<StreamInfo>),
    ConnectionsChanged(Vec<ConnectionInfo>),
    SessionConnected(bool),
    CameraCreated,
    CameraDestroyed(StreamDestroyedReason),
    ScreenCreated,
    ScreenDestroyed(StreamDestroyedReason),
}

#[derive(Default)]
pub struct RecordingHandler {
    notes: Mutex<Vec<Note>>,
}

impl RecordingHandler {
    pub fn notes(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }

    fn push(&self, note: Note) {
        self.notes.lock().unwrap().push(note);
    }

    pub fn session_connected(&self) -> Vec<bool> {
        self.notes()
            .into_iter()
            .filter_map(|n| match n {
                Note::SessionConnected(connected) => Some(connected),
                _ => None,
            })
            .collect()
    }

    pub fn camera_created(&self) -> usize {
        self.notes()
            .iter()
            .filter(|n| matches!(n, Note::CameraCreated))
            .count()
    }

    pub fn camera_destroyed(&self) -> Vec<StreamDestroyedReason> {
        self.notes()
            .into_iter()
            .filter_map(|n| match n {
                Note::CameraDestroyed(reason) => Some(reason),
                _ => None,
            })
            .collect()
    }

    pub fn screen_created(&self) -> usize {
        self.notes()
            .iter()
            .filter(|n| matches!(n, Note::ScreenCreated))
            .count()
    }

    pub fn screen_destroyed(&self) -> Vec<StreamDestroyedReason> {
        self.notes()
            .into_iter()
            .filter_map(|n| match n {
                Note::ScreenDestroyed(reason) => Some(reason),
                _ => None,
            })
            .collect()
    }

    pub fn streams_changed(&self) -> Vec<Vec<StreamInfo>> {
        self.notes()
            .into_iter()
            .filter_map(|n| match n {
                Note::StreamsChanged(streams) => Some(streams),
                _ => None,
            })
            .collect()
    }

    pub fn connections_changed(&self) -> Vec<Vec<ConnectionInfo>> {
        self.notes()
            .into_iter()
            .filter_map(|n| match n {
                Note::ConnectionsChanged(connections) => Some(connections),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl RoomEventHandler for RecordingHandler {
    async fn on_streams_changed(&self, streams: Vec<StreamInfo>) {
        self.push(Note::StreamsChanged(streams));
    }

    async fn on_connections_changed(&self, connections: Vec<ConnectionInfo>) {
        self.push(Note::ConnectionsChanged(connections));
    }

    async fn on_session_connected(&self, connected: bool) {
        self.push(Note::SessionConnected(connected));
    }

    async fn on_camera_stream_created(&self) {
        self.push(Note::CameraCreated);
    }

    async fn on_camera_stream_destroyed(&self, reason: StreamDestroyedReason) {
        self.push(Note::CameraDestroyed(reason));
    }

    async fn on_screen_stream_created(&self) {
        self.push(Note::ScreenCreated);
    }

    async fn on_screen_stream_destroyed(&self, reason: StreamDestroyedReason) {
        self.push(Note::ScreenDestroyed(reason));
    }
}

/// A provider that issues `token-<session id>`
pub fn token_provider() -> Arc<dyn TokenProvider> {
    Arc::new(|session_id: SessionId| async move {
        Ok::<_, RoomError>(format!("token-{session_id}"))
    })
}

/// A provider whose issuer is down
pub fn failing_token_provider() -> Arc<dyn TokenProvider> {
    Arc::new(|_: SessionId| async move { Err::<String, _>(RoomError::token("issuer offline")) })
}

/// A provider that never answers
pub fn hanging_token_provider() -> Arc<dyn TokenProvider> {
    Arc::new(|_: SessionId| async move { futures::future::pending::<RoomResult<String>>().await })
}

/// A manager wired to a scripted backend and a recording handler
pub struct Fixture {
    pub manager: Arc<RoomSessionManager>,
    pub backend: Arc<MockBackend>,
    pub controls: Arc<Controls>,
    pub handler: Arc<RecordingHandler>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(RoomSessionConfig::default())
    }

    pub fn with_config(config: RoomSessionConfig) -> Self {
        init_tracing();
        let controls = Controls::new();
        let backend = MockBackend::new(controls.clone());
        let handler = Arc::new(RecordingHandler::default());
        let manager = RoomSessionManager::new(backend.clone(), config);
        Self {
            manager,
            backend,
            controls,
            handler,
        }
    }

    pub async fn initialize(&self) -> RoomResult<()> {
        self.manager
            .initialize(token_provider(), SessionId::new(ROOM), self.handler.clone())
            .await
    }

    pub async fn connect(&self) {
        self.initialize().await.expect("initialize");
        self.manager.connect().await.expect("connect");
    }

    pub fn session(&self) -> Arc<MockSession> {
        self.backend.sessions.lock().unwrap().first().expect("no session created").clone()
    }

    pub fn publisher(&self, index: usize) -> Arc<MockPublisher> {
        self.backend.publishers.lock().unwrap()[index].clone()
    }

    pub fn publisher_count(&self) -> usize {
        self.backend.publishers.lock().unwrap().len()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

pub fn stream(id: &str) -> StreamInfo {
    StreamInfo {
        id: StreamId::new(id),
        connection_id: ConnectionId::new(format!("conn-for-{id}")),
        name: None,
        has_audio: true,
        has_video: true,
        created_at: Utc::now(),
    }
}

pub fn connection(id: &str) -> ConnectionInfo {
    ConnectionInfo {
        id: ConnectionId::new(id),
        data: None,
        created_at: Utc::now(),
    }
}

pub fn element(id: &str) -> ElementId {
    ElementId::new(id)
}

pub fn device(id: &str) -> DeviceId {
    DeviceId::new(id)
}

/// Poll until `condition` holds; panics after two seconds
pub async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}

/// Poll an async condition until it holds; panics after two seconds
pub async fn wait_until_async<F, Fut>(what: &str, condition: F)
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..400 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}
