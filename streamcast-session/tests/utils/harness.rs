use crate::utils::{CountingRecording, RecordingSinks, ScriptedMediaSource};
use std::sync::Arc;
use std::time::Duration;
use streamcast_core::StreamId;
use streamcast_session::{
    MediaSource, MemoryRelay, RtcConfig, SessionConfig, SessionEvent, SessionHandle,
    StreamSession, SyntheticMediaSource,
};
use tokio::sync::mpsc;
use tracing::Level;

pub async fn wait_until<F>(what: &str, cond: F)
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting until {what}"
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub struct Participant {
    pub handle: SessionHandle,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    pub recording: Arc<CountingRecording>,
}

impl Participant {
    /// Next event, bounded so a hung negotiation fails the test instead of
    /// blocking it.
    pub async fn next_event(&mut self) -> SessionEvent {
        tokio::time::timeout(Duration::from_secs(10), self.events.recv())
            .await
            .expect("timed out waiting for a session event")
            .expect("session event channel closed")
    }

    pub async fn wait_negotiated(&mut self) {
        loop {
            match self.next_event().await {
                SessionEvent::Negotiated => return,
                SessionEvent::Fatal(e) => panic!("session failed while negotiating: {e}"),
                SessionEvent::Ended => panic!("session ended while negotiating"),
                SessionEvent::ScreenShare(_) => {}
            }
        }
    }

    pub async fn wait_screen_share(&mut self, expected: bool) {
        loop {
            match self.next_event().await {
                SessionEvent::ScreenShare(active) if active == expected => return,
                SessionEvent::Fatal(e) => panic!("session failed: {e}"),
                SessionEvent::Ended => panic!("session ended waiting for screen share"),
                _ => {}
            }
        }
    }

    pub async fn wait_ended(&mut self) {
        loop {
            match self.next_event().await {
                SessionEvent::Ended => return,
                SessionEvent::Fatal(e) => panic!("expected clean teardown, got: {e}"),
                _ => {}
            }
        }
    }
}

pub struct TestStream {
    pub relay: Arc<MemoryRelay>,
    pub stream_id: StreamId,
    pub host: Participant,
    pub viewer: Participant,
    pub viewer_sinks: Arc<RecordingSinks>,
}

/// One host and one viewer session over an in-process relay, both running.
pub async fn spawn_stream() -> TestStream {
    spawn_stream_with(SessionConfig::default(), Arc::new(SyntheticMediaSource)).await
}

/// Like [`spawn_stream`], but with loopback candidates enabled and a media
/// source whose tracks the test can write samples through, so RTP actually
/// flows between the two links.
pub async fn spawn_media_stream() -> (TestStream, Arc<ScriptedMediaSource>) {
    let config = SessionConfig {
        rtc: RtcConfig {
            ice_servers: vec![],
            include_loopback_candidates: true,
        },
    };
    let media = ScriptedMediaSource::new();
    let stream = spawn_stream_with(config, media.clone()).await;
    (stream, media)
}

async fn spawn_stream_with(config: SessionConfig, media: Arc<dyn MediaSource>) -> TestStream {
    init_tracing();

    let relay = MemoryRelay::new();
    let stream_id = StreamId::random();

    // Both participants attach before either loop runs, so the viewer's
    // `ready` always finds the host registered.
    let (host_sink, host_rx) = relay.attach(&stream_id);
    let (viewer_sink, viewer_rx) = relay.attach(&stream_id);

    let host_recording = Arc::new(CountingRecording::default());
    let (host_session, host_handle, host_events) = StreamSession::host(
        stream_id.clone(),
        config.clone(),
        host_sink,
        host_rx,
        media,
        host_recording.clone(),
    );
    tokio::spawn(host_session.run());

    let viewer_sinks = Arc::new(RecordingSinks::default());
    let viewer_recording = Arc::new(CountingRecording::default());
    let (viewer_session, viewer_handle, viewer_events) = StreamSession::viewer(
        stream_id.clone(),
        config,
        viewer_sink,
        viewer_rx,
        viewer_sinks.clone(),
        viewer_recording.clone(),
    );
    tokio::spawn(viewer_session.run());

    TestStream {
        relay,
        stream_id,
        host: Participant {
            handle: host_handle,
            events: host_events,
            recording: host_recording,
        },
        viewer: Participant {
            handle: viewer_handle,
            events: viewer_events,
            recording: viewer_recording,
        },
        viewer_sinks,
    }
}
