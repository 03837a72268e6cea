use crate::signaling::SignalingSink;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use streamcast_core::{SignalEnvelope, SignalingError, StreamId};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

const PARTICIPANT_CHANNEL_CAPACITY: usize = 256;

struct Participant {
    id: Uuid,
    tx: mpsc::Sender<SignalEnvelope>,
}

/// In-process relay: fans every envelope out to the other participants of
/// the same stream, mirroring what the WebSocket relay does over the wire.
/// Used by the integration tests and the CLI demo.
pub struct MemoryRelay {
    streams: DashMap<StreamId, Vec<Participant>>,
}

impl MemoryRelay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            streams: DashMap::new(),
        })
    }

    /// Join a stream's group. Returns the outbound sink and the inbound
    /// envelope channel for the new participant.
    pub fn attach(
        self: &Arc<Self>,
        stream_id: &StreamId,
    ) -> (Arc<MemoryRelaySink>, mpsc::Receiver<SignalEnvelope>) {
        let (tx, rx) = mpsc::channel(PARTICIPANT_CHANNEL_CAPACITY);
        let id = Uuid::new_v4();

        self.streams
            .entry(stream_id.clone())
            .or_default()
            .push(Participant { id, tx });

        debug!("Participant {} attached to stream {}", id, stream_id);

        let sink = Arc::new(MemoryRelaySink {
            relay: Arc::clone(self),
            stream_id: stream_id.clone(),
            id,
        });
        (sink, rx)
    }

    /// Drop every participant of a stream. Their inbound channels close,
    /// which the sessions treat as an unexpected relay loss.
    pub fn close_stream(&self, stream_id: &StreamId) {
        self.streams.remove(stream_id);
    }

    fn detach(&self, stream_id: &StreamId, id: Uuid) {
        if let Some(mut group) = self.streams.get_mut(stream_id) {
            group.retain(|p| p.id != id);
            if group.is_empty() {
                drop(group);
                self.streams.remove(stream_id);
            }
        }
    }

    async fn fan_out(
        &self,
        stream_id: &StreamId,
        sender_id: Uuid,
        envelope: SignalEnvelope,
    ) -> Result<(), SignalingError> {
        let targets: Vec<mpsc::Sender<SignalEnvelope>> = match self.streams.get(stream_id) {
            Some(group) if group.iter().any(|p| p.id == sender_id) => group
                .iter()
                .filter(|p| p.id != sender_id)
                .map(|p| p.tx.clone())
                .collect(),
            _ => return Err(SignalingError::ChannelNotReady),
        };

        for tx in targets {
            if tx.send(envelope.clone()).await.is_err() {
                warn!("Dropping envelope for a departed participant of {}", stream_id);
            }
        }
        Ok(())
    }
}

impl Default for MemoryRelay {
    fn default() -> Self {
        Self {
            streams: DashMap::new(),
        }
    }
}

pub struct MemoryRelaySink {
    relay: Arc<MemoryRelay>,
    stream_id: StreamId,
    id: Uuid,
}

#[async_trait]
impl SignalingSink for MemoryRelaySink {
    async fn send(&self, envelope: SignalEnvelope) -> Result<(), SignalingError> {
        self.relay.fan_out(&self.stream_id, self.id, envelope).await
    }
}

impl Drop for MemoryRelaySink {
    fn drop(&mut self) {
        self.relay.detach(&self.stream_id, self.id);
    }
}
