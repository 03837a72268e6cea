use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use streamcast_core::StreamId;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

struct RelayInner {
    streams: DashMap<StreamId, DashMap<Uuid, mpsc::UnboundedSender<Message>>>,
}

/// Per-stream fan-out groups. Messages are forwarded to every participant of
/// the same stream except the sender; streams are created on first join and
/// pruned when the last participant leaves.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl Default for RelayService {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RelayInner {
                streams: DashMap::new(),
            }),
        }
    }

    /// Register a participant's outgoing channel under its stream. Returns
    /// the participant id used for `leave` and `fan_out`.
    pub fn join(&self, stream_id: &StreamId, tx: mpsc::UnboundedSender<Message>) -> Uuid {
        let participant_id = Uuid::new_v4();
        self.inner
            .streams
            .entry(stream_id.clone())
            .or_default()
            .insert(participant_id, tx);
        info!("Participant {} joined stream {}", participant_id, stream_id);
        participant_id
    }

    pub fn leave(&self, stream_id: &StreamId, participant_id: Uuid) {
        let emptied = match self.inner.streams.get(stream_id) {
            Some(group) => {
                group.remove(&participant_id);
                group.is_empty()
            }
            None => return,
        };
        if emptied {
            self.inner
                .streams
                .remove_if(stream_id, |_, group| group.is_empty());
            info!("Stream {} has no participants left; pruned", stream_id);
        }
        info!("Participant {} left stream {}", participant_id, stream_id);
    }

    /// Forward one frame to everyone else in the stream. Participants whose
    /// channel is gone are skipped; the socket task cleans them up on exit.
    pub fn fan_out(&self, stream_id: &StreamId, sender_id: Uuid, message: Message) {
        let Some(group) = self.inner.streams.get(stream_id) else {
            warn!("Fan-out to unknown stream {}", stream_id);
            return;
        };

        for entry in group.iter() {
            if *entry.key() == sender_id {
                continue;
            }
            if entry.value().send(message.clone()).is_err() {
                debug!("Participant {} channel closed; skipping", entry.key());
            }
        }
    }

    pub fn participant_count(&self, stream_id: &StreamId) -> usize {
        self.inner
            .streams
            .get(stream_id)
            .map(|group| group.len())
            .unwrap_or(0)
    }

    pub fn stream_count(&self) -> usize {
        self.inner.streams.len()
    }
}
