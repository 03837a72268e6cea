use async_trait::async_trait;
use streamcast_core::{SignalEnvelope, SignalingError};

/// Outbound half of the relay channel for one participant.
///
/// The inbound half is an ordered `mpsc::Receiver<SignalEnvelope>` handed to
/// the session at construction; the relay implementation owns how envelopes
/// actually travel. Implementations must not drop envelopes silently: if the
/// underlying channel is closed or not yet open, `send` returns
/// [`SignalingError::ChannelNotReady`] so the session can decide to retry or
/// tear down.
#[async_trait]
pub trait SignalingSink: Send + Sync {
    async fn send(&self, envelope: SignalEnvelope) -> Result<(), SignalingError>;
}
