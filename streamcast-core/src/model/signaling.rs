use serde::{Deserialize, Serialize};
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl Default for IceServerConfig {
    fn default() -> Self {
        Self {
            urls: vec!["stun:stun.l.google.com:19302".to_owned()],
            username: None,
            credential: None,
        }
    }
}

/// One unit on the relay wire: `{ "type": ..., "data": ... }`.
///
/// `Ready` announces a viewer waiting for an offer; `Offer`/`Answer` carry
/// the session description whose own `type` field matches the envelope;
/// `Ice` carries a trickled candidate; `ScreenSharing` tells viewers the
/// secondary track is coming or going.
///
/// Envelopes are immutable once sent. The relay preserves order within one
/// connection, but nothing orders independent types against each other: an
/// `ice` envelope may arrive before the offer/answer exchange it belongs to
/// has finished, and a duplicate `answer` may arrive after the link moved
/// on. Receivers buffer or discard accordingly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum SignalEnvelope {
    Ready,
    Offer(RTCSessionDescription),
    Answer(RTCSessionDescription),
    Ice(RTCIceCandidateInit),
    ScreenSharing(bool),
}

impl SignalEnvelope {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            SignalEnvelope::Ready => "ready",
            SignalEnvelope::Offer(_) => "offer",
            SignalEnvelope::Answer(_) => "answer",
            SignalEnvelope::Ice(_) => "ice",
            SignalEnvelope::ScreenSharing(_) => "screen-sharing",
        }
    }
}
