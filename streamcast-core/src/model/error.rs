use thiserror::Error;

/// Failure of the signaling channel itself.
#[derive(Debug, Error)]
pub enum SignalingError {
    /// The relay channel is not open. Callers either retry or tear down;
    /// envelopes are never dropped silently.
    #[error("signaling channel is not ready")]
    ChannelNotReady,

    #[error("failed to encode signaling envelope: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Session-fatal conditions surfaced to the embedding layer.
///
/// Transient signaling races (stale answers, out-of-order candidates) are
/// absorbed inside the session and never appear here.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Camera/microphone/screen capture could not be acquired. Fatal for
    /// the requested action; only fatal for the session when it happens at
    /// stream start.
    #[error("media acquisition failed: {0}")]
    MediaAcquisition(String),

    /// ICE connectivity failed again after the one permitted restart.
    #[error("ice connectivity failed after restart")]
    IceFailed,

    #[error(transparent)]
    Signaling(#[from] SignalingError),

    #[error("webrtc error: {0}")]
    Webrtc(#[from] webrtc::Error),

    /// The session is already closed; the requested operation was dropped.
    #[error("session closed")]
    Closed,
}
