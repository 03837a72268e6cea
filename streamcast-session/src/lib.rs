pub mod media;
pub mod peer;
pub mod session;
pub mod signaling;

pub use media::{MediaSinks, MediaSource, NoopRecording, RecordingHook, SyntheticMediaSource};
pub use peer::{
    IceCandidateQueue, PeerEvent, PeerLink, RemoteTrackInfo, RouteTarget, RtcConfig, TrackKind,
    TrackRouter,
};
pub use session::{
    ScreenShareOutcome, SessionConfig, SessionEvent, SessionHandle, SessionManager, StreamSession,
};
pub use signaling::{MemoryRelay, SignalingSink};
