use async_trait::async_trait;
use std::sync::Arc;
use streamcast_core::{SessionError, StreamId};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// Local capture, owned by the host. Actual device access lives outside the
/// core; implementations hand back ready-to-send local tracks.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Camera audio + video, acquired once at stream start. Failure here is
    /// fatal for the session.
    async fn primary_tracks(&self)
    -> Result<Vec<Arc<dyn TrackLocal + Send + Sync>>, SessionError>;

    /// The secondary screen-capture track. Failure here is fatal only for
    /// the screen-share request, never for an established link.
    async fn screen_track(&self) -> Result<Arc<dyn TrackLocal + Send + Sync>, SessionError>;
}

/// Rendering sinks on the viewer side, implemented by the embedding layer.
/// The track router calls these; it guarantees a track id is never attached
/// to both sinks and that repeated attachments are filtered out.
#[async_trait]
pub trait MediaSinks: Send + Sync {
    async fn attach_primary_track(&self, track: Arc<TrackRemote>);
    async fn attach_screen_share_track(&self, track: Arc<TrackRemote>);
    async fn detach_screen_share_track(&self);
}

/// Recording/upload pipeline seam. The session calls this exactly once at
/// teardown; chunk upload itself is not this crate's job.
#[async_trait]
pub trait RecordingHook: Send + Sync {
    async fn notify_stream_ending(&self, stream_id: &StreamId);
}

pub struct NoopRecording;

#[async_trait]
impl RecordingHook for NoopRecording {
    async fn notify_stream_ending(&self, _stream_id: &StreamId) {}
}

/// Sample-track media source with no real capture behind it. Enough for the
/// demo and the integration tests: the tracks negotiate like camera and
/// screen tracks, they just never produce frames.
pub struct SyntheticMediaSource;

impl SyntheticMediaSource {
    fn audio_track(id: &str) -> Arc<dyn TrackLocal + Send + Sync> {
        Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            id.to_owned(),
            "streamcast".to_owned(),
        ))
    }

    fn video_track(id: &str) -> Arc<dyn TrackLocal + Send + Sync> {
        Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
            id.to_owned(),
            "streamcast".to_owned(),
        ))
    }
}

#[async_trait]
impl MediaSource for SyntheticMediaSource {
    async fn primary_tracks(
        &self,
    ) -> Result<Vec<Arc<dyn TrackLocal + Send + Sync>>, SessionError> {
        Ok(vec![
            Self::audio_track("camera-audio"),
            Self::video_track("camera-video"),
        ])
    }

    async fn screen_track(&self) -> Result<Arc<dyn TrackLocal + Send + Sync>, SessionError> {
        Ok(Self::video_track("screen-video"))
    }
}
