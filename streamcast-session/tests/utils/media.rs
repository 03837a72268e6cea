use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use streamcast_core::{SessionError, StreamId};
use streamcast_session::{MediaSinks, MediaSource, RecordingHook};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// Viewer sinks that record what the router attached, for assertions.
#[derive(Default)]
pub struct RecordingSinks {
    pub primary: Mutex<Vec<String>>,
    pub screen: Mutex<Vec<String>>,
    pub detach_count: AtomicUsize,
}

impl RecordingSinks {
    pub fn primary_ids(&self) -> Vec<String> {
        self.primary.lock().unwrap().clone()
    }

    pub fn screen_ids(&self) -> Vec<String> {
        self.screen.lock().unwrap().clone()
    }

    pub fn detaches(&self) -> usize {
        self.detach_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSinks for RecordingSinks {
    async fn attach_primary_track(&self, track: Arc<TrackRemote>) {
        self.primary.lock().unwrap().push(track.id());
    }

    async fn attach_screen_share_track(&self, track: Arc<TrackRemote>) {
        self.screen.lock().unwrap().push(track.id());
    }

    async fn detach_screen_share_track(&self) {
        self.detach_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Media source whose sample tracks stay accessible, so tests can push
/// frames through the negotiated link and watch them land on the viewer.
pub struct ScriptedMediaSource {
    audio: Arc<TrackLocalStaticSample>,
    video: Arc<TrackLocalStaticSample>,
    screen: Arc<TrackLocalStaticSample>,
}

impl ScriptedMediaSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            audio: Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    clock_rate: 48000,
                    channels: 2,
                    ..Default::default()
                },
                "camera-audio".to_owned(),
                "streamcast".to_owned(),
            )),
            video: Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    clock_rate: 90000,
                    ..Default::default()
                },
                "camera-video".to_owned(),
                "streamcast".to_owned(),
            )),
            screen: Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    clock_rate: 90000,
                    ..Default::default()
                },
                "screen-video".to_owned(),
                "streamcast".to_owned(),
            )),
        })
    }

    /// Write one sample to every track. Unbound tracks (screen before the
    /// share starts) swallow the write.
    pub async fn pump(&self) {
        for track in [&self.audio, &self.video, &self.screen] {
            let _ = track
                .write_sample(&Sample {
                    data: vec![0u8; 16].into(),
                    duration: Duration::from_millis(20),
                    ..Default::default()
                })
                .await;
        }
    }
}

#[async_trait]
impl MediaSource for ScriptedMediaSource {
    async fn primary_tracks(
        &self,
    ) -> Result<Vec<Arc<dyn TrackLocal + Send + Sync>>, SessionError> {
        Ok(vec![self.audio.clone(), self.video.clone()])
    }

    async fn screen_track(&self) -> Result<Arc<dyn TrackLocal + Send + Sync>, SessionError> {
        Ok(self.screen.clone())
    }
}

/// Recording hook that counts teardown notifications.
#[derive(Default)]
pub struct CountingRecording {
    notifications: AtomicUsize,
}

impl CountingRecording {
    pub fn count(&self) -> usize {
        self.notifications.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordingHook for CountingRecording {
    async fn notify_stream_ending(&self, _stream_id: &StreamId) {
        self.notifications.fetch_add(1, Ordering::SeqCst);
    }
}
