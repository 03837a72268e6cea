use tracing::debug;

/// Mid of the reserved screen-share transceiver slot: the third m-line, after
/// the camera audio ("0") and camera video ("1") negotiated at stream start.
pub const SCREEN_SHARE_MID: &str = "2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

impl From<webrtc::rtp_transceiver::rtp_codec::RTPCodecType> for TrackKind {
    fn from(codec_type: webrtc::rtp_transceiver::rtp_codec::RTPCodecType) -> Self {
        match codec_type {
            webrtc::rtp_transceiver::rtp_codec::RTPCodecType::Audio => Self::Audio,
            _ => Self::Video,
        }
    }
}

/// Where an inbound track belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    Primary,
    ScreenShare,
    /// Already attached somewhere, or no free sink; the caller drops it.
    Ignored,
}

/// Disambiguates inbound tracks on one peer link: camera audio/video go to
/// the primary sink, the screen-share video to its own sink.
///
/// Tracks surface asynchronously and in no particular order. Routing is
/// `mid`-first (the reserved slot is authoritative); when the transceiver
/// mid is not available yet, video falls back to "primary if empty, else
/// screen share", which is what the occupancy of a camera-first session
/// implies. The router also guards the sink invariants: a track id is never
/// attached to both sinks, and re-routing an already-attached id is a no-op.
#[derive(Default)]
pub struct TrackRouter {
    primary_audio: Option<String>,
    primary_video: Option<String>,
    screen: Option<String>,
}

impl TrackRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&mut self, id: &str, kind: TrackKind, mid: Option<&str>) -> RouteTarget {
        if self.is_attached(id) {
            debug!("Track {} already routed; ignoring duplicate", id);
            return RouteTarget::Ignored;
        }

        if mid == Some(SCREEN_SHARE_MID) {
            return self.claim_screen(id);
        }

        match kind {
            TrackKind::Audio => {
                if self.primary_audio.is_some() {
                    return RouteTarget::Ignored;
                }
                self.primary_audio = Some(id.to_owned());
                RouteTarget::Primary
            }
            TrackKind::Video => {
                if self.primary_video.is_none() {
                    self.primary_video = Some(id.to_owned());
                    RouteTarget::Primary
                } else {
                    self.claim_screen(id)
                }
            }
        }
    }

    fn claim_screen(&mut self, id: &str) -> RouteTarget {
        if self.screen.is_some() {
            return RouteTarget::Ignored;
        }
        self.screen = Some(id.to_owned());
        RouteTarget::ScreenShare
    }

    /// Forget the screen-share slot so the next renegotiation can fill it
    /// again. Returns the detached track id, if any.
    pub fn detach_screen_share(&mut self) -> Option<String> {
        self.screen.take()
    }

    pub fn screen_track_id(&self) -> Option<&str> {
        self.screen.as_deref()
    }

    pub fn primary_video_id(&self) -> Option<&str> {
        self.primary_video.as_deref()
    }

    fn is_attached(&self, id: &str) -> bool {
        [&self.primary_audio, &self.primary_video, &self.screen]
            .into_iter()
            .any(|slot| slot.as_deref() == Some(id))
    }
}
