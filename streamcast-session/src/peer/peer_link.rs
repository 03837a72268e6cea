use crate::peer::TrackKind;
use std::sync::Arc;
use streamcast_core::IceServerConfig;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::offer_answer_options::RTCOfferOptions;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::signaling_state::RTCSignalingState;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

type Result<T> = std::result::Result<T, webrtc::Error>;

#[derive(Clone)]
pub struct RtcConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// Gather loopback host candidates too. Off for real deployments;
    /// lets two links in the same process reach each other.
    pub include_loopback_candidates: bool,
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::default()],
            include_loopback_candidates: false,
        }
    }
}

/// An inbound track together with the identifiers the router needs.
pub struct RemoteTrackInfo {
    pub id: String,
    pub kind: TrackKind,
    pub mid: Option<String>,
    pub track: Arc<TrackRemote>,
}

/// Connection callbacks, forwarded into the session event loop so that all
/// negotiation work happens on one task.
pub enum PeerEvent {
    LocalCandidate(RTCIceCandidateInit),
    IceState(RTCIceConnectionState),
    Track(RemoteTrackInfo),
}

/// The negotiated media connection of one session. At most one per
/// (host, viewer) pair; renegotiation mutates it in place, it is never
/// replaced mid-session.
pub struct PeerLink {
    pub(crate) pc: Arc<RTCPeerConnection>,
}

impl PeerLink {
    /// Build the peer connection and wire its callbacks into `event_tx`.
    pub async fn connect(config: &RtcConfig, event_tx: mpsc::Sender<PeerEvent>) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let mut setting_engine = SettingEngine::default();
        if config.include_loopback_candidates {
            setting_engine.set_include_loopback_candidate(true);
        }

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .with_setting_engine(setting_engine)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|s| RTCIceServer {
                    urls: s.urls.clone(),
                    username: s.username.clone().unwrap_or_default(),
                    credential: s.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let pc = Arc::new(api.new_peer_connection(rtc_config).await?);

        let ice_tx = event_tx.clone();
        pc.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx.send(PeerEvent::LocalCandidate(init)).await;
            })
        }));

        let state_tx = event_tx.clone();
        pc.on_ice_connection_state_change(Box::new(move |s: RTCIceConnectionState| {
            let tx = state_tx.clone();
            Box::pin(async move {
                info!("ICE connection state changed: {}", s);
                let _ = tx.send(PeerEvent::IceState(s)).await;
            })
        }));

        let track_tx = event_tx;
        pc.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                Box::pin(async move {
                    let info = RemoteTrackInfo {
                        id: track.id(),
                        kind: TrackKind::from(track.kind()),
                        mid: transceiver.mid().map(|m| m.to_string()),
                        track,
                    };
                    debug!("Inbound track {} (mid {:?})", info.id, info.mid);
                    let _ = tx.send(PeerEvent::Track(info)).await;
                })
            },
        ));

        Ok(Self { pc })
    }

    pub async fn add_track(
        &self,
        track: Arc<dyn TrackLocal + Send + Sync>,
    ) -> Result<Arc<RTCRtpSender>> {
        self.pc.add_track(track).await
    }

    pub async fn remove_track(&self, sender: &Arc<RTCRtpSender>) -> Result<()> {
        self.pc.remove_track(sender).await
    }

    /// Create an offer and install it as the local description. With
    /// `ice_restart` the offer carries fresh ICE credentials.
    pub async fn create_offer(&self, ice_restart: bool) -> Result<RTCSessionDescription> {
        let options = ice_restart.then(|| RTCOfferOptions {
            ice_restart: true,
            ..Default::default()
        });
        let offer = self.pc.create_offer(options).await?;
        self.pc.set_local_description(offer.clone()).await?;
        Ok(offer)
    }

    /// Apply a remote answer. Returns `false` without touching the link when
    /// no local offer is pending: such an answer is stale or duplicated and
    /// is discarded, not an error.
    pub async fn apply_answer(&self, answer: RTCSessionDescription) -> Result<bool> {
        if self.pc.signaling_state() != RTCSignalingState::HaveLocalOffer {
            debug!(
                "Discarding answer in signaling state {}",
                self.pc.signaling_state()
            );
            return Ok(false);
        }
        self.pc.set_remote_description(answer).await?;
        Ok(true)
    }

    /// Apply a remote offer and produce the local answer for it.
    pub async fn apply_offer(
        &self,
        offer: RTCSessionDescription,
    ) -> Result<RTCSessionDescription> {
        self.pc.set_remote_description(offer).await?;
        let answer = self.pc.create_answer(None).await?;
        self.pc.set_local_description(answer.clone()).await?;
        Ok(answer)
    }

    pub async fn add_ice_candidate(&self, candidate: RTCIceCandidateInit) -> Result<()> {
        self.pc.add_ice_candidate(candidate).await
    }

    pub fn signaling_state(&self) -> RTCSignalingState {
        self.pc.signaling_state()
    }

    pub async fn close(&self) -> Result<()> {
        self.pc.close().await
    }
}
