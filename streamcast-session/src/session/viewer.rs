use crate::media::MediaSinks;
use crate::peer::{
    IceCandidateQueue, PeerEvent, PeerLink, RemoteTrackInfo, RouteTarget, RtcConfig, TrackRouter,
};
use crate::session::event::SessionEvent;
use crate::signaling::SignalingSink;
use std::sync::Arc;
use streamcast_core::{SessionError, SignalEnvelope};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ViewerState {
    Idle,
    Answering,
    Stable,
    Closed,
}

/// Answer side of the negotiation. Never initiates offers: waits for the
/// host's, answers over one reused link, and feeds remote candidates through
/// the queue whatever state the negotiation is in.
pub(crate) struct ViewerNegotiator {
    state: ViewerState,
    link: Option<PeerLink>,
    queue: IceCandidateQueue,
    router: TrackRouter,
    sinks: Arc<dyn MediaSinks>,
    rtc: RtcConfig,
    signaling: Arc<dyn SignalingSink>,
    peer_tx: mpsc::Sender<PeerEvent>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl ViewerNegotiator {
    pub(crate) fn new(
        rtc: RtcConfig,
        sinks: Arc<dyn MediaSinks>,
        signaling: Arc<dyn SignalingSink>,
        peer_tx: mpsc::Sender<PeerEvent>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            state: ViewerState::Idle,
            link: None,
            queue: IceCandidateQueue::new(),
            router: TrackRouter::new(),
            sinks,
            rtc,
            signaling,
            peer_tx,
            events,
        }
    }

    pub(crate) fn state(&self) -> ViewerState {
        self.state
    }

    /// The first offer creates the link; later ones are renegotiations over
    /// the same link. Buffered ICE state survives renegotiation untouched.
    pub(crate) async fn on_offer(
        &mut self,
        offer: RTCSessionDescription,
    ) -> Result<(), SessionError> {
        if self.state == ViewerState::Closed {
            return Ok(());
        }

        if self.link.is_none() {
            self.link = Some(PeerLink::connect(&self.rtc, self.peer_tx.clone()).await?);
        }
        let Some(link) = &self.link else {
            return Ok(());
        };

        self.state = ViewerState::Answering;
        let answer = match link.apply_offer(offer).await {
            Ok(answer) => answer,
            Err(e) => {
                // Broken offers are discarded like any other signaling race.
                error!("Failed to handle offer: {}", e);
                return Ok(());
            }
        };

        if !self.queue.is_primed() {
            apply_candidates(link, self.queue.flush()).await;
        }

        self.signaling.send(SignalEnvelope::Answer(answer)).await?;
        info!("Answer sent to host");
        self.state = ViewerState::Stable;
        let _ = self.events.send(SessionEvent::Negotiated);
        Ok(())
    }

    /// Viewers never produce offers, so no answer can legitimately reach
    /// one; the relay fanned us someone else's message.
    pub(crate) fn on_answer(&self) {
        warn!("Viewer should not receive an answer; ignored");
    }

    pub(crate) async fn on_ice(&mut self, candidate: RTCIceCandidateInit) {
        if let Some(candidate) = self.queue.offer(candidate)
            && let Some(link) = &self.link
        {
            apply_candidates(link, vec![candidate]).await;
        }
    }

    pub(crate) fn on_ice_state(&self, state: RTCIceConnectionState) {
        // Recovery is offer-driven; the host owns the ICE restart.
        if state == RTCIceConnectionState::Failed {
            warn!("ICE connectivity failed; waiting for the host to restart");
        }
    }

    pub(crate) async fn on_screen_sharing(&mut self, active: bool) {
        if active {
            debug!("Host announced screen sharing; waiting for the track");
        } else if self.router.detach_screen_share().is_some() {
            self.sinks.detach_screen_share_track().await;
        }
        let _ = self.events.send(SessionEvent::ScreenShare(active));
    }

    pub(crate) async fn on_track(&mut self, info: RemoteTrackInfo) {
        match self.router.route(&info.id, info.kind, info.mid.as_deref()) {
            RouteTarget::Primary => self.sinks.attach_primary_track(info.track).await,
            RouteTarget::ScreenShare => self.sinks.attach_screen_share_track(info.track).await,
            RouteTarget::Ignored => debug!("Inbound track {} not routed", info.id),
        }
    }

    pub(crate) async fn close(&mut self) {
        self.state = ViewerState::Closed;
        if let Some(link) = self.link.take()
            && let Err(e) = link.close().await
        {
            debug!("Error closing peer link: {}", e);
        }
    }
}

async fn apply_candidates(link: &PeerLink, candidates: Vec<RTCIceCandidateInit>) {
    for candidate in candidates {
        if let Err(e) = link.add_ice_candidate(candidate).await {
            warn!("Failed to add ICE candidate: {}", e);
        }
    }
}
