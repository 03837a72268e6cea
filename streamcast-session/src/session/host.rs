use crate::media::MediaSource;
use crate::peer::{IceCandidateQueue, PeerEvent, PeerLink, RtcConfig};
use crate::session::command::ScreenShareOutcome;
use crate::session::event::SessionEvent;
use crate::signaling::SignalingSink;
use std::collections::VecDeque;
use std::sync::Arc;
use streamcast_core::{SessionError, SignalEnvelope};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HostState {
    Idle,
    Offering,
    WaitingAnswer,
    Stable,
    Renegotiating,
    Closed,
}

/// A renegotiation request that arrived while another negotiation was in
/// flight; replayed once the link is stable again.
enum QueuedRenegotiation {
    StartScreenShare,
    StopScreenShare,
    IceRestart,
}

/// Offer side of the negotiation. Creates the peer link on the first
/// viewer `ready`, drives the initial offer and every renegotiation offer
/// over that same link, and applies remote answers.
pub(crate) struct HostNegotiator {
    state: HostState,
    link: Option<PeerLink>,
    queue: IceCandidateQueue,
    media: Arc<dyn MediaSource>,
    screen_sender: Option<Arc<RTCRtpSender>>,
    pending: VecDeque<QueuedRenegotiation>,
    ice_restart_used: bool,
    rtc: RtcConfig,
    signaling: Arc<dyn SignalingSink>,
    peer_tx: mpsc::Sender<PeerEvent>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl HostNegotiator {
    pub(crate) fn new(
        rtc: RtcConfig,
        media: Arc<dyn MediaSource>,
        signaling: Arc<dyn SignalingSink>,
        peer_tx: mpsc::Sender<PeerEvent>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            state: HostState::Idle,
            link: None,
            queue: IceCandidateQueue::new(),
            media,
            screen_sender: None,
            pending: VecDeque::new(),
            ice_restart_used: false,
            rtc,
            signaling,
            peer_tx,
            events,
        }
    }

    pub(crate) fn state(&self) -> HostState {
        self.state
    }

    /// A viewer announced itself. Creates the link (with the primary camera
    /// tracks) if this is the first viewer, then issues the offer.
    pub(crate) async fn on_ready(&mut self) -> Result<(), SessionError> {
        match self.state {
            HostState::Closed => return Ok(()),
            HostState::Idle | HostState::Stable => {}
            _ => {
                debug!("Viewer ready while negotiating; ignored");
                return Ok(());
            }
        }

        if self.link.is_none() {
            let link = PeerLink::connect(&self.rtc, self.peer_tx.clone()).await?;
            for track in self.media.primary_tracks().await? {
                link.add_track(track).await?;
            }
            self.link = Some(link);
        }

        info!("Viewer is ready, starting streaming");
        self.begin_offer(false).await
    }

    pub(crate) async fn on_answer(
        &mut self,
        answer: RTCSessionDescription,
    ) -> Result<(), SessionError> {
        if self.state == HostState::Closed {
            return Ok(());
        }
        let Some(link) = &self.link else {
            debug!("Answer before any offer; discarded");
            return Ok(());
        };

        match link.apply_answer(answer).await {
            Ok(true) => {
                if !self.queue.is_primed() {
                    apply_candidates(link, self.queue.flush()).await;
                }
                self.state = HostState::Stable;
                let _ = self.events.send(SessionEvent::Negotiated);
                self.run_pending().await
            }
            Ok(false) => {
                debug!("Stale answer discarded");
                Ok(())
            }
            Err(e) => {
                // A malformed answer is a signaling race, not a session error.
                error!("Failed to apply answer: {}", e);
                Ok(())
            }
        }
    }

    pub(crate) async fn on_ice(&mut self, candidate: RTCIceCandidateInit) {
        if let Some(candidate) = self.queue.offer(candidate)
            && let Some(link) = &self.link
        {
            apply_candidates(link, vec![candidate]).await;
        }
    }

    pub(crate) async fn on_ice_state(
        &mut self,
        state: RTCIceConnectionState,
    ) -> Result<(), SessionError> {
        match state {
            RTCIceConnectionState::Failed => {
                if self.state == HostState::Closed {
                    return Ok(());
                }
                if self.ice_restart_used {
                    return Err(SessionError::IceFailed);
                }
                self.ice_restart_used = true;
                if self.state != HostState::Stable {
                    // A negotiation is in flight; the restart offer waits
                    // for it rather than interleaving.
                    warn!("ICE connectivity failed mid-negotiation; restart deferred");
                    self.pending.push_back(QueuedRenegotiation::IceRestart);
                    return Ok(());
                }
                warn!("ICE connectivity failed; attempting one restart");
                self.begin_offer(true).await
            }
            RTCIceConnectionState::Connected | RTCIceConnectionState::Completed => {
                self.ice_restart_used = false;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Add the secondary screen track and renegotiate. A second start while
    /// one is live is a no-op; a start while another negotiation is in
    /// flight is queued, never interleaved.
    pub(crate) async fn start_screen_share(
        &mut self,
    ) -> Result<ScreenShareOutcome, SessionError> {
        if self.state == HostState::Closed {
            return Err(SessionError::Closed);
        }
        if self.screen_sender.is_some() {
            warn!("Screen sharing is already active");
            return Ok(ScreenShareOutcome::AlreadyActive);
        }
        if self.state != HostState::Stable {
            self.pending.push_back(QueuedRenegotiation::StartScreenShare);
            return Ok(ScreenShareOutcome::Queued);
        }
        let Some(link) = &self.link else {
            self.pending.push_back(QueuedRenegotiation::StartScreenShare);
            return Ok(ScreenShareOutcome::Queued);
        };

        // Capture failure is fatal for this request only; the stable link
        // stays up.
        let track = self.media.screen_track().await?;
        let sender = link.add_track(track).await?;
        self.screen_sender = Some(sender);

        if let Err(e) = self.signaling.send(SignalEnvelope::ScreenSharing(true)).await {
            warn!("Could not announce screen sharing: {}", e);
        }

        self.state = HostState::Renegotiating;
        self.begin_offer(false).await?;
        let _ = self.events.send(SessionEvent::ScreenShare(true));
        Ok(ScreenShareOutcome::Started)
    }

    /// Drop the screen track and renegotiate. Exactly one renegotiation
    /// offer per removal.
    pub(crate) async fn stop_screen_share(
        &mut self,
    ) -> Result<ScreenShareOutcome, SessionError> {
        if self.state == HostState::Closed {
            return Err(SessionError::Closed);
        }
        if self.screen_sender.is_none() {
            warn!("No active screen sharing to stop");
            return Ok(ScreenShareOutcome::NotActive);
        }
        if self.state != HostState::Stable {
            self.pending.push_back(QueuedRenegotiation::StopScreenShare);
            return Ok(ScreenShareOutcome::Queued);
        }

        let Some(link) = &self.link else {
            self.screen_sender = None;
            return Ok(ScreenShareOutcome::NotActive);
        };
        if let Some(sender) = self.screen_sender.take() {
            link.remove_track(&sender).await?;
        }

        if let Err(e) = self.signaling.send(SignalEnvelope::ScreenSharing(false)).await {
            warn!("Could not announce end of screen sharing: {}", e);
        }

        self.state = HostState::Renegotiating;
        self.begin_offer(false).await?;
        let _ = self.events.send(SessionEvent::ScreenShare(false));
        Ok(ScreenShareOutcome::Stopped)
    }

    pub(crate) fn is_screen_sharing(&self) -> bool {
        self.screen_sender.is_some()
    }

    pub(crate) async fn close(&mut self) {
        self.state = HostState::Closed;
        self.pending.clear();
        if let Some(link) = self.link.take()
            && let Err(e) = link.close().await
        {
            debug!("Error closing peer link: {}", e);
        }
    }

    async fn begin_offer(&mut self, ice_restart: bool) -> Result<(), SessionError> {
        let Some(link) = &self.link else {
            debug!("No link to offer over; ignored");
            return Ok(());
        };
        self.state = HostState::Offering;

        let offer = link.create_offer(ice_restart).await?;
        self.signaling.send(SignalEnvelope::Offer(offer)).await?;

        self.state = HostState::WaitingAnswer;
        Ok(())
    }

    async fn run_pending(&mut self) -> Result<(), SessionError> {
        let Some(request) = self.pending.pop_front() else {
            return Ok(());
        };
        let outcome = match request {
            QueuedRenegotiation::StartScreenShare => self.start_screen_share().await,
            QueuedRenegotiation::StopScreenShare => self.stop_screen_share().await,
            QueuedRenegotiation::IceRestart => {
                warn!("Issuing the deferred ICE restart");
                return self.begin_offer(true).await;
            }
        };
        match outcome {
            Ok(outcome) => {
                debug!("Replayed queued renegotiation: {:?}", outcome);
                Ok(())
            }
            // Media failure on a replayed request has no caller to report
            // to; it is logged and the link stays up.
            Err(SessionError::MediaAcquisition(reason)) => {
                error!("Queued screen share failed: {}", reason);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

async fn apply_candidates(link: &PeerLink, candidates: Vec<RTCIceCandidateInit>) {
    for candidate in candidates {
        if let Err(e) = link.add_ice_candidate(candidate).await {
            // Dropped, never rethrown: one bad candidate must not stall
            // the ones queued behind it.
            warn!("Failed to add ICE candidate: {}", e);
        }
    }
}
