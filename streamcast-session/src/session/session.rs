use crate::media::{MediaSinks, MediaSource, RecordingHook};
use crate::peer::{PeerEvent, RtcConfig};
use crate::session::command::{ScreenShareOutcome, SessionCommand, SessionHandle};
use crate::session::event::SessionEvent;
use crate::session::host::HostNegotiator;
use crate::session::viewer::ViewerNegotiator;
use crate::signaling::SignalingSink;
use std::sync::Arc;
use streamcast_core::{Role, SessionError, SignalEnvelope, StreamId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const PEER_EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Default)]
pub struct SessionConfig {
    pub rtc: RtcConfig,
}

enum Negotiator {
    Host(HostNegotiator),
    Viewer(ViewerNegotiator),
}

/// One participant's session for one stream: owns the peer link (through the
/// role negotiator), the signaling sink, and the single event loop that
/// serializes every negotiation step.
///
/// The loop processes exactly one command, envelope, or peer callback at a
/// time; each step runs to completion, including its outgoing sends, before
/// the next is picked up. Out-of-order envelopes are buffered (candidates)
/// or discarded (stale answers) inside the negotiators, never applied
/// concurrently.
pub struct StreamSession {
    stream_id: StreamId,
    role: Role,
    negotiator: Negotiator,
    command_rx: mpsc::Receiver<SessionCommand>,
    envelope_rx: mpsc::Receiver<SignalEnvelope>,
    peer_rx: mpsc::Receiver<PeerEvent>,
    signaling: Arc<dyn SignalingSink>,
    recording: Arc<dyn RecordingHook>,
    events: mpsc::UnboundedSender<SessionEvent>,
    tore_down: bool,
}

impl StreamSession {
    /// Build a host session. It waits for viewer `ready` envelopes and
    /// drives the offers.
    pub fn host(
        stream_id: StreamId,
        config: SessionConfig,
        signaling: Arc<dyn SignalingSink>,
        envelope_rx: mpsc::Receiver<SignalEnvelope>,
        media: Arc<dyn MediaSource>,
        recording: Arc<dyn RecordingHook>,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (peer_tx, peer_rx) = mpsc::channel(PEER_EVENT_CHANNEL_CAPACITY);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let negotiator = Negotiator::Host(HostNegotiator::new(
            config.rtc,
            media,
            signaling.clone(),
            peer_tx,
            events_tx.clone(),
        ));

        let session = Self {
            stream_id,
            role: Role::Host,
            negotiator,
            command_rx,
            envelope_rx,
            peer_rx,
            signaling,
            recording,
            events: events_tx,
            tore_down: false,
        };
        (session, SessionHandle::new(command_tx), events_rx)
    }

    /// Build a viewer session. It announces itself with `ready` and answers
    /// whatever the host offers.
    pub fn viewer(
        stream_id: StreamId,
        config: SessionConfig,
        signaling: Arc<dyn SignalingSink>,
        envelope_rx: mpsc::Receiver<SignalEnvelope>,
        sinks: Arc<dyn MediaSinks>,
        recording: Arc<dyn RecordingHook>,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (peer_tx, peer_rx) = mpsc::channel(PEER_EVENT_CHANNEL_CAPACITY);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let negotiator = Negotiator::Viewer(ViewerNegotiator::new(
            config.rtc,
            sinks,
            signaling.clone(),
            peer_tx,
            events_tx.clone(),
        ));

        let session = Self {
            stream_id,
            role: Role::Viewer,
            negotiator,
            command_rx,
            envelope_rx,
            peer_rx,
            signaling,
            recording,
            events: events_tx,
            tore_down: false,
        };
        (session, SessionHandle::new(command_tx), events_rx)
    }

    pub async fn run(mut self) {
        info!("Session loop started for {} as {}", self.stream_id, self.role);

        // A viewer announces itself as soon as its channel is up; the host
        // only listens.
        if self.role == Role::Viewer
            && let Err(e) = self.signaling.send(SignalEnvelope::Ready).await
        {
            warn!("Could not announce readiness: {}", e);
            self.teardown(false).await;
            return;
        }

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        None | Some(SessionCommand::Stop) => {
                            self.teardown(false).await;
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd).await,
                    }
                }

                envelope = self.envelope_rx.recv() => {
                    match envelope {
                        Some(envelope) => {
                            if let Err(e) = self.handle_envelope(envelope).await {
                                self.fail(e).await;
                                break;
                            }
                        }
                        None => {
                            warn!("Relay channel closed unexpectedly");
                            self.teardown(false).await;
                            break;
                        }
                    }
                }

                event = self.peer_rx.recv() => {
                    // The session keeps a sender alive through the link
                    // callbacks, so this arm only yields Some.
                    if let Some(event) = event
                        && let Err(e) = self.handle_peer_event(event).await
                    {
                        self.fail(e).await;
                        break;
                    }
                }
            }
        }

        info!("Session loop finished for {}", self.stream_id);
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::StartScreenShare { reply } => {
                let result = match &mut self.negotiator {
                    Negotiator::Host(host) => host.start_screen_share().await,
                    Negotiator::Viewer(_) => Ok(ScreenShareOutcome::NotHost),
                };
                let _ = reply.send(result);
            }
            SessionCommand::StopScreenShare { reply } => {
                let result = match &mut self.negotiator {
                    Negotiator::Host(host) => host.stop_screen_share().await,
                    Negotiator::Viewer(_) => Ok(ScreenShareOutcome::NotHost),
                };
                let _ = reply.send(result);
            }
            // The loop consumes Stop before dispatching here.
            SessionCommand::Stop => debug!("Stop already handled by the loop"),
        }
    }

    async fn handle_envelope(&mut self, envelope: SignalEnvelope) -> Result<(), SessionError> {
        debug!("Received {} envelope", envelope.kind());
        match &mut self.negotiator {
            Negotiator::Host(host) => match envelope {
                SignalEnvelope::Ready => host.on_ready().await,
                SignalEnvelope::Answer(answer) => host.on_answer(answer).await,
                SignalEnvelope::Ice(candidate) => {
                    host.on_ice(candidate).await;
                    Ok(())
                }
                SignalEnvelope::Offer(_) => {
                    warn!("Host should not receive an offer; ignored");
                    Ok(())
                }
                SignalEnvelope::ScreenSharing(_) => Ok(()),
            },
            Negotiator::Viewer(viewer) => match envelope {
                SignalEnvelope::Offer(offer) => viewer.on_offer(offer).await,
                SignalEnvelope::Answer(_) => {
                    viewer.on_answer();
                    Ok(())
                }
                SignalEnvelope::Ice(candidate) => {
                    viewer.on_ice(candidate).await;
                    Ok(())
                }
                SignalEnvelope::Ready => {
                    // Another viewer of the same stream; nothing for us.
                    Ok(())
                }
                SignalEnvelope::ScreenSharing(active) => {
                    viewer.on_screen_sharing(active).await;
                    Ok(())
                }
            },
        }
    }

    async fn handle_peer_event(&mut self, event: PeerEvent) -> Result<(), SessionError> {
        match event {
            PeerEvent::LocalCandidate(candidate) => {
                if let Err(e) = self.signaling.send(SignalEnvelope::Ice(candidate)).await {
                    // The envelope channel closing will end the loop; a
                    // candidate lost on the way out is not fatal by itself.
                    warn!("Could not send local candidate: {}", e);
                }
                Ok(())
            }
            PeerEvent::IceState(state) => match &mut self.negotiator {
                Negotiator::Host(host) => host.on_ice_state(state).await,
                Negotiator::Viewer(viewer) => {
                    viewer.on_ice_state(state);
                    Ok(())
                }
            },
            PeerEvent::Track(info) => {
                match &mut self.negotiator {
                    Negotiator::Viewer(viewer) => viewer.on_track(info).await,
                    Negotiator::Host(_) => debug!("Host ignores inbound track {}", info.id),
                }
                Ok(())
            }
        }
    }

    async fn fail(&mut self, error: SessionError) {
        match error {
            // Losing the relay mid-step is the same best-effort cleanup as
            // seeing its channel close; not a session fault.
            SessionError::Signaling(e) => {
                warn!("Signaling channel lost: {}", e);
                self.teardown(false).await;
            }
            e => {
                let _ = self.events.send(SessionEvent::Fatal(e));
                self.teardown(true).await;
            }
        }
    }

    async fn teardown(&mut self, fatal: bool) {
        if self.tore_down {
            return;
        }
        self.tore_down = true;

        match &mut self.negotiator {
            Negotiator::Host(host) => host.close().await,
            Negotiator::Viewer(viewer) => viewer.close().await,
        }

        self.recording.notify_stream_ending(&self.stream_id).await;

        if !fatal {
            let _ = self.events.send(SessionEvent::Ended);
        }
    }
}
