use streamcast_core::SessionError;
use tokio::sync::{mpsc, oneshot};

/// What happened to a screen-share request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenShareOutcome {
    Started,
    Stopped,
    /// Start requested while a screen track is already live: a no-op.
    AlreadyActive,
    /// Stop requested with no screen track live: a no-op.
    NotActive,
    /// Another negotiation is in flight; the request runs once the link
    /// returns to stable.
    Queued,
    /// Screen sharing is a host action; a viewer session refuses it.
    NotHost,
}

pub(crate) enum SessionCommand {
    StartScreenShare {
        reply: oneshot::Sender<Result<ScreenShareOutcome, SessionError>>,
    },
    StopScreenShare {
        reply: oneshot::Sender<Result<ScreenShareOutcome, SessionError>>,
    },
    Stop,
}

/// User-facing handle to a running session. Commands are serialized into the
/// session's event loop, so none of them ever interleaves with a negotiation
/// step in progress.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(tx: mpsc::Sender<SessionCommand>) -> Self {
        Self { tx }
    }

    pub async fn start_screen_share(&self) -> Result<ScreenShareOutcome, SessionError> {
        self.request(|reply| SessionCommand::StartScreenShare { reply })
            .await
    }

    pub async fn stop_screen_share(&self) -> Result<ScreenShareOutcome, SessionError> {
        self.request(|reply| SessionCommand::StopScreenShare { reply })
            .await
    }

    /// End the stream (host) or leave it (viewer). Idempotent; a session
    /// that is already gone is not an error.
    pub async fn stop(&self) {
        let _ = self.tx.send(SessionCommand::Stop).await;
    }

    async fn request<F>(&self, command: F) -> Result<ScreenShareOutcome, SessionError>
    where
        F: FnOnce(oneshot::Sender<Result<ScreenShareOutcome, SessionError>>) -> SessionCommand,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(command(reply_tx))
            .await
            .map_err(|_| SessionError::Closed)?;
        reply_rx.await.map_err(|_| SessionError::Closed)?
    }
}
