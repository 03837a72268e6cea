use streamcast_core::SessionError;

/// Lifecycle notifications emitted by a running session.
#[derive(Debug)]
pub enum SessionEvent {
    /// An offer/answer exchange completed; the link is stable. Emitted for
    /// the initial negotiation and for every renegotiation.
    Negotiated,
    /// Screen sharing started or stopped on this link.
    ScreenShare(bool),
    /// A session-fatal condition. Emitted at most once, before teardown;
    /// `Ended` is not emitted afterwards.
    Fatal(SessionError),
    /// Normal teardown finished (explicit stop or relay closure).
    Ended,
}
