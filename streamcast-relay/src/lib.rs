//! WebSocket relay for stream signaling. Participants of a stream connect to
//! `/ws/stream/{stream_id}`; every text frame a participant sends is parsed
//! as a signal envelope and fanned out verbatim to the other participants of
//! that stream. The relay never interprets the negotiation, it only groups
//! and forwards.

mod service;
mod ws_handler;

pub use service::RelayService;
pub use ws_handler::router;
