mod error;
mod signaling;
mod stream;

pub use error::{SessionError, SignalingError};
pub use signaling::{IceServerConfig, SignalEnvelope};
pub use stream::{Role, StreamId};
