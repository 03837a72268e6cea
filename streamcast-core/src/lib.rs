pub mod model;

pub use model::{IceServerConfig, Role, SessionError, SignalEnvelope, SignalingError, StreamId};
