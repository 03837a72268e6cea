pub use streamcast_core::model::{Role, SignalEnvelope, StreamId};

pub mod model {
    pub use streamcast_core::model::*;
}

#[cfg(feature = "session")]
pub mod session {
    pub use streamcast_session::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use streamcast_relay::*;
}
