mod command;
mod event;
mod host;
mod manager;
mod session;
mod viewer;

pub use command::{ScreenShareOutcome, SessionHandle};
pub use event::SessionEvent;
pub use manager::SessionManager;
pub use session::{SessionConfig, StreamSession};

pub(crate) use command::SessionCommand;
pub(crate) use host::HostNegotiator;
pub(crate) use viewer::ViewerNegotiator;
