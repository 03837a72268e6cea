mod ice_queue;
mod peer_link;
mod track_router;

pub use ice_queue::IceCandidateQueue;
pub use peer_link::{PeerEvent, PeerLink, RemoteTrackInfo, RtcConfig};
pub use track_router::{RouteTarget, TrackKind, TrackRouter};
