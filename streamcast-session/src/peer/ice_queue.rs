use std::collections::VecDeque;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;

/// Buffers remote ICE candidates until the peer link has a remote
/// description, then hands them out in arrival order.
///
/// Candidates and descriptions race on the relay: an `ice` envelope may
/// arrive before the offer/answer it belongs to has been applied. Until
/// `flush()` runs, `offer` buffers; afterwards the queue is a pass-through.
/// The caller applies returned candidates and logs-and-drops any that fail,
/// so one malformed candidate never stalls the ones behind it.
#[derive(Default)]
pub struct IceCandidateQueue {
    pending: VecDeque<RTCIceCandidateInit>,
    primed: bool,
}

impl IceCandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand in a remote candidate. Returns it back when it can be applied
    /// right away; `None` means it was buffered.
    pub fn offer(&mut self, candidate: RTCIceCandidateInit) -> Option<RTCIceCandidateInit> {
        if self.primed {
            Some(candidate)
        } else {
            self.pending.push_back(candidate);
            None
        }
    }

    /// Drain the buffer in FIFO order. Called exactly once, right after the
    /// remote description transitions from unset to set; later calls on an
    /// already-primed queue return nothing.
    pub fn flush(&mut self) -> Vec<RTCIceCandidateInit> {
        self.primed = true;
        self.pending.drain(..).collect()
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
