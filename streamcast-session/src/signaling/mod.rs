mod memory_relay;
mod sink;

pub use memory_relay::{MemoryRelay, MemoryRelaySink};
pub use sink::SignalingSink;
