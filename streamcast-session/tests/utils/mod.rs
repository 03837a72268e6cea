pub mod harness;
pub mod media;

pub use harness::*;
pub use media::*;
