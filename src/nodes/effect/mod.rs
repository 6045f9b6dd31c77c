//! Audio effect nodes (processors with audio inputs and outputs)

mod gain;
mod mixer;
mod panner;

pub use gain::{Gain, GainMessage};
pub use mixer::Mixer;
pub use panner::StereoPanner;
