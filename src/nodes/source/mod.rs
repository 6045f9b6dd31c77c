//! Audio source nodes (generators with no audio inputs)

mod oscillator;
mod loop_player;

pub use oscillator::{Oscillator, OscillatorMessage};
pub use loop_player::LoopPlayer;
