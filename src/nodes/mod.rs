//! Built-in audio nodes.
//!
//! ## Sources ([`source`])
//! - [`Oscillator`] - sine tone for one ear
//! - [`LoopPlayer`] - decoded clip played in an endless loop
//!
//! ## Effects ([`effect`])
//! - [`StereoPanner`] - equal-power placement in the stereo field
//! - [`Gain`] - volume stage with a short anti-click ramp
//! - [`Mixer`] - summing bus
//!
//! ## Sinks ([`sink`])
//! - [`CpalSink`] - system audio device (requires `cpal_sink`)
//! - [`RtrbSink`] - ring buffer capture

pub mod source;
pub mod effect;
pub mod sink;

pub use source::{LoopPlayer, Oscillator, OscillatorMessage};
pub use effect::{Gain, GainMessage, Mixer, StereoPanner};
pub use sink::RtrbSink;

#[cfg(feature = "cpal_sink")]
pub use sink::CpalSink;
