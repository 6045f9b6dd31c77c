//! # schwebung
//!
//! A binaural beat generator. Two sine tones at slightly different
//! frequencies are hard panned to opposite ears; the brain hears the
//! difference as a slow beat. An uploaded clip can loop underneath.
//!
//! Audio runs through a small block-based graph (`dasp_graph` underneath):
//!
//! ```text
//! Oscillator(L) -> StereoPanner(-1) -> Gain --+
//! Oscillator(R) -> StereoPanner(+1) -> Gain --+--> Mixer --> sink
//! LoopPlayer ------------------------> Gain --+
//! ```
//!
//! [`Session`] is the entry point. It owns the engine and both voices and
//! answers every UI event with a [`View`] to render:
//!
//! ```
//! use schwebung::{Engine, EngineHandle, Session, SessionConfig};
//!
//! let mut session = Session::new(
//!     SessionConfig::default(),
//!     EngineHandle::new(|| Ok(Engine::new(48_000))),
//! );
//!
//! let view = session.play().unwrap();
//! assert_eq!(view.status, "Playing: Left - 220 Hz, Right - 210 Hz");
//! assert_eq!(view.difference, "10 Hz");
//!
//! // The host keeps rendering blocks, paced against the device.
//! session.process();
//!
//! let view = session.stop();
//! assert_eq!(view.status, "Binaural beats stopped.");
//! ```
//!
//! ## Features
//!
//! - `cpal_sink`: play through the system's default output device. Without
//!   it [`EngineHandle::default_output`] reports an unsupported platform and
//!   rendering needs an explicit sink such as [`nodes::RtrbSink`].

extern crate alloc;

mod node;
mod graph;
mod device;
mod engine;
mod handle;

pub mod nodes;
pub mod config;
pub mod decode;
pub mod error;
pub mod link;
pub mod looper;
pub mod session;
pub mod tone;

pub use node::{AudioNode, NodeId, ProcessContext, BLOCK_SIZE};
pub use device::OutputDevice;
pub use engine::{Engine, Handle};
pub use handle::EngineHandle;

pub use config::{SessionConfig, MAX_UPLOAD_BYTES};
pub use error::{DecodeError, EngineError, LoadError};
pub use link::{VolumeLink, VolumeUpdate};
pub use looper::{LoopEvent, LoopGraph, LoopVoice};
pub use session::{AudioSession, Session, View};
pub use tone::{Ear, ToneGraph, ToneVoice};
