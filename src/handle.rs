//! Lazily constructed, program-lifetime engine.

use alloc::boxed::Box;

use tracing::{error, info};

use crate::engine::Engine;
use crate::error::EngineError;

type Factory = Box<dyn FnOnce() -> Result<Engine, EngineError>>;

enum Slot {
    Pending(Factory),
    Ready(Engine),
    Unsupported(EngineError),
    // Only observable if a factory panics mid-construction
    Poisoned,
}

/// Owns the one [`Engine`] a session renders through.
///
/// Nothing is opened until the first [`get`](Self::get). A failed
/// construction is remembered and returned from every later call instead of
/// retrying.
pub struct EngineHandle {
    slot: Slot,
}

impl EngineHandle {
    /// Build the engine with `factory` on first use.
    pub fn new<F>(factory: F) -> Self
    where
        F: FnOnce() -> Result<Engine, EngineError> + 'static,
    {
        Self {
            slot: Slot::Pending(Box::new(factory)),
        }
    }

    /// The system default output device, opened on first use.
    pub fn default_output() -> Self {
        #[cfg(feature = "cpal_sink")]
        {
            Self::new(Engine::default_output)
        }
        #[cfg(not(feature = "cpal_sink"))]
        {
            Self::new(|| {
                crate::device::OutputDevice::default_output()
                    .map(|device| Engine::new(device.sample_rate()))
            })
        }
    }

    /// The engine, constructing it on the first call.
    pub fn get(&mut self) -> Result<&mut Engine, EngineError> {
        if matches!(self.slot, Slot::Pending(_)) {
            if let Slot::Pending(factory) = core::mem::replace(&mut self.slot, Slot::Poisoned) {
                self.slot = match factory() {
                    Ok(engine) => {
                        info!(sample_rate = engine.sample_rate(), "audio engine started");
                        Slot::Ready(engine)
                    }
                    Err(e) => {
                        error!(error = %e, "audio engine unavailable");
                        Slot::Unsupported(e)
                    }
                };
            }
        }

        match &mut self.slot {
            Slot::Ready(engine) => Ok(engine),
            Slot::Unsupported(e) => Err(e.clone()),
            Slot::Pending(_) | Slot::Poisoned => Err(EngineError::UnsupportedPlatform(
                "engine construction did not complete".into(),
            )),
        }
    }

    /// The engine if it has already been constructed.
    pub fn get_if_started(&mut self) -> Option<&mut Engine> {
        match &mut self.slot {
            Slot::Ready(engine) => Some(engine),
            _ => None,
        }
    }

    /// Whether construction has been attempted and failed.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.slot, Slot::Unsupported(_) | Slot::Poisoned)
    }
}
