//! Output device discovery.

use alloc::string::{String, ToString};

#[cfg(feature = "cpal_sink")]
use cpal::traits::{DeviceTrait, HostTrait};
use tracing::info;

use crate::error::EngineError;

/// The audio output the engine renders to.
pub struct OutputDevice {
    #[cfg(feature = "cpal_sink")]
    device: cpal::Device,
    #[cfg(feature = "cpal_sink")]
    config: cpal::SupportedStreamConfig,

    name: String,
    sample_rate: u32,
    channels: u16,
}

impl OutputDevice {
    /// The host's default output device.
    #[cfg(feature = "cpal_sink")]
    pub fn default_output() -> Result<Self, EngineError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            EngineError::UnsupportedPlatform(format!("{:?} host has no output device", host.id()))
        })?;
        let config = device
            .default_output_config()
            .map_err(|e| EngineError::UnsupportedPlatform(e.to_string()))?;
        let name = device.name().unwrap_or_else(|_| "Unknown".into());

        info!(device = %name, sample_rate = config.sample_rate().0, channels = config.channels(), "output device selected");

        Ok(Self {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
            name,
            device,
            config,
        })
    }

    /// Without device support there is nothing to play through.
    #[cfg(not(feature = "cpal_sink"))]
    pub fn default_output() -> Result<Self, EngineError> {
        info!("built without the cpal_sink feature, no output device");
        Err(EngineError::UnsupportedPlatform(
            "built without audio device support".to_string(),
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Open a stream on this device and return the sink node feeding it.
    #[cfg(feature = "cpal_sink")]
    pub fn create_sink(&self) -> Result<crate::nodes::CpalSink, EngineError> {
        crate::nodes::CpalSink::new(&self.device, &self.config)
    }
}
