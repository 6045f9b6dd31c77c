//! Session defaults and limits.

/// Largest clip accepted for the loop bed: 7 MiB.
pub const MAX_UPLOAD_BYTES: usize = 7 * 1024 * 1024;

/// Defaults a [`Session`](crate::Session) starts from and resets to.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub left_frequency_hz: f64,
    pub right_frequency_hz: f64,
    pub volume: f32,
    pub loop_volume: f32,
    /// Clips larger than this are rejected before decoding
    pub max_upload_bytes: usize,
    /// Time constant of the gain ramp applied to volume changes, 0 = instant
    pub volume_ramp_ms: f32,
    /// Value handed to the share action
    pub share_url: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            left_frequency_hz: 220.0,
            right_frequency_hz: 210.0,
            volume: 0.5,
            loop_volume: 0.3,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            volume_ramp_ms: 5.0,
            share_url: None,
        }
    }
}

impl SessionConfig {
    pub fn with_frequencies(mut self, left_hz: f64, right_hz: f64) -> Self {
        self.left_frequency_hz = left_hz;
        self.right_frequency_hz = right_hz;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn with_loop_volume(mut self, volume: f32) -> Self {
        self.loop_volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_volume_ramp_ms(mut self, ms: f32) -> Self {
        self.volume_ramp_ms = ms.max(0.0);
        self
    }

    pub fn with_share_url(mut self, url: impl Into<String>) -> Self {
        self.share_url = Some(url.into());
        self
    }
}
