//! Gain stage

use dasp_graph::{Buffer, Input};
use crate::node::{AudioNode, ProcessContext};

/// Messages to control gain
#[derive(Clone, Copy, Debug)]
pub enum GainMessage {
    /// Set the target gain (1.0 = unity, 0.0 = silence)
    SetGain(f32),
}

/// Scales a stereo (or upmixed mono) input by one shared gain.
///
/// Gain changes glide towards the new target with a one-pole ramp so slider
/// moves do not click. The stage starts at its initial value, no fade-in.
pub struct Gain {
    gain: f32,
    smoothed_gain: f32,
    /// 0.0 = instant, closer to 1.0 = slower
    smooth_coeff: f32,
}

impl Gain {
    pub fn new(gain: f32) -> Self {
        Self {
            gain,
            smoothed_gain: gain,
            smooth_coeff: 0.995, // ~4ms time constant at 48kHz
        }
    }

    /// Ramp time constant in milliseconds. Zero disables smoothing.
    pub fn with_smoothing_ms(mut self, ms: f32, sample_rate: u32) -> Self {
        let samples = (ms / 1000.0) * sample_rate as f32;
        self.smooth_coeff = if samples > 0.0 { (-1.0 / samples).exp() } else { 0.0 };
        self
    }

    pub fn without_smoothing(mut self) -> Self {
        self.smooth_coeff = 0.0;
        self
    }

    /// Target gain
    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }
}

impl AudioNode for Gain {
    type Message = GainMessage;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = GainMessage>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                GainMessage::SetGain(g) => self.gain = g,
            }
        }

        let in_buffers = inputs.first().map(|input| input.buffers()).unwrap_or(&[]);
        let Some(last_in) = in_buffers.last() else {
            for buffer in outputs.iter_mut() {
                buffer.iter_mut().for_each(|s| *s = 0.0);
            }
            return;
        };

        let smooth_coeff = self.smooth_coeff;
        let target_gain = self.gain;
        let start_gain = self.smoothed_gain;
        let mut end_gain = start_gain;

        for (ch, out_buffer) in outputs.iter_mut().enumerate() {
            let in_buffer = in_buffers.get(ch).unwrap_or(last_in);

            // Every channel walks the same ramp
            let mut gain = start_gain;
            for (out_sample, &in_sample) in out_buffer.iter_mut().zip(in_buffer.iter()) {
                gain = target_gain + smooth_coeff * (gain - target_gain);
                *out_sample = in_sample * gain;
            }
            end_gain = gain;
        }

        self.smoothed_gain = end_gain;
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 2 }
}
