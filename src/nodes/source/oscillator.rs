//! Sine oscillator.

use dasp_graph::{Buffer, Input};
use crate::node::{AudioNode, ProcessContext};

/// Messages to control an [`Oscillator`].
#[derive(Clone, Copy, Debug)]
pub enum OscillatorMessage {
    /// Retune, in Hz. Clamped to `[0, nyquist]`.
    SetFrequency(f32),
}

/// A full-scale mono sine source that starts at phase zero. The gain stage
/// after it sets the level.
pub struct Oscillator {
    frequency: f32,
    phase: f32,
}

impl Oscillator {
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency: frequency.max(0.0),
            phase: 0.0,
        }
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

impl AudioNode for Oscillator {
    type Message = OscillatorMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = OscillatorMessage>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                OscillatorMessage::SetFrequency(f) => self.frequency = f.max(0.0),
            }
        }

        let Some((first, rest)) = outputs.split_first_mut() else {
            return;
        };

        let nyquist = ctx.sample_rate as f32 * 0.5;
        let phase_inc = self.frequency.min(nyquist) / ctx.sample_rate as f32;

        for sample in first.iter_mut() {
            *sample = (self.phase * core::f32::consts::TAU).sin();
            self.phase += phase_inc;
            // Branchless phase wrap (phase is always positive)
            self.phase -= (self.phase >= 1.0) as u32 as f32;
        }

        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(first);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 0 }

    #[inline]
    fn num_outputs(&self) -> usize { 1 }
}
