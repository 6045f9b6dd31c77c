//! Looping clip player.

use alloc::vec::Vec;
use dasp_graph::{Buffer, Input};
use crate::node::{AudioNode, ProcessContext};

/// Plays a decoded clip from the start, wrapping back to frame zero forever.
///
/// Samples are interleaved and must already be at the graph's sample rate.
/// Output channels beyond the clip's channel count repeat the clip's
/// channels, so a mono clip lands in both ears.
pub struct LoopPlayer {
    samples: Vec<f32>,
    channels: usize,
    position: usize,
}

impl LoopPlayer {
    pub fn new(samples: Vec<f32>, channels: usize) -> Self {
        let channels = channels.max(1);
        let mut samples = samples;
        // Drop a trailing partial frame so the wrap stays frame aligned
        samples.truncate(samples.len() - samples.len() % channels);
        Self {
            samples,
            channels,
            position: 0,
        }
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Current frame within the clip.
    #[inline]
    pub fn position(&self) -> usize {
        self.position / self.channels
    }
}

impl AudioNode for LoopPlayer {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        if self.samples.is_empty() {
            for buffer in outputs.iter_mut() {
                buffer.iter_mut().for_each(|s| *s = 0.0);
            }
            return;
        }

        let Some(buffer_len) = outputs.first().map(|b| b.len()) else {
            return;
        };
        let src_channels = self.channels;

        for i in 0..buffer_len {
            if self.position >= self.samples.len() {
                self.position = 0;
            }
            let frame = &self.samples[self.position..self.position + src_channels];
            for (ch, buffer) in outputs.iter_mut().enumerate() {
                buffer[i] = frame[ch % src_channels];
            }
            self.position += src_channels;
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 0 }

    #[inline]
    fn num_outputs(&self) -> usize { 2 }
}
