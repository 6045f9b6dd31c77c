//! Summing bus

use dasp_graph::{Buffer, Input};
use crate::node::{AudioNode, ProcessContext};

/// Sums any number of inputs into `channels` outputs.
///
/// Mono inputs are copied to every output channel. Inputs with more channels
/// than the bus have the extra channels ignored.
pub struct Mixer {
    channels: usize,
}

impl Mixer {
    pub fn new(channels: usize) -> Self {
        Self { channels: channels.max(1) }
    }
}

impl AudioNode for Mixer {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = Self::Message>,
        inputs: &[Input],
        output: &mut [Buffer],
    ) {
        for buf in output.iter_mut() {
            buf.iter_mut().for_each(|s| *s = 0.0);
        }

        for input in inputs {
            let in_buffers = input.buffers();
            let Some(last) = in_buffers.len().checked_sub(1) else {
                continue;
            };

            for (out_ch, out_buf) in output.iter_mut().enumerate() {
                let in_buf = &in_buffers[out_ch.min(last)];
                for (out_sample, in_sample) in out_buf.iter_mut().zip(in_buf.iter()) {
                    *out_sample += *in_sample;
                }
            }
        }
    }

    fn num_inputs(&self) -> usize {
        usize::MAX
    }

    fn num_outputs(&self) -> usize {
        self.channels
    }
}
