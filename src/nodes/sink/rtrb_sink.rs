//! Ring buffer sink for headless rendering and capture

use dasp_graph::{Buffer, Input};
use rtrb::Producer;
use tracing::warn;

use super::interleave;
use crate::node::{AudioNode, ProcessContext};

/// Writes interleaved frames into an rtrb ring buffer.
///
/// Used when there is no device to play through: offline rendering, or
/// capturing the mix in tests. A block that does not fit is dropped whole.
pub struct RtrbSink {
    producer: Producer<f32>,
    channels: usize,
    dropped_blocks: u64,
}

impl RtrbSink {
    pub fn new(producer: Producer<f32>, channels: usize) -> Self {
        Self {
            producer,
            channels: channels.max(1),
            dropped_blocks: 0,
        }
    }

    pub fn stereo(producer: Producer<f32>) -> Self {
        Self::new(producer, 2)
    }
}

impl AudioNode for RtrbSink {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        _outputs: &mut [Buffer],
    ) {
        let Some(buffers) = inputs.first().map(|input| input.buffers()) else {
            return;
        };
        let Some(first) = buffers.first() else {
            return;
        };

        let Ok(chunk) = self.producer.write_chunk_uninit(first.len() * self.channels) else {
            self.dropped_blocks += 1;
            if self.dropped_blocks == 1 {
                warn!("capture buffer full, dropping blocks");
            }
            return;
        };
        chunk.fill_from_iter(interleave(buffers, self.channels));
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}
