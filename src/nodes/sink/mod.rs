//! Audio sink nodes (consumers with no audio outputs)

use dasp_graph::Buffer;

#[cfg(feature = "cpal_sink")]
mod cpal_sink;
mod rtrb_sink;

#[cfg(feature = "cpal_sink")]
pub use cpal_sink::CpalSink;
pub use rtrb_sink::RtrbSink;

/// Interleave one block of bus channels into `out_channels` per frame.
///
/// A mono destination gets the average of left and right so neither ear's
/// tone is lost. Extra destination channels repeat the last bus channel.
pub(crate) fn interleave(buffers: &[Buffer], out_channels: usize) -> impl Iterator<Item = f32> + '_ {
    let last = buffers.len().saturating_sub(1);
    let frames = buffers.first().map_or(0, |b| b.len());
    let downmix = out_channels == 1 && buffers.len() >= 2;

    (0..frames).flat_map(move |i| {
        (0..out_channels).map(move |ch| {
            if downmix {
                (buffers[0][i] + buffers[1][i]) * 0.5
            } else {
                buffers[ch.min(last)][i]
            }
        })
    })
}
