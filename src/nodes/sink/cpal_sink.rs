//! CPAL audio output sink

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, SupportedStreamConfig};
use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, Producer, RingBuffer};
use std::sync::mpsc;
use tracing::{error, warn};

use super::interleave;
use crate::error::EngineError;
use crate::node::{AudioNode, ProcessContext};

/// A sink that outputs audio to a CPAL device
///
/// The CPAL stream lives on its own thread; this node feeds interleaved
/// samples into a ring buffer that the stream callback drains. A mono
/// device gets both ears averaged together.
pub struct CpalSink {
    buffer: Producer<f32>,
    channels: usize,
}

impl CpalSink {
    /// Open an output stream on `device` and return the node feeding it.
    ///
    /// Fails with [`EngineError::UnsupportedPlatform`] if the stream cannot be
    /// built or started.
    pub fn new(device: &cpal::Device, config: &SupportedStreamConfig) -> Result<Self, EngineError> {
        let channels = config.channels() as usize;
        let sample_format = config.sample_format();
        let stream_config = config.config();
        let sample_rate = stream_config.sample_rate.0;

        // ~100ms of audio to ride out scheduling jitter
        let buffer_samples = ((sample_rate as f32 * 0.1) as usize) * channels;
        let buffer_size = buffer_samples.next_power_of_two().max(8192);
        let (producer, consumer) = RingBuffer::<f32>::new(buffer_size);

        // cpal streams are not Send everywhere, so the stream is built and
        // parked on a dedicated thread for the rest of the program.
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), String>>(1);
        let device = device.clone();
        std::thread::Builder::new()
            .name("schwebung-output".into())
            .spawn(move || {
                let stream = match build_stream(&device, sample_format, &stream_config, consumer) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
                let _ = ready_tx.send(Ok(()));
                loop {
                    std::thread::park();
                }
            })
            .map_err(|e| EngineError::UnsupportedPlatform(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => {
                error!(%reason, "failed to start output stream");
                return Err(EngineError::UnsupportedPlatform(reason));
            }
            Err(_) => {
                return Err(EngineError::UnsupportedPlatform("output thread exited".into()));
            }
        }

        Ok(Self {
            buffer: producer,
            channels,
        })
    }
}

fn build_stream(
    device: &cpal::Device,
    sample_format: SampleFormat,
    stream_config: &cpal::StreamConfig,
    consumer: Consumer<f32>,
) -> Result<cpal::Stream, String> {
    match sample_format {
        SampleFormat::F32 => build_typed::<f32>(device, stream_config, consumer),
        SampleFormat::I16 => build_typed::<i16>(device, stream_config, consumer),
        SampleFormat::U16 => build_typed::<u16>(device, stream_config, consumer),
        other => Err(format!("unsupported sample format {other:?}")),
    }
}

fn build_typed<T: SizedSample + FromSample<f32>>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    mut consumer: Consumer<f32>,
) -> Result<cpal::Stream, String> {
    device
        .build_output_stream(
            stream_config,
            move |data: &mut [T], _| {
                // Underruns play silence until the graph catches up
                for sample in data.iter_mut() {
                    let s = consumer.pop().unwrap_or(0.0);
                    *sample = T::from_sample(s.clamp(-1.0, 1.0));
                }
            },
            |err| warn!(?err, "output stream error"),
            None,
        )
        .map_err(|e| e.to_string())
}

impl AudioNode for CpalSink {
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

        // Generating faster than the device drains: skip rather than tear
        let Ok(chunk) = self.buffer.write_chunk_uninit(first.len() * self.channels) else {
            return;
        };
        chunk.fill_from_iter(interleave(buffers, self.channels));
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}
