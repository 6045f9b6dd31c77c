//! Clip decoding for the loop bed.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::error::DecodeError;

/// Interleaved audio at a known sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: u32,
}

impl Clip {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Linear-interpolation resample, channel by channel.
    pub fn resampled(self, target_rate: u32) -> Clip {
        if self.sample_rate == target_rate || self.samples.is_empty() {
            return Clip { sample_rate: target_rate, ..self };
        }

        let channels = self.channels;
        let in_frames = self.frames();
        let ratio = self.sample_rate as f64 / target_rate as f64;
        let out_frames = ((in_frames as f64) / ratio).round() as usize;

        let mut samples = Vec::with_capacity(out_frames * channels);
        for i in 0..out_frames {
            let pos = i as f64 * ratio;
            let idx = (pos.floor() as usize).min(in_frames - 1);
            let next = (idx + 1).min(in_frames - 1);
            let frac = (pos - idx as f64) as f32;
            for ch in 0..channels {
                let x0 = self.samples[idx * channels + ch];
                let x1 = self.samples[next * channels + ch];
                samples.push(x0 + frac * (x1 - x0));
            }
        }

        Clip { samples, channels, sample_rate: target_rate }
    }
}

/// Decode a complete in-memory audio file.
///
/// `cancel` is checked between packets; once raised the decode gives up with
/// [`DecodeError::Cancelled`].
pub fn decode(bytes: Vec<u8>, cancel: &AtomicBool) -> Result<Clip, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
    let probed = symphonia::default::get_probe()
        .format(&Hint::new(), mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(DecodeError::Probe)?;
    let mut format = probed.format;

    let track = format.default_track().ok_or(DecodeError::NoTrack)?;
    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.ok_or(DecodeError::UnknownSampleRate)?;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(DecodeError::Codec)?;

    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut channels = 0;
    let mut samples = Vec::new();

    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(DecodeError::Cancelled);
        }

        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(_)) => break,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(DecodeError::Codec(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // A corrupt packet is skipped, the rest of the stream may be fine
            Err(SymphoniaError::DecodeError(reason)) => {
                warn!(reason, "skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(DecodeError::Codec(e)),
        };

        let spec = *decoded.spec();
        lock_channels(&mut channels, spec.channels.count())?;
        let needed = decoded.capacity() * channels;
        if sample_buf.as_ref().is_some_and(|buf| buf.capacity() < needed) {
            sample_buf = None;
        }
        let buf = sample_buf
            .get_or_insert_with(|| SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    if samples.is_empty() || channels == 0 {
        return Err(DecodeError::Empty);
    }

    let clip = Clip { samples, channels, sample_rate };
    debug!(channels, sample_rate, secs = clip.duration_secs(), "clip decoded");
    Ok(clip)
}

/// The first packet fixes the layout; later packets must match it or the
/// interleaved clip would be garbled.
fn lock_channels(channels: &mut usize, found: usize) -> Result<(), DecodeError> {
    match *channels {
        0 => {
            *channels = found;
            Ok(())
        }
        expected if expected == found => Ok(()),
        expected => Err(DecodeError::ChannelsChanged { expected, found }),
    }
}
