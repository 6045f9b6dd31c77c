//! The loop bed: an uploaded clip decoded off-thread and played on repeat
//! through its own gain stage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rtrb::{Consumer, RingBuffer};
use tracing::{debug, error, info, warn};

use crate::decode::{decode, Clip};
use crate::engine::{Engine, Handle};
use crate::error::{DecodeError, LoadError};
use crate::nodes::{Gain, GainMessage, LoopPlayer};

/// What a finished decode did.
#[derive(Debug)]
pub enum LoopEvent {
    /// The clip from this request is now playing.
    Started { generation: u64 },
    /// The request was current but its clip could not be decoded. Any loop
    /// already playing was left alone.
    DecodeFailed { generation: u64, error: DecodeError },
}

/// Player and gain nodes of the clip currently looping.
pub struct LoopVoice {
    player: Handle<()>,
    gain: Handle<GainMessage>,
    generation: u64,
}

impl LoopVoice {
    /// The load request this voice came from.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct PendingDecode {
    generation: u64,
    result: Consumer<Result<Clip, DecodeError>>,
    cancel: Arc<AtomicBool>,
}

/// Owns the loop voice and every decode still in flight.
///
/// Each [`load`](Self::load) gets the next generation number. A decode only
/// installs itself if nothing newer has happened since: a later load, or a
/// [`stop`](Self::stop), makes it stale and it is thrown away on arrival.
pub struct LoopGraph {
    voice: Option<LoopVoice>,
    pending: Vec<PendingDecode>,
    generation: u64,
    volume: f32,
    ramp_ms: f32,
    max_bytes: usize,
}

impl LoopGraph {
    pub fn new(volume: f32, ramp_ms: f32, max_bytes: usize) -> Self {
        Self {
            voice: None,
            pending: Vec::new(),
            generation: 0,
            volume,
            ramp_ms,
            max_bytes,
        }
    }

    /// Start decoding `bytes` on a worker thread.
    ///
    /// Oversized input is refused before any decoding starts. The current
    /// loop keeps playing until the new clip is ready; completion is picked
    /// up by [`poll`](Self::poll).
    pub fn load(&mut self, engine: &Engine, bytes: Vec<u8>) -> Result<u64, LoadError> {
        self.check_size(bytes.len())?;

        self.cancel_pending();
        self.generation += 1;
        let generation = self.generation;

        let (mut producer, result) = RingBuffer::new(1);
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = cancel.clone();
        let target_rate = engine.sample_rate();
        let size = bytes.len();

        let spawned = std::thread::Builder::new()
            .name(format!("schwebung-decode-{generation}"))
            .spawn(move || {
                let decoded = decode(bytes, &worker_cancel).map(|clip| clip.resampled(target_rate));
                // The consumer is gone if the graph was dropped, nothing to report to
                let _ = producer.push(decoded);
            });
        if let Err(e) = spawned {
            // The dropped closure abandons the queue, poll reports it
            error!(error = %e, "could not start decode worker");
        }

        info!(generation, size, "clip decode started");
        self.pending.push(PendingDecode { generation, result, cancel });
        Ok(generation)
    }

    /// Refuse uploads over the size limit. The limit itself is allowed.
    pub fn check_size(&self, size: usize) -> Result<(), LoadError> {
        if size > self.max_bytes {
            warn!(size, limit = self.max_bytes, "clip rejected, too large");
            return Err(LoadError::FileTooLarge { size, limit: self.max_bytes });
        }
        Ok(())
    }

    /// Apply finished decodes. Call from the control thread.
    pub fn poll(&mut self, engine: &mut Engine) -> Vec<LoopEvent> {
        let mut events = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());

        for mut pending in self.pending.drain(..) {
            let outcome = match pending.result.pop() {
                Ok(outcome) => outcome,
                // Re-check after seeing the worker gone, it may have pushed just before exiting
                Err(_) if pending.result.is_abandoned() => {
                    pending.result.pop().unwrap_or(Err(DecodeError::WorkerLost))
                }
                Err(_) => {
                    still_pending.push(pending);
                    continue;
                }
            };

            if pending.generation != self.generation {
                debug!(generation = pending.generation, current = self.generation, "discarding stale decode");
                continue;
            }

            match outcome {
                Ok(clip) => {
                    let generation = pending.generation;
                    install(&mut self.voice, engine, clip, generation, self.volume, self.ramp_ms);
                    events.push(LoopEvent::Started { generation });
                }
                Err(error) => {
                    error!(generation = pending.generation, %error, "error decoding audio data");
                    events.push(LoopEvent::DecodeFailed {
                        generation: pending.generation,
                        error,
                    });
                }
            }
        }

        self.pending = still_pending;
        events
    }

    /// Set the loop gain, remembered for clips loaded later.
    pub fn set_volume(&mut self, value: f32) {
        self.volume = value;
        if let Some(voice) = self.voice.as_mut() {
            if voice.gain.send(GainMessage::SetGain(value)).is_err() {
                warn!("loop gain queue full, volume change dropped");
            }
        }
    }

    /// Stop the loop and invalidate every decode still in flight.
    ///
    /// Safe to call when nothing is playing.
    pub fn stop(&mut self, engine: &mut Engine) {
        self.cancel_pending();
        self.generation += 1;
        if let Some(voice) = self.voice.take() {
            engine.remove(voice.player);
            engine.remove(voice.gain);
            info!(generation = voice.generation, "loop stopped");
        }
    }

    fn cancel_pending(&self) {
        for pending in &self.pending {
            pending.cancel.store(true, Ordering::Relaxed);
        }
    }

    pub fn voice(&self) -> Option<&LoopVoice> {
        self.voice.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.voice.is_some()
    }

    /// Decodes that have not reported back yet, stale ones included.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Generation of the most recent request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

fn install(slot: &mut Option<LoopVoice>, engine: &mut Engine, clip: Clip, generation: u64, volume: f32, ramp_ms: f32) {
    if let Some(old) = slot.take() {
        engine.remove(old.player);
        engine.remove(old.gain);
        debug!(generation = old.generation, "previous loop replaced");
    }

    let player = engine.add(LoopPlayer::new(clip.samples, clip.channels));
    let gain = engine.add(Gain::new(volume).with_smoothing_ms(ramp_ms, engine.sample_rate()));
    engine.connect(&player, &gain);
    engine.output(&gain);

    info!(generation, "loop started");
    *slot = Some(LoopVoice { player, gain, generation });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::BLOCK_SIZE;
    use crate::nodes::RtrbSink;
    use std::io::Cursor;
    use std::time::Duration;

    fn wav_bytes(sample_rate: u32, channels: u16, frames: usize) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames {
            let s = ((i as f32 * 0.05).sin() * 16_000.0) as i16;
            for _ in 0..channels {
                writer.write_sample(s).unwrap();
            }
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    fn capture_engine() -> (Engine, rtrb::Consumer<f32>) {
        let (producer, consumer) = RingBuffer::new(BLOCK_SIZE * 2 * 256);
        (Engine::new(48_000).with_output(RtrbSink::stereo(producer)), consumer)
    }

    /// Poll until every outstanding decode has reported back
    fn drain(looper: &mut LoopGraph, engine: &mut Engine) -> Vec<LoopEvent> {
        let mut events = Vec::new();
        for _ in 0..500 {
            events.extend(looper.poll(engine));
            if looper.pending() == 0 {
                return events;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("decode did not finish");
    }

    #[test]
    fn size_limit_is_inclusive() {
        let (engine, _out) = capture_engine();
        let mut looper = LoopGraph::new(0.3, 0.0, 16);

        let err = looper.load(&engine, vec![0; 17]).unwrap_err();
        assert!(matches!(err, LoadError::FileTooLarge { size: 17, limit: 16 }));
        assert_eq!(looper.pending(), 0);
        assert_eq!(looper.generation(), 0);

        assert_eq!(looper.load(&engine, vec![0; 16]).unwrap(), 1);
    }

    #[test]
    fn decoded_clip_loops_through_its_gain() {
        let (mut engine, mut out) = capture_engine();
        let mut looper = LoopGraph::new(0.3, 0.0, usize::MAX);

        let generation = looper.load(&engine, wav_bytes(44_100, 1, 4_410)).unwrap();
        let events = drain(&mut looper, &mut engine);
        assert!(matches!(events.as_slice(), [LoopEvent::Started { generation: g }] if *g == generation));

        // 0.1s clip, render ~0.27s so it has to wrap
        for _ in 0..200 {
            engine.process();
        }
        let mut peak = 0.0f32;
        while let Ok(s) = out.pop() {
            peak = peak.max(s.abs());
        }
        assert!(peak > 0.1 && peak < 0.31, "peak {peak}");
    }

    #[test]
    fn newer_load_supersedes_older() {
        let (mut engine, _out) = capture_engine();
        let mut looper = LoopGraph::new(0.3, 0.0, usize::MAX);

        looper.load(&engine, wav_bytes(48_000, 2, 2_000)).unwrap();
        let second = looper.load(&engine, wav_bytes(48_000, 2, 1_000)).unwrap();
        let events = drain(&mut looper, &mut engine);

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], LoopEvent::Started { generation } if generation == second));
        assert_eq!(looper.voice().map(LoopVoice::generation), Some(second));
    }

    #[test]
    fn stop_discards_decode_in_flight() {
        let (mut engine, _out) = capture_engine();
        let baseline = engine.node_count();
        let mut looper = LoopGraph::new(0.3, 0.0, usize::MAX);

        looper.load(&engine, wav_bytes(48_000, 1, 48_000)).unwrap();
        looper.stop(&mut engine);
        let events = drain(&mut looper, &mut engine);

        assert!(events.is_empty());
        assert!(!looper.is_playing());
        assert_eq!(engine.node_count(), baseline);
    }

    #[test]
    fn failed_decode_keeps_current_loop() {
        let (mut engine, _out) = capture_engine();
        let mut looper = LoopGraph::new(0.3, 0.0, usize::MAX);

        let first = looper.load(&engine, wav_bytes(48_000, 1, 1_000)).unwrap();
        drain(&mut looper, &mut engine);
        let nodes = engine.node_count();

        let second = looper.load(&engine, b"definitely not audio".to_vec()).unwrap();
        let events = drain(&mut looper, &mut engine);

        assert!(matches!(events.as_slice(), [LoopEvent::DecodeFailed { generation, .. }] if *generation == second));
        assert_eq!(looper.voice().map(LoopVoice::generation), Some(first));
        assert_eq!(engine.node_count(), nodes);
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut engine, _out) = capture_engine();
        let mut looper = LoopGraph::new(0.3, 0.0, usize::MAX);
        looper.stop(&mut engine);
        looper.stop(&mut engine);
        assert!(!looper.is_playing());
    }
}
