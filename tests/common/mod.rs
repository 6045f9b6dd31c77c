#![allow(dead_code)]

use std::io::Cursor;
use std::thread::sleep;
use std::time::Duration;

use rtrb::{Consumer, RingBuffer};
use schwebung::nodes::RtrbSink;
use schwebung::{Engine, EngineError, EngineHandle, LoopEvent, Session, SessionConfig, BLOCK_SIZE};

pub const SAMPLE_RATE: u32 = 48_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A session rendering into a ring buffer instead of a device.
pub fn capture_session(config: SessionConfig) -> (Session, Consumer<f32>) {
    init_tracing();
    let (producer, consumer) = RingBuffer::new(BLOCK_SIZE * 2 * 512);
    let engine = EngineHandle::new(move || Ok(Engine::new(SAMPLE_RATE).with_output(RtrbSink::stereo(producer))));
    (Session::new(config, engine), consumer)
}

/// A session on a machine with no audio output.
pub fn unsupported_session() -> Session {
    init_tracing();
    Session::new(
        SessionConfig::default(),
        EngineHandle::new(|| Err(EngineError::UnsupportedPlatform("no output device".into()))),
    )
}

/// Render `blocks` and split the captured frames into (left, right).
pub fn render(session: &mut Session, out: &mut Consumer<f32>, blocks: usize) -> (Vec<f32>, Vec<f32>) {
    for _ in 0..blocks {
        session.process();
    }
    let mut left = Vec::new();
    let mut right = Vec::new();
    while let (Ok(l), Ok(r)) = (out.pop(), out.pop()) {
        left.push(l);
        right.push(r);
    }
    (left, right)
}

pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0, |m, s| m.max(s.abs()))
}

/// A 16-bit PCM WAV file holding a sine sweep.
pub fn wav_bytes(sample_rate: u32, channels: u16, frames: usize) -> Vec<u8> {
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

/// Poll until no decode is outstanding, collecting what happened.
pub fn drain_events(session: &mut Session) -> Vec<LoopEvent> {
    let mut events = Vec::new();
    for _ in 0..500 {
        events.extend(session.poll());
        if session.looper().pending() == 0 {
            return events;
        }
        sleep(Duration::from_millis(10));
    }
    panic!("decode did not finish in time");
}
