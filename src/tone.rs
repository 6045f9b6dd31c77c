//! The binaural pair: one oscillator per ear, each hard panned into its own
//! gain stage.

use tracing::{debug, info, warn};

use crate::engine::{Engine, Handle};
use crate::nodes::{Gain, GainMessage, Oscillator, OscillatorMessage, StereoPanner};

/// Which ear a control applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ear {
    Left,
    Right,
}

impl Ear {
    /// Pan position the ear's tone is placed at.
    pub fn pan(self) -> f32 {
        match self {
            Ear::Left => -1.0,
            Ear::Right => 1.0,
        }
    }
}

/// The nodes carrying one ear's tone: oscillator → panner → gain → output.
pub struct EarVoice {
    oscillator: Handle<OscillatorMessage>,
    panner: Handle<()>,
    gain: Handle<GainMessage>,
}

impl EarVoice {
    fn build(engine: &mut Engine, ear: Ear, frequency_hz: f32, volume: f32, ramp_ms: f32) -> Self {
        let oscillator = engine.add(Oscillator::new(frequency_hz));
        let panner = engine.add(StereoPanner::new(ear.pan()));
        let gain = engine.add(Gain::new(volume).with_smoothing_ms(ramp_ms, engine.sample_rate()));

        engine.connect(&oscillator, &panner);
        engine.connect(&panner, &gain);
        engine.output(&gain);

        Self { oscillator, panner, gain }
    }

    fn teardown(self, engine: &mut Engine) {
        engine.remove(self.oscillator);
        engine.remove(self.panner);
        engine.remove(self.gain);
    }

    fn is_live(&self, engine: &Engine) -> bool {
        engine.contains(&self.oscillator) && engine.contains(&self.gain)
    }
}

/// Both ears of a running binaural tone. Only ever built as a pair.
pub struct ToneVoice {
    left: EarVoice,
    right: EarVoice,
}

impl ToneVoice {
    fn ear_mut(&mut self, ear: Ear) -> &mut EarVoice {
        match ear {
            Ear::Left => &mut self.left,
            Ear::Right => &mut self.right,
        }
    }

    /// Whether both oscillators are still wired into `engine`.
    pub fn is_live(&self, engine: &Engine) -> bool {
        self.left.is_live(engine) && self.right.is_live(engine)
    }
}

/// Builds and tears down the binaural signal path.
pub struct ToneGraph {
    voice: Option<ToneVoice>,
    ramp_ms: f32,
}

impl ToneGraph {
    /// `ramp_ms` is the gain smoothing used for volume changes.
    pub fn new(ramp_ms: f32) -> Self {
        Self { voice: None, ramp_ms }
    }

    /// Start both tones immediately. A no-op if a voice is already running.
    pub fn start(&mut self, engine: &mut Engine, left_hz: f32, right_hz: f32, left_vol: f32, right_vol: f32) {
        if self.voice.is_some() {
            debug!("tone already running");
            return;
        }

        let left = EarVoice::build(engine, Ear::Left, left_hz, left_vol, self.ramp_ms);
        let right = EarVoice::build(engine, Ear::Right, right_hz, right_vol, self.ramp_ms);
        self.voice = Some(ToneVoice { left, right });

        info!(left_hz, right_hz, "binaural tone started");
    }

    /// Set one ear's gain. Takes effect from the next processed block.
    pub fn set_volume(&mut self, ear: Ear, value: f32) {
        if let Some(voice) = self.voice.as_mut() {
            if voice.ear_mut(ear).gain.send(GainMessage::SetGain(value)).is_err() {
                warn!(?ear, "gain queue full, volume change dropped");
            }
        }
    }

    /// Retune one ear's oscillator.
    pub fn set_frequency(&mut self, ear: Ear, hz: f32) {
        if let Some(voice) = self.voice.as_mut() {
            if voice.ear_mut(ear).oscillator.send(OscillatorMessage::SetFrequency(hz)).is_err() {
                warn!(?ear, "oscillator queue full, retune dropped");
            }
        }
    }

    /// Remove both tones from the graph. Safe to call when nothing is running.
    pub fn stop(&mut self, engine: &mut Engine) {
        if let Some(voice) = self.voice.take() {
            voice.left.teardown(engine);
            voice.right.teardown(engine);
            info!("binaural tone stopped");
        }
    }

    pub fn voice(&self) -> Option<&ToneVoice> {
        self.voice.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.voice.is_some()
    }
}
