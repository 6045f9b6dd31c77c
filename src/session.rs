//! Session state machine and the view model handed back to the UI.

use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::engine::Engine;
use crate::error::{EngineError, LoadError};
use crate::handle::EngineHandle;
use crate::link::{sanitize, VolumeLink, VolumeUpdate};
use crate::looper::{LoopEvent, LoopGraph};
use crate::tone::{Ear, ToneGraph};

/// Everything the session knows about what the user asked for.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSession {
    /// True exactly while both oscillators are in the graph
    pub playing: bool,
    pub left_frequency_hz: f64,
    pub right_frequency_hz: f64,
    pub left_volume: f32,
    pub right_volume: f32,
    pub loop_volume: f32,
    pub volumes_linked: bool,
}

impl AudioSession {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            playing: false,
            left_frequency_hz: config.left_frequency_hz,
            right_frequency_hz: config.right_frequency_hz,
            left_volume: config.volume,
            right_volume: config.volume,
            loop_volume: config.loop_volume,
            volumes_linked: false,
        }
    }

    /// The beat frequency, `|left - right|`.
    pub fn frequency_difference(&self) -> f64 {
        (self.left_frequency_hz - self.right_frequency_hz).abs()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Status {
    Ready,
    Playing { left_hz: f64, right_hz: f64 },
    Stopped,
}

/// What the UI should display after an operation.
#[derive(Clone, Debug, PartialEq)]
pub struct View {
    pub status: String,
    /// e.g. `"10 Hz"`
    pub difference: String,
    pub play_visible: bool,
    pub stop_visible: bool,
    pub left_volume: f32,
    pub right_volume: f32,
    pub loop_volume: f32,
    pub volumes_linked: bool,
    /// False once the platform turned out to have no audio output
    pub controls_enabled: bool,
}

/// Owns the session state, the engine and both graphs.
///
/// Every UI event maps onto one method. Methods never panic on bad input;
/// they default it, clamp it, or return an error to show the user.
pub struct Session {
    config: SessionConfig,
    state: AudioSession,
    link: VolumeLink,
    engine: EngineHandle,
    tone: ToneGraph,
    looper: LoopGraph,
    status: Status,
    /// Shown difference; zeroed on stop until a frequency changes
    difference_hz: f64,
}

impl Session {
    pub fn new(config: SessionConfig, engine: EngineHandle) -> Self {
        let state = AudioSession::from_config(&config);
        Self {
            link: VolumeLink::new(state.left_volume, state.right_volume),
            tone: ToneGraph::new(config.volume_ramp_ms),
            looper: LoopGraph::new(state.loop_volume, config.volume_ramp_ms, config.max_upload_bytes),
            status: Status::Ready,
            difference_hz: state.frequency_difference(),
            engine,
            state,
            config,
        }
    }

    /// A session playing through the default output device.
    pub fn with_default_output(config: SessionConfig) -> Self {
        Self::new(config, EngineHandle::default_output())
    }

    pub fn state(&self) -> &AudioSession {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    /// Start the binaural tone at the current frequencies.
    ///
    /// A no-op while already playing. Fails only if there is no audio
    /// output, in which case the returned error should be shown and the
    /// play controls disabled.
    pub fn play(&mut self) -> Result<View, EngineError> {
        if self.state.playing {
            return Ok(self.view());
        }

        let engine = self.engine.get()?;
        let (left_hz, right_hz) = (self.state.left_frequency_hz, self.state.right_frequency_hz);
        self.tone.start(
            engine,
            left_hz as f32,
            right_hz as f32,
            self.state.left_volume,
            self.state.right_volume,
        );

        self.state.playing = true;
        self.status = Status::Playing { left_hz, right_hz };
        self.difference_hz = self.state.frequency_difference();
        info!(left_hz, right_hz, "session playing");
        Ok(self.view())
    }

    /// Take both frequency fields as typed, then [`play`](Self::play).
    pub fn play_with(&mut self, left_input: &str, right_input: &str) -> Result<View, EngineError> {
        if !self.state.playing {
            self.state.left_frequency_hz = parse_frequency(left_input, self.config.left_frequency_hz);
            self.state.right_frequency_hz = parse_frequency(right_input, self.config.right_frequency_hz);
        }
        self.play()
    }

    /// Stop the tone and the loop bed. A no-op while stopped.
    pub fn stop(&mut self) -> View {
        if !self.state.playing {
            return self.view();
        }

        self.silence();
        self.state.playing = false;
        self.status = Status::Stopped;
        self.difference_hz = 0.0;
        info!("session stopped");
        self.view()
    }

    /// Back to defaults from any state, tone and loop silenced.
    pub fn reset(&mut self) -> View {
        self.silence();
        self.state = AudioSession::from_config(&self.config);
        self.link = VolumeLink::new(self.state.left_volume, self.state.right_volume);
        self.looper.set_volume(self.state.loop_volume);
        self.status = Status::Ready;
        self.difference_hz = self.state.frequency_difference();
        info!("session reset");
        self.view()
    }

    fn silence(&mut self) {
        if let Some(engine) = self.engine.get_if_started() {
            self.tone.stop(engine);
            self.looper.stop(engine);
        }
    }

    /// Frequency field edit. Unparseable input falls back to the default.
    pub fn set_left_frequency(&mut self, input: &str) -> View {
        let hz = parse_frequency(input, self.config.left_frequency_hz);
        self.state.left_frequency_hz = hz;
        self.retune(Ear::Left, hz)
    }

    pub fn set_right_frequency(&mut self, input: &str) -> View {
        let hz = parse_frequency(input, self.config.right_frequency_hz);
        self.state.right_frequency_hz = hz;
        self.retune(Ear::Right, hz)
    }

    fn retune(&mut self, ear: Ear, hz: f64) -> View {
        self.difference_hz = self.state.frequency_difference();
        if self.state.playing {
            self.tone.set_frequency(ear, hz as f32);
            self.status = Status::Playing {
                left_hz: self.state.left_frequency_hz,
                right_hz: self.state.right_frequency_hz,
            };
        }
        self.view()
    }

    pub fn set_left_volume(&mut self, value: f32) -> View {
        let update = self.link.on_left_volume_changed(value);
        self.apply_volumes(update)
    }

    pub fn set_right_volume(&mut self, value: f32) -> View {
        let update = self.link.on_right_volume_changed(value);
        self.apply_volumes(update)
    }

    pub fn set_volumes_linked(&mut self, linked: bool) -> View {
        self.state.volumes_linked = linked;
        let update = self.link.set_linked(linked);
        self.apply_volumes(update)
    }

    fn apply_volumes(&mut self, update: VolumeUpdate) -> View {
        if let Some(left) = update.left {
            self.tone.set_volume(Ear::Left, left);
        }
        if let Some(right) = update.right {
            self.tone.set_volume(Ear::Right, right);
        }
        self.state.left_volume = self.link.left();
        self.state.right_volume = self.link.right();
        self.view()
    }

    pub fn set_loop_volume(&mut self, value: f32) -> View {
        if let Some(value) = sanitize(value) {
            self.state.loop_volume = value;
            self.looper.set_volume(value);
        }
        self.view()
    }

    /// Hand an uploaded clip to the loop bed.
    ///
    /// Files over the size limit are refused with
    /// [`LoadError::FileTooLarge`] before anything is decoded. Otherwise the
    /// decode runs in the background and its outcome arrives via
    /// [`poll`](Self::poll). Returns the request's generation.
    pub fn load_file(&mut self, bytes: Vec<u8>) -> Result<u64, LoadError> {
        // Before the engine, so an oversized file never opens the device
        self.looper.check_size(bytes.len())?;
        let engine = self.engine.get()?;
        self.looper.load(engine, bytes)
    }

    /// Apply decodes that finished since the last call.
    pub fn poll(&mut self) -> Vec<LoopEvent> {
        match self.engine.get_if_started() {
            Some(engine) => self.looper.poll(engine),
            None => Vec::new(),
        }
    }

    /// Render one block. Does nothing until the engine has been started.
    pub fn process(&mut self) {
        if let Some(engine) = self.engine.get_if_started() {
            engine.process();
        }
    }

    /// The engine, if playback or a load has started it.
    pub fn engine(&mut self) -> Option<&mut Engine> {
        self.engine.get_if_started()
    }

    pub fn tone(&self) -> &ToneGraph {
        &self.tone
    }

    pub fn looper(&self) -> &LoopGraph {
        &self.looper
    }

    /// The page address offered by the share action.
    pub fn share_url(&self) -> Option<&str> {
        self.config.share_url.as_deref()
    }

    pub fn view(&self) -> View {
        let status = match self.status {
            Status::Ready => "Ready to play binaural beats.".to_string(),
            Status::Playing { left_hz, right_hz } => {
                format!("Playing: Left - {left_hz} Hz, Right - {right_hz} Hz")
            }
            Status::Stopped => "Binaural beats stopped.".to_string(),
        };

        View {
            status,
            difference: format!("{} Hz", self.difference_hz),
            play_visible: !self.state.playing,
            stop_visible: self.state.playing,
            left_volume: self.state.left_volume,
            right_volume: self.state.right_volume,
            loop_volume: self.state.loop_volume,
            volumes_linked: self.state.volumes_linked,
            controls_enabled: !self.engine.is_unsupported(),
        }
    }
}

/// Positive, finite frequency from a text field, or `default`.
pub fn parse_frequency(input: &str, default: f64) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(hz) if hz.is_finite() && hz > 0.0 => hz,
        _ => {
            warn!(input, default, "invalid frequency, using default");
            default
        }
    }
}
