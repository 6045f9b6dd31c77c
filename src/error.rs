//! Error types.

use thiserror::Error;

/// The audio engine could not be brought up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No usable audio output. Playback controls should be disabled.
    #[error("audio playback is not supported here: {0}")]
    UnsupportedPlatform(String),
}

/// Rejections from [`Session::load_file`](crate::Session::load_file).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("file is too large ({size} bytes), please upload a file smaller than {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// An uploaded clip could not be turned into audio.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unrecognised audio container: {0}")]
    Probe(#[source] symphonia::core::errors::Error),

    #[error("audio decoding failed: {0}")]
    Codec(#[source] symphonia::core::errors::Error),

    #[error("file contains no decodable audio track")]
    NoTrack,

    #[error("audio track does not declare a sample rate")]
    UnknownSampleRate,

    #[error("channel count changed mid-stream from {expected} to {found}")]
    ChannelsChanged { expected: usize, found: usize },

    #[error("audio track decoded to zero frames")]
    Empty,

    #[error("decode was cancelled")]
    Cancelled,

    #[error("decode worker exited without a result")]
    WorkerLost,
}
