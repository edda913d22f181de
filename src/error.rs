//! Error taxonomy for the synthesis core.

use thiserror::Error;

/// Errors produced by the synthesis core.
///
/// Every variant is fatal for the render session that raised it: there is no
/// partial success and no retry. Sinks release their device or file handle on
/// the way out regardless of which variant propagates.
#[derive(Error, Debug)]
pub enum Error {
    /// Speed parameters are zero, inverted, or too fast to shape a tone.
    #[error("invalid speed: {0}")]
    InvalidSpeed(String),

    /// Tone frequency outside the playable range for the sample rate.
    #[error("invalid frequency: {freq_hz} Hz is not playable at {sample_rate} Hz")]
    InvalidFrequency { freq_hz: u32, sample_rate: u32 },

    /// The audio device refused the requested format, channel count, or rate.
    #[error("device configuration rejected: {0}")]
    DeviceConfig(String),

    /// A write or submit to the audio device failed mid-session.
    #[error("device I/O error: {0}")]
    DeviceIo(String),

    /// The output file could not be created, written, or patched.
    #[error("file I/O error: {0}")]
    FileIo(#[from] std::io::Error),
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
