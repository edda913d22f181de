//! Morse code audio synthesis.
//!
//! Text goes in one end, a pulsed sine wave comes out the other: the code
//! table spells each character in dots and dashes, the timing model converts
//! a character/overall speed pair into sample counts, and the sequencer
//! plays the resulting tone and silence fragments into an output sink. Sinks
//! cover the default audio device (blocking or double-buffered writes) and
//! self-contained WAV files.
//!
//! The `morse` binary wires these together behind a command line; the `koch`
//! binary builds a trainer on top, generating drills from the [`trainer`]
//! progression, playing them through a spawned synthesizer, and scoring the
//! transcription.
//!
//! # Examples
//!
//! Render a message into a WAV file:
//!
//! ```no_run
//! use morsel::{CODE_TABLE, OutputTarget, Timing, ToneBuffer, render, sink};
//!
//! fn main() -> morsel::Result<()> {
//!     Timing::validate_speeds(18, 12)?;
//!     let mut out = sink::open(&OutputTarget::File("cq.wav".into()))?;
//!     let timing = Timing::configure(out.sample_rate(), 18, 12)?;
//!     let tones = ToneBuffer::build(750, &timing)?;
//!     render("CQ CQ DX", CODE_TABLE, &timing, &tones, out.as_mut())?;
//!     Ok(())
//! }
//! ```

pub mod code;
pub mod error;
pub mod sequencer;
pub mod sink;
pub mod timing;
pub mod tone;
pub mod trainer;

pub use code::{CODE_TABLE, CodeEntry, lookup};
pub use error::{Error, Result};
pub use sequencer::render;
pub use sink::{OutputTarget, PcmSink, REQUESTED_SAMPLE_RATE};
pub use timing::Timing;
pub use tone::{RAMP_SAMPLES, ToneBuffer};
