//! Output sinks: where synthesized samples go.
//!
//! A render session drives exactly one sink, chosen up front from
//! [`OutputTarget`]. All sinks accept the same mono signed 16-bit stream and
//! own their device or file handle exclusively until dropped.

mod device;
mod pool;
mod wav;

pub use device::{BlockingDevice, DoubleBufferedDevice};
pub use wav::WavSink;

use std::path::PathBuf;

use crate::error::Result;

/// Sample rate requested from devices and written to file containers, in Hz.
pub const REQUESTED_SAMPLE_RATE: u32 = 22_050;

/// Destination for synthesized PCM samples.
///
/// `write` consumes the whole slice, blocking on backpressure; samples from
/// consecutive writes are emitted strictly in order. `flush` returns once
/// everything written so far is durably out: played through the device, or
/// sized correctly in the file. Abandoning a session is done by dropping the
/// sink; there is no cancellation of an in-progress `write`.
pub trait PcmSink {
    /// Output rate in Hz, fixed for the sink's lifetime.
    fn sample_rate(&self) -> u32;

    /// Emit `samples` after everything written before them.
    fn write(&mut self, samples: &[i16]) -> Result<()>;

    /// Settle all previous writes. Writing may continue afterwards.
    fn flush(&mut self) -> Result<()>;
}

/// Where a synthesis session sends its audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// The default output device, written synchronously.
    Blocking,
    /// The default output device behind the fixed buffer pool.
    DoubleBuffered,
    /// A self-contained WAV file at this path.
    File(PathBuf),
}

/// Open the sink for `target`.
///
/// Speed and frequency parameters should be validated before calling this;
/// opening a device or creating a file is the expensive, visible step.
pub fn open(target: &OutputTarget) -> Result<Box<dyn PcmSink>> {
    match target {
        OutputTarget::Blocking => Ok(Box::new(BlockingDevice::open()?)),
        OutputTarget::DoubleBuffered => Ok(Box::new(DoubleBufferedDevice::open()?)),
        OutputTarget::File(path) => Ok(Box::new(WavSink::create(path, REQUESTED_SAMPLE_RATE)?)),
    }
}
