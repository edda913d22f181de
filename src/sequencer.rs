//! Sequencer: turns text into the timed tone and silence writes of a
//! render session.
//!
//! The unit grammar is fixed: a dot is one element of tone, a dash three;
//! one element of silence separates the symbols inside a character; three
//! spacing units separate characters and seven separate words, with seven
//! more after the final character so back-to-back renders stay legible.

use tracing::debug;

use crate::code::{self, CodeEntry};
use crate::error::Result;
use crate::sink::PcmSink;
use crate::timing::Timing;
use crate::tone::{RAMP_SAMPLES, ToneBuffer};

struct Session<'a> {
    timing: &'a Timing,
    tones: &'a ToneBuffer,
    sink: &'a mut dyn PcmSink,
    scratch: Vec<i16>,
    units: u64,
}

impl Session<'_> {
    /// Play `units` elements of tone followed by the one-element gap that
    /// trails every symbol. The onset and release ramps are applied to a
    /// scratch copy so the shared sine stays pristine.
    fn tone(&mut self, units: usize) -> Result<()> {
        let element = self.timing.element_samples();
        let len = units * element;
        self.scratch.clear();
        self.scratch.extend_from_slice(&self.tones.signal()[..len]);
        for i in 0..RAMP_SAMPLES {
            let tail = len - RAMP_SAMPLES + i;
            self.scratch[i] =
                (i32::from(self.scratch[i]) * i as i32 / RAMP_SAMPLES as i32) as i16;
            self.scratch[tail] = (i32::from(self.scratch[tail])
                * (RAMP_SAMPLES - i - 1) as i32
                / RAMP_SAMPLES as i32) as i16;
        }
        self.sink.write(&self.scratch)?;
        self.sink.write(&self.tones.silence()[..element])?;
        self.units += units as u64 + 1;
        Ok(())
    }

    /// Play `units` spacing units of silence, one write each.
    fn pause(&mut self, units: usize) -> Result<()> {
        for _ in 0..units {
            self.sink.write(self.tones.silence())?;
        }
        self.units += units as u64;
        Ok(())
    }
}

/// Render `text` as a pulsed tone sequence into `sink`.
///
/// Spaces become seven-unit word gaps; characters found in `table` become
/// their dot/dash tones with three spacing units after each character;
/// anything unmapped is skipped without consuming time. The whole text is
/// followed by a seven-unit gap and one flush. Returns the elementary units
/// of audio written, counting tone units at character speed and spacing
/// units at overall speed as one each.
pub fn render(
    text: &str,
    table: &[CodeEntry],
    timing: &Timing,
    tones: &ToneBuffer,
    sink: &mut dyn PcmSink,
) -> Result<u64> {
    let mut session = Session {
        timing,
        tones,
        sink,
        scratch: Vec::with_capacity(3 * timing.element_samples()),
        units: 0,
    };
    for ch in text.chars() {
        if ch == ' ' {
            session.pause(7)?;
        } else if let Some(symbols) = code::lookup_in(table, ch) {
            for symbol in symbols.chars() {
                match symbol {
                    '.' => session.tone(1)?,
                    _ => session.tone(3)?,
                }
            }
            session.pause(3)?;
        }
    }
    session.pause(7)?;
    session.sink.flush()?;
    debug!("rendered {:?} in {} units", text, session.units);
    Ok(session.units)
}
