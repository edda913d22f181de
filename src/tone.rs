//! Pre-rendered tone and silence fragments.

use std::f64::consts::PI;

use crate::error::{Error, Result};
use crate::timing::Timing;

/// Samples of linear onset and release ramp applied to every played tone.
pub const RAMP_SAMPLES: usize = 100;

/// Peak amplitude of the generated sine, well inside the i16 range.
const PEAK_AMPLITUDE: f64 = 16_000.0;

/// Immutable audio fragments shared by one synthesis session.
///
/// `signal` holds a continuous sine long enough for the longest tone (a
/// three-unit dash at character speed); `silence` holds one spacing unit of
/// zeros. Playback never mutates these buffers: the onset and release ramps
/// are applied to a scratch copy, so the same fragment can shape every tone
/// of the session.
pub struct ToneBuffer {
    signal: Vec<i16>,
    silence: Vec<i16>,
}

impl ToneBuffer {
    /// Render the session fragments for `freq_hz` against `timing`.
    ///
    /// The frequency must be nonzero and below the Nyquist limit of the
    /// sample rate. The element must be long enough to carry both ramps
    /// without them overlapping; at 22050 Hz that admits any character speed
    /// up to 132 WPM.
    pub fn build(freq_hz: u32, timing: &Timing) -> Result<Self> {
        let sample_rate = timing.sample_rate();
        if freq_hz == 0 || u64::from(freq_hz) * 2 >= u64::from(sample_rate) {
            return Err(Error::InvalidFrequency {
                freq_hz,
                sample_rate,
            });
        }
        let element = timing.element_samples();
        if element < 2 * RAMP_SAMPLES {
            return Err(Error::InvalidSpeed(format!(
                "character speed leaves {element} samples per element, too short for \
                 the {RAMP_SAMPLES}-sample ramps"
            )));
        }

        let step = f64::from(freq_hz) * 2.0 * PI / f64::from(sample_rate);
        let signal = (0..3 * element)
            .map(|i| (PEAK_AMPLITUDE * (step * i as f64).sin()) as i16)
            .collect();
        let silence = vec![0i16; timing.spacing_samples()];
        Ok(Self { signal, silence })
    }

    /// The continuous sine, three elements long.
    pub fn signal(&self) -> &[i16] {
        &self.signal
    }

    /// One spacing unit of zeros. The first `element_samples` of it also
    /// serve as the intra-character gap, since spacing is never shorter.
    pub fn silence(&self) -> &[i16] {
        &self.silence
    }
}
