//! Timing model: words per minute in, sample counts out.
//!
//! Timing follows the 50-unit reference word ("PARIS" plus its trailing
//! space): 31 units are tone and intra-character gaps, 19 units are
//! inter-character and inter-word spacing. Characters are always keyed at the
//! character speed; when the overall speed is slower, the extra time is
//! absorbed entirely by the 19 spacing units (Farnsworth spacing).

use tracing::debug;

use crate::error::{Error, Result};

/// Sample counts for one synthesis session, derived from a speed pair and a
/// sample rate.
///
/// `element_samples` is the length of one elementary unit at character speed
/// (a dot, or any gap inside a character). `spacing_samples` is the length of
/// one spacing unit between characters and words; it is stretched when the
/// overall speed is slower and equals `element_samples` when both speeds
/// match.
///
/// # Examples
///
/// ```
/// let t = morsel::Timing::configure(22_050, 20, 20).unwrap();
/// assert_eq!(t.element_samples(), t.spacing_samples());
///
/// let slow = morsel::Timing::configure(22_050, 20, 10).unwrap();
/// assert!(slow.spacing_samples() > slow.element_samples());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    sample_rate: u32,
    element_samples: usize,
    spacing_samples: usize,
}

impl Timing {
    /// Check a speed pair before any device or file is opened.
    ///
    /// Both speeds must be nonzero and the overall speed may not exceed the
    /// character speed.
    pub fn validate_speeds(char_wpm: u32, total_wpm: u32) -> Result<()> {
        if char_wpm == 0 || total_wpm == 0 {
            return Err(Error::InvalidSpeed(
                "speeds must be at least 1 WPM".into(),
            ));
        }
        if total_wpm > char_wpm {
            return Err(Error::InvalidSpeed(format!(
                "overall speed {total_wpm} WPM exceeds character speed {char_wpm} WPM"
            )));
        }
        Ok(())
    }

    /// Derive sample counts for `sample_rate` from a validated speed pair.
    ///
    /// One minute of samples is divided into 50-unit words at character speed
    /// to size the element; the surplus samples a slower overall speed adds
    /// to each word are then spread across its 19 spacing units. Computing
    /// the stretch as a surplus keeps `spacing_samples == element_samples`
    /// exact whenever the speeds are equal, at every sample rate.
    pub fn configure(sample_rate: u32, char_wpm: u32, total_wpm: u32) -> Result<Self> {
        Self::validate_speeds(char_wpm, total_wpm)?;
        let minute = u64::from(sample_rate) * 60;
        let element = (minute / (u64::from(char_wpm) * 50)) as usize;
        if element == 0 {
            return Err(Error::InvalidSpeed(format!(
                "character speed {char_wpm} WPM is too fast for {sample_rate} Hz"
            )));
        }
        let surplus = minute / u64::from(total_wpm) - minute / u64::from(char_wpm);
        let spacing = element + (surplus / 19) as usize;
        debug!(
            "timing: {element} samples/element, {spacing} samples/spacing at {sample_rate} Hz \
             ({char_wpm}/{total_wpm} WPM)"
        );
        Ok(Self {
            sample_rate,
            element_samples: element,
            spacing_samples: spacing,
        })
    }

    /// Sample rate the counts were derived for, in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples in one elementary unit at character speed.
    pub fn element_samples(&self) -> usize {
        self.element_samples
    }

    /// Samples in one inter-character or inter-word spacing unit.
    pub fn spacing_samples(&self) -> usize {
        self.spacing_samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero_speeds() {
        assert!(Timing::validate_speeds(0, 0).is_err());
        assert!(Timing::validate_speeds(0, 10).is_err());
        assert!(Timing::validate_speeds(10, 0).is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_speeds() {
        assert!(Timing::validate_speeds(10, 11).is_err());
        assert!(Timing::validate_speeds(10, 10).is_ok());
        assert!(Timing::validate_speeds(11, 10).is_ok());
    }

    #[test]
    fn test_known_element_lengths() {
        // 22050 * 60 / (20 * 50) = 1323
        let t = Timing::configure(22_050, 20, 20).unwrap();
        assert_eq!(t.element_samples(), 1323);
        assert_eq!(t.spacing_samples(), 1323);

        // 8000 * 60 / (12 * 50) = 800
        let t = Timing::configure(8_000, 12, 12).unwrap();
        assert_eq!(t.element_samples(), 800);
    }

    #[test]
    fn test_equal_speeds_give_equal_units() {
        // 22050 * 60 is not divisible by 13 * 50, so a formulation that
        // recomputes the spacing from the word length drifts here by one
        // sample. The surplus formulation must not.
        for rate in [8_000u32, 22_050, 44_100, 48_000] {
            for wpm in 1..=60 {
                let t = Timing::configure(rate, wpm, wpm).unwrap();
                assert_eq!(
                    t.element_samples(),
                    t.spacing_samples(),
                    "rate {rate}, {wpm} WPM"
                );
            }
        }
    }

    #[test]
    fn test_farnsworth_stretches_spacing_only() {
        let fast = Timing::configure(22_050, 18, 18).unwrap();
        let spread = Timing::configure(22_050, 18, 12).unwrap();
        assert_eq!(fast.element_samples(), spread.element_samples());
        assert!(spread.spacing_samples() > fast.spacing_samples());
    }

    #[test]
    fn test_spacing_never_shorter_than_element() {
        for char_wpm in 1..=40 {
            for total_wpm in 1..=char_wpm {
                let t = Timing::configure(22_050, char_wpm, total_wpm).unwrap();
                assert!(
                    t.spacing_samples() >= t.element_samples(),
                    "{char_wpm}/{total_wpm} WPM"
                );
            }
        }
    }

    #[test]
    fn test_word_duration_approximates_overall_speed() {
        // 31 element units + 19 spacing units should come out near one word
        // at the overall speed; integer division may round each unit down.
        let t = Timing::configure(22_050, 20, 5).unwrap();
        let word = 31 * t.element_samples() as u64 + 19 * t.spacing_samples() as u64;
        let target = 22_050u64 * 60 / 5;
        assert!(word <= target);
        assert!(target - word < 19 + 50, "word {word} vs target {target}");
    }

    #[test]
    fn test_extreme_character_speed_is_rejected() {
        // Element rounds to zero samples once 50 * wpm exceeds a minute of
        // samples.
        assert!(Timing::configure(22_050, 26_461, 1).is_err());
    }
}
