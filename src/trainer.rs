//! Koch-method training support: the character progression, drill
//! generation, and transcript scoring.
//!
//! The Koch method teaches at full speed from the first session: two
//! characters to begin with, one more added every time a transcription
//! scores at least 90 percent.

use rand::Rng;
use rand::rngs::ThreadRng;

/// Characters in the order the Koch progression unlocks them.
pub const KOCH_LETTERS: &str = "KMRSUAPTLOWI.NJEF0Y,VG5/Q9ZH38B?427C1D6X";

/// Longest word a drill will ever contain.
pub const MAX_WORD_LEN: usize = 10;

/// Random drill-word generator over the unlocked prefix of the progression.
///
/// The level counts unlocked characters and is clamped to the progression,
/// so level 1 drills pure `K` and anything past the final level drills the
/// whole set. Generic over the random source; tests drive it with a seeded
/// generator.
pub struct WordGenerator<R: Rng = ThreadRng> {
    rng: R,
    unlocked: &'static str,
}

impl WordGenerator<ThreadRng> {
    /// Generator for `level` unlocked characters, using thread-local
    /// randomness.
    pub fn new(level: usize) -> Self {
        Self::with_rng(level, rand::thread_rng())
    }
}

impl<R: Rng> WordGenerator<R> {
    /// Like [`new`](WordGenerator::new) with a caller-supplied random source.
    pub fn with_rng(level: usize, rng: R) -> Self {
        let level = level.clamp(1, KOCH_LETTERS.len());
        WordGenerator {
            rng,
            unlocked: &KOCH_LETTERS[..level],
        }
    }

    /// One practice word of two to six unlocked characters.
    pub fn word(&mut self) -> String {
        let len = self.rng.gen_range(2..7);
        debug_assert!(len <= MAX_WORD_LEN);
        let bytes = self.unlocked.as_bytes();
        (0..len)
            .map(|_| char::from(bytes[self.rng.gen_range(0..bytes.len())]))
            .collect()
    }

    /// A whole drill line: `words` space-separated practice words.
    pub fn drill(&mut self, words: usize) -> String {
        (0..words).map(|_| self.word()).collect::<Vec<_>>().join(" ")
    }
}

fn fold(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Score `answer` against the `expected` drill, as a percentage of expected
/// characters transcribed correctly.
///
/// The walk is word-aware: within a word the answer cursor advances over
/// each attempted character, holds at a word boundary while the expected
/// word runs out, and resynchronizes at the next boundary. Missing or
/// garbled characters therefore cost only their own word. Comparison is
/// case-insensitive.
///
/// # Examples
///
/// ```
/// use morsel::trainer::score_transcript;
///
/// assert_eq!(score_transcript("CQ CQ", "cq cq"), 100);
/// assert_eq!(score_transcript("CQ", "CO"), 50);
/// assert_eq!(score_transcript("AAA BBB", "XXX BBB"), 50);
/// ```
pub fn score_transcript(expected: &str, answer: &str) -> u32 {
    let answer: Vec<char> = answer.chars().collect();
    let mut i = 0;
    let mut n = 0u32;
    let mut t = 0u32;
    for good in expected.chars() {
        if good.is_whitespace() {
            while i < answer.len() && !answer[i].is_whitespace() {
                i += 1;
            }
            if i < answer.len() {
                i += 1;
            }
        } else {
            if i < answer.len() && fold(answer[i]) == fold(good) {
                t += 1;
            }
            if i < answer.len() && !answer[i].is_whitespace() {
                i += 1;
            }
            n += 1;
        }
    }
    if n == 0 { 100 } else { 100 * t / n }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_every_koch_character_is_synthesizable() {
        for c in KOCH_LETTERS.chars() {
            assert!(code::lookup(c).is_some(), "{c} has no code");
        }
    }

    #[test]
    fn test_progression_has_no_duplicates() {
        let chars: Vec<char> = KOCH_LETTERS.chars().collect();
        for (i, c) in chars.iter().enumerate() {
            assert!(!chars[i + 1..].contains(c), "{c} appears twice");
        }
    }

    #[test]
    fn test_words_use_only_unlocked_characters() {
        let mut words = WordGenerator::with_rng(5, StdRng::seed_from_u64(7));
        for _ in 0..200 {
            let word = words.word();
            assert!(word.len() >= 2 && word.len() <= 6, "bad length {word:?}");
            assert!(word.len() <= MAX_WORD_LEN);
            assert!(word.chars().all(|c| "KMRSU".contains(c)), "{word:?}");
        }
    }

    #[test]
    fn test_level_is_clamped_to_the_progression() {
        let mut floor = WordGenerator::with_rng(0, StdRng::seed_from_u64(1));
        assert!(floor.word().chars().all(|c| c == 'K'));
        let mut ceiling = WordGenerator::with_rng(1000, StdRng::seed_from_u64(1));
        let _ = ceiling.word();
    }

    #[test]
    fn test_seeded_drills_are_reproducible() {
        let mut a = WordGenerator::with_rng(10, StdRng::seed_from_u64(42));
        let mut b = WordGenerator::with_rng(10, StdRng::seed_from_u64(42));
        assert_eq!(a.drill(25), b.drill(25));
    }

    #[test]
    fn test_drill_has_the_requested_word_count() {
        let mut words = WordGenerator::with_rng(10, StdRng::seed_from_u64(3));
        let drill = words.drill(75);
        assert_eq!(drill.split(' ').count(), 75);
    }

    #[test]
    fn test_perfect_transcript_scores_100() {
        assert_eq!(score_transcript("HELLO WORLD", "HELLO WORLD"), 100);
        assert_eq!(score_transcript("HELLO WORLD", "hello world\n"), 100);
    }

    #[test]
    fn test_one_wrong_character_in_ten() {
        assert_eq!(score_transcript("HELLO WORLD", "HELLO XORLD"), 90);
    }

    #[test]
    fn test_empty_answer_scores_zero() {
        assert_eq!(score_transcript("HELLO", ""), 0);
    }

    #[test]
    fn test_empty_expected_scores_100() {
        assert_eq!(score_transcript("", "ANYTHING"), 100);
    }

    #[test]
    fn test_garbled_word_costs_only_itself() {
        assert_eq!(score_transcript("AAA BBB", "XXX BBB"), 50);
    }

    #[test]
    fn test_short_answer_word_resynchronizes() {
        // "AB" consumes two characters, the held cursor misses "C", and the
        // next word still lines up.
        assert_eq!(score_transcript("ABC DEF", "AB DEF"), 83);
    }

    #[test]
    fn test_extra_answer_words_are_ignored() {
        assert_eq!(score_transcript("AB", "AB CD EF"), 100);
    }

    #[test]
    fn test_missing_word_is_not_recovered() {
        // Without the first answer word the cursor eats "BBB" during "AAA"
        // and never realigns.
        assert_eq!(score_transcript("AAA BBB", "BBB"), 0);
    }
}
