//! The code table: characters and their dot/dash spellings.

/// One table entry: a character and its code as a string of `.` and `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEntry {
    pub ch: char,
    pub code: &'static str,
}

const fn entry(ch: char, code: &'static str) -> CodeEntry {
    CodeEntry { ch, code }
}

/// International Morse code, including the accented letters and punctuation
/// in common amateur use. Letters are stored uppercase; [`lookup`] folds its
/// argument before searching. `(` and `)` intentionally share a spelling.
pub const CODE_TABLE: &[CodeEntry] = &[
    entry('A', ".-"),
    entry('B', "-..."),
    entry('C', "-.-."),
    entry('D', "-.."),
    entry('E', "."),
    entry('F', "..-."),
    entry('G', "--."),
    entry('H', "...."),
    entry('I', ".."),
    entry('J', ".---"),
    entry('K', "-.-"),
    entry('L', ".-.."),
    entry('M', "--"),
    entry('N', "-."),
    entry('O', "---"),
    entry('P', ".--."),
    entry('Q', "--.-"),
    entry('R', ".-."),
    entry('S', "..."),
    entry('T', "-"),
    entry('U', "..-"),
    entry('V', "...-"),
    entry('W', ".--"),
    entry('X', "-..-"),
    entry('Y', "-.--"),
    entry('Z', "--.."),
    entry('Á', ".--.-"),
    entry('Ä', ".-.-"),
    entry('É', "..-.."),
    entry('Ñ', "--.--"),
    entry('Ö', "---."),
    entry('Ü', "..--"),
    entry('1', ".----"),
    entry('2', "..---"),
    entry('3', "...--"),
    entry('4', "....-"),
    entry('5', "....."),
    entry('6', "-...."),
    entry('7', "--..."),
    entry('8', "---.."),
    entry('9', "----."),
    entry('0', "-----"),
    entry(',', "--..--"),
    entry('.', ".-.-.-"),
    entry('?', "..--.."),
    entry(';', "-.-.-"),
    entry(':', "---..."),
    entry('/', "-..-."),
    entry('-', "-....-"),
    entry('\'', ".----."),
    entry('(', "-.--.-"),
    entry(')', "-.--.-"),
    entry('_', "..--.-"),
];

/// Look up the code for `ch` in the standard table.
///
/// Lookup is case-insensitive: the character is uppercased first, so `'a'`
/// and `'A'` spell the same code. Characters whose uppercase form is more
/// than one character (such as `'ß'`) have no single-entry form and return
/// `None`, as does anything absent from the table.
///
/// # Examples
///
/// ```
/// assert_eq!(morsel::code::lookup('s'), Some("..."));
/// assert_eq!(morsel::code::lookup('#'), None);
/// ```
pub fn lookup(ch: char) -> Option<&'static str> {
    lookup_in(CODE_TABLE, ch)
}

/// Look up the code for `ch` in a caller-supplied table.
pub fn lookup_in(table: &[CodeEntry], ch: char) -> Option<&'static str> {
    let mut upper = ch.to_uppercase();
    let folded = upper.next()?;
    if upper.next().is_some() {
        return None;
    }
    table.iter().find(|e| e.ch == folded).map(|e| e.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup('a'), lookup('A'));
        assert_eq!(lookup('a'), Some(".-"));
        assert_eq!(lookup('á'), Some(".--.-"));
        assert_eq!(lookup('ü'), Some("..--"));
    }

    #[test]
    fn test_lookup_rejects_unmapped_characters() {
        assert_eq!(lookup('#'), None);
        assert_eq!(lookup(' '), None);
        assert_eq!(lookup('\n'), None);
        // Uppercases to "SS", which is not a single table character.
        assert_eq!(lookup('ß'), None);
    }

    #[test]
    fn test_digits_and_punctuation_are_mapped() {
        assert_eq!(lookup('0'), Some("-----"));
        assert_eq!(lookup('9'), Some("----."));
        assert_eq!(lookup('?'), Some("..--.."));
        assert_eq!(lookup('/'), Some("-..-."));
    }

    #[test]
    fn test_codes_use_only_dots_and_dashes() {
        for e in CODE_TABLE {
            assert!(!e.code.is_empty(), "{} has an empty code", e.ch);
            assert!(
                e.code.chars().all(|c| c == '.' || c == '-'),
                "{} has a malformed code {:?}",
                e.ch,
                e.code
            );
        }
    }

    #[test]
    fn test_characters_are_unique_and_uppercase() {
        for (i, e) in CODE_TABLE.iter().enumerate() {
            assert!(!e.ch.is_lowercase(), "{} is stored lowercase", e.ch);
            for other in &CODE_TABLE[i + 1..] {
                assert_ne!(e.ch, other.ch, "{} appears twice", e.ch);
            }
        }
    }

    #[test]
    fn test_lookup_in_respects_custom_tables() {
        const TINY: &[CodeEntry] = &[entry('E', "."), entry('T', "-")];
        assert_eq!(lookup_in(TINY, 'e'), Some("."));
        assert_eq!(lookup_in(TINY, 'A'), None);
    }
}
