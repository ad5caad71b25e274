//! Replacement tables mapping single code points to 7-bit ASCII text.
//!
//! A table is an ordered list of `(code point, replacement)` pairs backed by
//! a 256-slot array, so [`ReplacementTable::lookup`] is a direct index. The
//! two regexes used by the scanner are derived from the table each time they
//! are requested; callers that run several searches in one pass build them
//! once and reuse them.

use std::fmt::Write as _;

use regex::Regex;

use crate::error::{ConvertError, Result};

const SLOTS: usize = 256;

/// Never matches anything; used for empty character classes.
const EMPTY_CLASS: &str = r"[^\x{0}-\x{10FFFF}]";

/// Windows-1252 punctuation in the C1 range and Latin-1 symbols/ligatures.
const LATIN1_ENTRIES: &[(u8, &str)] = &[
    (0x82, ","),
    (0x84, ",,"),
    (0x85, "..."),
    (0x88, "^"),
    (0x8B, "<"),
    (0x8C, "OE"),
    (0x91, "`"),
    (0x92, "'"),
    (0x93, "\""),
    (0x94, "\""),
    (0x95, "*"),
    (0x96, "-"),
    (0x97, "--"),
    (0x98, "~"),
    (0x99, "(TM)"),
    (0x9B, ">"),
    (0x9C, "oe"),
    (0xA0, " "),
    (0xA6, "|"),
    (0xA9, " (C) "),
    (0xAB, "<<"),
    (0xAD, "-"),
    (0xAE, " (R) "),
    (0xB4, "'"),
    (0xB7, "."),
    (0xB8, ","),
    (0xBB, ">>"),
    (0xBC, " 1/4"),
    (0xBD, " 1/2"),
    (0xBE, " 3/4"),
    (0xC6, "AE"),
    (0xD7, "x"),
    (0xDF, "ss"),
    (0xE6, "ae"),
    (0xF7, "/"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementTable {
    order: Vec<u8>,
    slots: Vec<Option<String>>,
}

impl Default for ReplacementTable {
    fn default() -> Self {
        Self::latin1()
    }
}

impl ReplacementTable {
    pub fn empty() -> Self {
        Self {
            order: Vec::new(),
            slots: vec![None; SLOTS],
        }
    }

    /// The default high-bit table.
    pub fn latin1() -> Self {
        Self::from_static(LATIN1_ENTRIES)
    }

    /// Caret notation for raw control characters. Kept apart from the
    /// high-bit table and never merged with it.
    pub fn control() -> Self {
        let mut table = Self::empty();
        for code in (0u8..0x20).chain(std::iter::once(0x7F)) {
            if matches!(code, b'\t' | b'\n' | 0x0C | b'\r') {
                continue;
            }
            let caret = char::from(code ^ 0x40);
            table.push_unchecked(code, format!("^{caret}"));
        }
        table
    }

    fn from_static(entries: &[(u8, &str)]) -> Self {
        let mut table = Self::empty();
        for (code, replacement) in entries {
            table.push_unchecked(*code, (*replacement).to_string());
        }
        table
    }

    /// Builds a table from caller-supplied pairs, rejecting duplicate keys
    /// and replacements that are empty or not 7-bit.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, S)>,
        S: Into<String>,
    {
        let mut table = Self::empty();
        for (code, replacement) in pairs {
            let replacement = replacement.into();
            if table.contains(code) {
                return Err(ConvertError::InvalidTable(format!(
                    "duplicate entry for {}",
                    describe_code(code)
                )));
            }
            table.insert(code, replacement)?;
        }
        Ok(table)
    }

    /// Adds or overwrites an entry. Overwriting keeps the original position.
    pub fn insert(&mut self, code: u8, replacement: String) -> Result<()> {
        validate_replacement(code, &replacement)?;
        if self.contains(code) {
            self.slots[usize::from(code)] = Some(replacement);
        } else {
            self.push_unchecked(code, replacement);
        }
        Ok(())
    }

    pub fn remove(&mut self, code: u8) -> Option<String> {
        let removed = self.slots[usize::from(code)].take();
        if removed.is_some() {
            self.order.retain(|existing| *existing != code);
        }
        removed
    }

    fn push_unchecked(&mut self, code: u8, replacement: String) {
        self.order.push(code);
        self.slots[usize::from(code)] = Some(replacement);
    }

    pub fn lookup(&self, code: u8) -> Option<&str> {
        self.slots[usize::from(code)].as_deref()
    }

    /// Looks up a character; anything above U+00FF is never covered.
    pub fn lookup_char(&self, ch: char) -> Option<&str> {
        u8::try_from(u32::from(ch))
            .ok()
            .and_then(|code| self.lookup(code))
    }

    pub fn contains(&self, code: u8) -> bool {
        self.slots[usize::from(code)].is_some()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> + '_ {
        self.order
            .iter()
            .filter_map(|code| self.lookup(*code).map(|text| (*code, text)))
    }

    pub fn is_high_bit_only(&self) -> bool {
        self.order.iter().all(|code| *code >= 0x80)
    }
}

fn validate_replacement(code: u8, replacement: &str) -> Result<()> {
    if replacement.is_empty() {
        return Err(ConvertError::InvalidTable(format!(
            "replacement for {} is empty",
            describe_code(code)
        )));
    }
    if !replacement.is_ascii() {
        return Err(ConvertError::InvalidTable(format!(
            "replacement {replacement:?} for {} is not 7-bit ASCII",
            describe_code(code)
        )));
    }
    Ok(())
}

/// `0xA9 (\251)` style label used in messages.
pub fn describe_code(code: u8) -> String {
    format!("0x{code:02X} (\\{code:03o})")
}

/// Matches exactly one character whose code point is a key of `table`.
pub fn build_match_regex(table: &ReplacementTable) -> Result<Regex> {
    let codes: Vec<u8> = table.iter().map(|(code, _)| code).collect();
    compile_class(&codes)
}

/// Matches exactly one character in 0x80..=0xFF that `table` does not cover.
pub fn build_other_8bit_regex(table: &ReplacementTable) -> Result<Regex> {
    let codes: Vec<u8> = (0x80u8..=0xFF).filter(|code| !table.contains(*code)).collect();
    compile_class(&codes)
}

pub fn lookup(table: &ReplacementTable, code: u8) -> Option<&str> {
    table.lookup(code)
}

// Members are written as `\x{..}` escapes so code points that coincide with
// class metacharacters (`]`, `^`, `-`, `\`) need no special casing.
fn compile_class(codes: &[u8]) -> Result<Regex> {
    let pattern = if codes.is_empty() {
        EMPTY_CLASS.to_string()
    } else {
        let mut class = String::from("[");
        for code in codes {
            let _ = write!(class, "\\x{{{code:X}}}");
        }
        class.push(']');
        class
    };
    Regex::new(&pattern)
        .map_err(|err| ConvertError::InvalidTable(format!("unable to build class regex: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_high_bit_and_ascii() {
        let table = ReplacementTable::latin1();
        assert!(table.is_high_bit_only());
        for (_, text) in table.iter() {
            assert!(!text.is_empty());
            assert!(text.is_ascii());
        }
    }

    #[test]
    fn default_table_leaves_accented_letters_alone() {
        let table = ReplacementTable::latin1();
        assert_eq!(table.lookup(0xE9), None);
        assert_eq!(table.lookup(0xD0), None);
        assert_eq!(table.lookup(0xA9), Some(" (C) "));
        assert_eq!(table.lookup(0xC6), Some("AE"));
    }

    #[test]
    fn control_table_stays_below_high_bit() {
        let table = ReplacementTable::control();
        assert!(table.iter().all(|(code, _)| code < 0x20 || code == 0x7F));
        assert_eq!(table.lookup(0x07), Some("^G"));
        assert_eq!(table.lookup(0x7F), Some("^?"));
        assert_eq!(table.lookup(b'\n'), None);
        assert_eq!(table.lookup(b'\t'), None);
    }

    #[test]
    fn from_pairs_rejects_duplicates() {
        let err = ReplacementTable::from_pairs([(0xA9, "(C)"), (0xA9, "(c)")]).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidTable(_)));
    }

    #[test]
    fn from_pairs_rejects_non_ascii_and_empty() {
        assert!(ReplacementTable::from_pairs([(0xE9, "é")]).is_err());
        assert!(ReplacementTable::from_pairs([(0xE9, "")]).is_err());
    }

    #[test]
    fn match_regex_covers_exactly_table_keys() {
        let table = ReplacementTable::latin1();
        let regex = build_match_regex(&table).unwrap();
        for code in 0u8..=0xFF {
            let text = char::from(code).to_string();
            assert_eq!(regex.is_match(&text), table.contains(code), "code {code:#x}");
        }
    }

    #[test]
    fn match_regex_handles_metacharacter_code_points() {
        let table =
            ReplacementTable::from_pairs([(b']', "R"), (b'^', "C"), (b'-', "D"), (b'\\', "B")])
                .unwrap();
        let regex = build_match_regex(&table).unwrap();
        assert!(regex.is_match("]"));
        assert!(regex.is_match("^"));
        assert!(regex.is_match("-"));
        assert!(regex.is_match("\\"));
        assert!(!regex.is_match("a"));
    }

    #[test]
    fn other_8bit_regex_is_complement_within_high_range() {
        let table = ReplacementTable::latin1();
        let regex = build_other_8bit_regex(&table).unwrap();
        assert!(regex.is_match("\u{D0}"));
        assert!(regex.is_match("\u{E9}"));
        assert!(!regex.is_match("\u{A9}"));
        assert!(!regex.is_match("plain ascii"));
        assert!(!regex.is_match("\u{2019}"));
    }

    #[test]
    fn empty_table_regex_never_matches() {
        let regex = build_match_regex(&ReplacementTable::empty()).unwrap();
        assert!(!regex.is_match("\u{A9}abc"));
    }

    #[test]
    fn rebuilt_regex_observes_table_edits() {
        let mut table = ReplacementTable::latin1();
        assert!(!build_match_regex(&table).unwrap().is_match("\u{E9}"));
        table.insert(0xE9, "e".into()).unwrap();
        assert!(build_match_regex(&table).unwrap().is_match("\u{E9}"));
        assert!(!build_other_8bit_regex(&table).unwrap().is_match("\u{E9}"));
    }

    #[test]
    fn remove_drops_entry_from_order() {
        let mut table = ReplacementTable::latin1();
        let before = table.len();
        assert_eq!(table.remove(0xA0).as_deref(), Some(" "));
        assert_eq!(table.len(), before - 1);
        assert!(table.iter().all(|(code, _)| code != 0xA0));
    }

    #[test]
    fn lookup_char_ignores_wide_characters() {
        let table = ReplacementTable::latin1();
        assert_eq!(table.lookup_char('\u{AB}'), Some("<<"));
        assert_eq!(table.lookup_char('\u{1AB}'), None);
    }
}
