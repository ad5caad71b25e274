//! Region scanning: the replace pass and the read-only strict check.

use regex::Regex;

use crate::buffer::{InsertionType, MarkerId, TextBuffer};
use crate::error::Result;
use crate::table::{ReplacementTable, build_match_regex, build_other_8bit_regex};

/// What the scan does with one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAction {
    Replace,
    Skip,
    /// Ends the scan; replacements already made are kept.
    Stop,
}

/// A table-covered character found inside the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'t> {
    pub code_point: u8,
    pub start: usize,
    pub end: usize,
    pub replacement: &'t str,
}

impl Candidate<'_> {
    pub fn glyph(&self) -> char {
        char::from(self.code_point)
    }
}

/// An 8-bit character the table does not cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uncovered {
    pub position: usize,
    pub code_point: u8,
}

/// Replaces table-covered characters in `[start, end)`, asking `on_match`
/// about each one. Returns whether the buffer was modified.
///
/// The end of the region is tracked with a marker so that replacements longer
/// than one character do not cut the scan short. The marker is released
/// before returning, whether or not the callback failed.
pub fn scan_and_replace<F>(
    buffer: &mut TextBuffer,
    start: usize,
    end: usize,
    table: &ReplacementTable,
    on_match: F,
) -> Result<bool>
where
    F: FnMut(&Candidate<'_>) -> Result<MatchAction>,
{
    let matcher = build_match_regex(table)?;
    buffer.check_position(start)?;
    let end_marker = buffer.make_marker(end, InsertionType::Before)?;
    let outcome = replace_until(buffer, start, end_marker, table, &matcher, on_match);
    buffer.release_marker(end_marker);
    outcome
}

fn replace_until<F>(
    buffer: &mut TextBuffer,
    start: usize,
    end_marker: MarkerId,
    table: &ReplacementTable,
    matcher: &Regex,
    mut on_match: F,
) -> Result<bool>
where
    F: FnMut(&Candidate<'_>) -> Result<MatchAction>,
{
    let mut pos = start;
    let mut changed = false;

    loop {
        let bound = buffer.marker_position(end_marker)?;
        let Some((found_start, found_end)) = buffer.find_forward(matcher, pos, bound)? else {
            break;
        };
        let Some(candidate) = candidate_at(buffer, table, found_start, found_end)? else {
            pos = found_end;
            continue;
        };

        match on_match(&candidate)? {
            MatchAction::Replace => {
                buffer.replace_range(found_start, found_end, candidate.replacement)?;
                pos = found_start + candidate.replacement.chars().count();
                changed = true;
            }
            MatchAction::Skip => pos = found_end,
            MatchAction::Stop => break,
        }
    }

    Ok(changed)
}

fn candidate_at<'t>(
    buffer: &TextBuffer,
    table: &'t ReplacementTable,
    start: usize,
    end: usize,
) -> Result<Option<Candidate<'t>>> {
    let Some(ch) = buffer.slice(start, end)?.chars().next() else {
        return Ok(None);
    };
    let Ok(code_point) = u8::try_from(u32::from(ch)) else {
        return Ok(None);
    };
    Ok(table.lookup(code_point).map(|replacement| Candidate {
        code_point,
        start,
        end,
        replacement,
    }))
}

/// True when `[start, end)` holds a character in 0x80..=0xFF that `table`
/// does not cover. Never mutates the buffer or its markers.
pub fn has_uncovered_8bit(
    buffer: &TextBuffer,
    start: usize,
    end: usize,
    table: &ReplacementTable,
) -> Result<bool> {
    let other = build_other_8bit_regex(table)?;
    Ok(buffer.find_forward(&other, start, end)?.is_some())
}

/// Every uncovered 8-bit character in `[start, end)`, in buffer order.
pub fn uncovered_8bit(
    buffer: &TextBuffer,
    start: usize,
    end: usize,
    table: &ReplacementTable,
) -> Result<Vec<Uncovered>> {
    let other = build_other_8bit_regex(table)?;
    let mut found = Vec::new();
    let mut pos = start;
    while let Some((hit_start, hit_end)) = buffer.find_forward(&other, pos, end)? {
        let code_point = buffer
            .slice(hit_start, hit_end)?
            .chars()
            .next()
            .and_then(|ch| u8::try_from(u32::from(ch)).ok());
        if let Some(code_point) = code_point {
            found.push(Uncovered {
                position: hit_start,
                code_point,
            });
        }
        pos = hit_end;
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::error::ConvertError;

    fn replace_all(buffer: &mut TextBuffer, start: usize, end: usize) -> bool {
        let table = ReplacementTable::latin1();
        scan_and_replace(buffer, start, end, &table, |_| Ok(MatchAction::Replace)).unwrap()
    }

    #[test]
    fn replacement_longer_than_match_extends_region_end() {
        let mut buffer = TextBuffer::new("a\u{A9}b");
        assert!(replace_all(&mut buffer, 0, 3));
        assert_eq!(buffer.as_str(), "a (C) b");
        assert_eq!(buffer.live_markers(), 0);
    }

    #[test]
    fn floating_end_reaches_characters_past_the_original_offset() {
        // The first replacement pushes the second copyright sign from offset
        // 3 to 7; an end fixed at 4 would stop the scan before it.
        let mut buffer = TextBuffer::new("a\u{A9}b\u{A9}");
        assert!(replace_all(&mut buffer, 0, 4));
        assert_eq!(buffer.as_str(), "a (C) b (C) ");
    }

    #[test]
    fn characters_after_region_end_are_untouched() {
        let mut buffer = TextBuffer::new("a\u{A9}b\u{A9}");
        assert!(replace_all(&mut buffer, 0, 3));
        assert_eq!(buffer.as_str(), "a (C) b\u{A9}");
    }

    #[test]
    fn characters_before_region_start_are_untouched() {
        let mut buffer = TextBuffer::new("\u{AB}x\u{BB}");
        assert!(replace_all(&mut buffer, 1, 3));
        assert_eq!(buffer.as_str(), "\u{AB}x>>");
    }

    #[test]
    fn empty_region_reports_no_change() {
        let mut buffer = TextBuffer::new("\u{A9}");
        assert!(!replace_all(&mut buffer, 1, 1));
        assert!(!replace_all(&mut buffer, 0, 0));
        assert_eq!(buffer.as_str(), "\u{A9}");
    }

    #[test]
    fn region_without_covered_characters_is_untouched() {
        let mut buffer = TextBuffer::new("caf\u{E9} \u{D0}");
        assert!(!replace_all(&mut buffer, 0, 6));
        assert_eq!(buffer.as_str(), "caf\u{E9} \u{D0}");
    }

    #[test]
    fn skip_leaves_character_and_continues() {
        let table = ReplacementTable::latin1();
        let mut buffer = TextBuffer::new("\u{AB} hi \u{BB}");
        let mut seen = Vec::new();
        let changed = scan_and_replace(&mut buffer, 0, 6, &table, |candidate| {
            seen.push((candidate.code_point, candidate.start));
            Ok(if candidate.code_point == 0xAB {
                MatchAction::Skip
            } else {
                MatchAction::Replace
            })
        })
        .unwrap();
        assert!(changed);
        assert_eq!(buffer.as_str(), "\u{AB} hi >>");
        assert_eq!(seen, vec![(0xAB, 0), (0xBB, 5)]);
    }

    #[test]
    fn candidate_positions_reflect_earlier_replacements() {
        let table = ReplacementTable::latin1();
        let mut buffer = TextBuffer::new("\u{AB}\u{BB}");
        let mut starts = Vec::new();
        scan_and_replace(&mut buffer, 0, 2, &table, |candidate| {
            starts.push(candidate.start);
            Ok(MatchAction::Replace)
        })
        .unwrap();
        assert_eq!(starts, vec![0, 2]);
        assert_eq!(buffer.as_str(), "<<>>");
    }

    #[test]
    fn stop_keeps_earlier_replacements() {
        let table = ReplacementTable::latin1();
        let mut buffer = TextBuffer::new("\u{AB}-\u{BB}");
        let mut calls = 0;
        let changed = scan_and_replace(&mut buffer, 0, 3, &table, |_| {
            calls += 1;
            Ok(if calls == 1 {
                MatchAction::Replace
            } else {
                MatchAction::Stop
            })
        })
        .unwrap();
        assert!(changed);
        assert_eq!(buffer.as_str(), "<<-\u{BB}");
    }

    #[test]
    fn callback_error_releases_end_marker() {
        let table = ReplacementTable::latin1();
        let mut buffer = TextBuffer::new("\u{AB}");
        let result = scan_and_replace(&mut buffer, 0, 1, &table, |_| {
            Err(ConvertError::Io(io::Error::other("closed")))
        });
        assert!(result.is_err());
        assert_eq!(buffer.live_markers(), 0);
        assert_eq!(buffer.as_str(), "\u{AB}");
    }

    #[test]
    fn out_of_bounds_region_is_rejected_before_mutation() {
        let table = ReplacementTable::latin1();
        let mut buffer = TextBuffer::new("\u{AB}");
        let result = scan_and_replace(&mut buffer, 0, 5, &table, |_| Ok(MatchAction::Replace));
        assert!(matches!(result, Err(ConvertError::OutOfBounds { .. })));
        assert_eq!(buffer.as_str(), "\u{AB}");
        assert_eq!(buffer.live_markers(), 0);
    }

    #[test]
    fn control_table_replaces_only_control_characters() {
        let table = ReplacementTable::control();
        let mut buffer = TextBuffer::new("a\u{7}b\tc\u{A9}");
        let changed =
            scan_and_replace(&mut buffer, 0, 6, &table, |_| Ok(MatchAction::Replace)).unwrap();
        assert!(changed);
        assert_eq!(buffer.as_str(), "a^Gb\tc\u{A9}");
    }

    #[test]
    fn uncovered_check_is_read_only() {
        let table = ReplacementTable::latin1();
        let buffer = TextBuffer::new("x\u{D0}y\u{A9}");
        assert!(has_uncovered_8bit(&buffer, 0, 4, &table).unwrap());
        assert!(!has_uncovered_8bit(&buffer, 2, 4, &table).unwrap());
        assert_eq!(buffer.live_markers(), 0);
    }

    #[test]
    fn uncovered_lists_every_offender() {
        let table = ReplacementTable::latin1();
        let buffer = TextBuffer::new("\u{E9}t\u{E9}\u{A9}\u{D0}");
        let found = uncovered_8bit(&buffer, 0, 5, &table).unwrap();
        assert_eq!(
            found,
            vec![
                Uncovered {
                    position: 0,
                    code_point: 0xE9
                },
                Uncovered {
                    position: 2,
                    code_point: 0xE9
                },
                Uncovered {
                    position: 4,
                    code_point: 0xD0
                },
            ]
        );
    }
}
