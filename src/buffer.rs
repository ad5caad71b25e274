//! Mutable text buffer addressed by character positions.
//!
//! Positions count code points, not bytes. The buffer owns a set of markers
//! that are adjusted on every [`TextBuffer::replace_range`]; a marker's
//! [`InsertionType`] decides what happens when text is inserted exactly at
//! its position.

use std::cell::Cell;
use std::collections::HashMap;

use regex::Regex;

use crate::error::{ConvertError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(u64);

impl MarkerId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Behaviour of a marker when text is inserted exactly at its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionType {
    /// Stays before the inserted text.
    #[default]
    Before,
    /// Moves past the inserted text.
    After,
}

#[derive(Debug, Clone, Copy)]
struct MarkerData {
    pos: usize,
    insertion_type: InsertionType,
}

#[derive(Debug)]
pub struct TextBuffer {
    text: String,
    char_len: usize,
    markers: HashMap<u64, MarkerData>,
    next_marker: u64,
    // Last known (char, byte) boundary pair; scans start here when possible.
    cursor: Cell<(usize, usize)>,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        Self {
            text,
            char_len,
            markers: HashMap::new(),
            next_marker: 1,
            cursor: Cell::new((0, 0)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn check_position(&self, position: usize) -> Result<()> {
        if position > self.char_len {
            return Err(ConvertError::OutOfBounds {
                position,
                len: self.char_len,
            });
        }
        Ok(())
    }

    fn byte_offset(&self, position: usize) -> usize {
        let (mut ch, mut byte) = self.cursor.get();
        if position < ch {
            ch = 0;
            byte = 0;
        }
        let offset = self.text[byte..]
            .char_indices()
            .nth(position - ch)
            .map_or(self.text.len(), |(idx, _)| byte + idx);
        self.cursor.set((position, offset));
        offset
    }

    fn byte_range(&self, start: usize, end: usize) -> Result<(usize, usize)> {
        self.check_position(start)?;
        self.check_position(end)?;
        if end < start {
            return Err(ConvertError::OutOfBounds {
                position: end,
                len: self.char_len,
            });
        }
        let from = self.byte_offset(start);
        let to = from
            + self.text[from..]
                .char_indices()
                .nth(end - start)
                .map_or(self.text.len() - from, |(idx, _)| idx);
        Ok((from, to))
    }

    /// Text in `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<&str> {
        let (from, to) = self.byte_range(start, end)?;
        Ok(&self.text[from..to])
    }

    /// Replaces `[start, end)` with `replacement` and adjusts every marker.
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: &str) -> Result<()> {
        let (from, to) = self.byte_range(start, end)?;
        self.text.replace_range(from..to, replacement);

        let old_chars = end - start;
        let new_chars = replacement.chars().count();
        self.char_len = self.char_len - old_chars + new_chars;
        self.adjust_markers(start, end, new_chars);
        // Everything before `start` is untouched, so this pair is still valid.
        self.cursor.set((start, from));
        Ok(())
    }

    pub fn insert(&mut self, position: usize, text: &str) -> Result<()> {
        self.replace_range(position, position, text)
    }

    fn adjust_markers(&mut self, start: usize, end: usize, new_chars: usize) {
        let old_chars = end - start;
        for data in self.markers.values_mut() {
            if old_chars == 0 {
                if data.pos == start {
                    if data.insertion_type == InsertionType::After {
                        data.pos += new_chars;
                    }
                } else if data.pos > start {
                    data.pos += new_chars;
                }
            } else if data.pos >= end {
                data.pos = data.pos - old_chars + new_chars;
            } else if data.pos > start {
                data.pos = start;
            }
        }
    }

    pub fn make_marker(
        &mut self,
        position: usize,
        insertion_type: InsertionType,
    ) -> Result<MarkerId> {
        self.check_position(position)?;
        let id = self.next_marker;
        self.next_marker += 1;
        self.markers.insert(
            id,
            MarkerData {
                pos: position,
                insertion_type,
            },
        );
        Ok(MarkerId(id))
    }

    pub fn marker_position(&self, marker: MarkerId) -> Result<usize> {
        self.markers
            .get(&marker.0)
            .map(|data| data.pos)
            .ok_or(ConvertError::StaleMarker(marker.0))
    }

    /// Stops tracking `marker`. Returns false when it was already released.
    pub fn release_marker(&mut self, marker: MarkerId) -> bool {
        self.markers.remove(&marker.0).is_some()
    }

    pub fn live_markers(&self) -> usize {
        self.markers.len()
    }

    /// First match of `regex` inside `[from, bound)`, as a character span.
    pub fn find_forward(
        &self,
        regex: &Regex,
        from: usize,
        bound: usize,
    ) -> Result<Option<(usize, usize)>> {
        self.check_position(from)?;
        self.check_position(bound)?;
        if bound <= from {
            return Ok(None);
        }
        let start_byte = self.byte_offset(from);
        let Some(found) = regex.find_at(&self.text, start_byte) else {
            return Ok(None);
        };
        let start = from + self.text[start_byte..found.start()].chars().count();
        self.cursor.set((start, found.start()));
        let end = start + found.as_str().chars().count();
        if end > bound {
            return Ok(None);
        }
        Ok(Some((start, end)))
    }

    /// Character span covering lines `first..=last` (1-based), including the
    /// trailing newline of `last` when there is one.
    pub fn line_span(&self, first: usize, last: usize) -> Option<(usize, usize)> {
        if first == 0 || last < first {
            return None;
        }
        let mut line = 1usize;
        let mut start = (first == 1).then_some(0);
        let mut end = None;
        for (pos, ch) in self.text.chars().enumerate() {
            if ch != '\n' {
                continue;
            }
            if line == last {
                end = Some(pos + 1);
                break;
            }
            line += 1;
            if line == first {
                start = Some(pos + 1);
            }
        }
        let start = start?;
        Some((start, end.unwrap_or(self.char_len)))
    }
}
