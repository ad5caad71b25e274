//! Unconditional and interactive region conversion.
//!
//! Both modes resolve the region and run the optional strict check before
//! touching the buffer, so a validation failure or a strict rejection never
//! leaves a partial conversion behind. Once replacing starts only an operator
//! quit stops it early, and nothing already replaced is rolled back.

use crate::buffer::TextBuffer;
use crate::error::{ConvertError, Result};
use crate::host::{ConfirmPrompt, Decision, Host};
use crate::scan::{MatchAction, has_uncovered_8bit, scan_and_replace};
use crate::table::ReplacementTable;

pub const STRICT_REJECTION: &str =
    "region contains 8-bit characters outside the table; no conversion done";

/// Region bounds and policy for one call. Missing bounds come from the
/// host selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionArgs {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub strict: bool,
}

impl RegionArgs {
    pub fn new(start: Option<usize>, end: Option<usize>) -> Self {
        Self {
            start,
            end,
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub changed: bool,
    pub replaced: usize,
    pub skipped: usize,
    pub aborted: bool,
    pub strict_rejected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmState {
    Prompting,
    AutoReplaceRest,
    Aborted,
    Done,
}

/// Resolves the region to `(start, end)` with `start <= end`, filling missing
/// bounds from the host selection and checking both against the buffer.
pub fn resolve_region<H: Host + ?Sized>(
    buffer: &TextBuffer,
    host: &H,
    start: Option<usize>,
    end: Option<usize>,
) -> Result<(usize, usize)> {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (start, end) => {
            let (sel_start, sel_end) = host
                .current_selection(buffer)
                .ok_or(ConvertError::NoRegion)?;
            (start.unwrap_or(sel_start), end.unwrap_or(sel_end))
        }
    };
    buffer.check_position(start)?;
    buffer.check_position(end)?;
    Ok((start.min(end), start.max(end)))
}

pub fn convert_region<H: Host + ?Sized>(
    buffer: &mut TextBuffer,
    host: &mut H,
    table: &ReplacementTable,
    args: RegionArgs,
) -> Result<bool> {
    convert_region_with_report(buffer, host, table, args).map(|report| report.changed)
}

/// Replaces every covered character in the region. With `strict`, a region
/// holding any uncovered 8-bit character is left alone.
pub fn convert_region_with_report<H: Host + ?Sized>(
    buffer: &mut TextBuffer,
    host: &mut H,
    table: &ReplacementTable,
    args: RegionArgs,
) -> Result<ConversionReport> {
    let (start, end) = resolve_region(buffer, host, args.start, args.end)?;
    let mut report = ConversionReport::default();
    if args.strict && has_uncovered_8bit(buffer, start, end, table)? {
        report.strict_rejected = true;
        return Ok(report);
    }

    let mut replaced = 0;
    report.changed = scan_and_replace(buffer, start, end, table, |_| {
        replaced += 1;
        Ok(MatchAction::Replace)
    })?;
    report.replaced = replaced;
    Ok(report)
}

pub fn convert_region_interactive<H: Host + ?Sized>(
    buffer: &mut TextBuffer,
    host: &mut H,
    table: &ReplacementTable,
    args: RegionArgs,
) -> Result<bool> {
    convert_region_interactive_with_report(buffer, host, table, args).map(|report| report.changed)
}

/// Like [`convert_region_with_report`] but asks the operator about each
/// candidate. `All` replaces the rest without asking; `Quit` stops at once.
pub fn convert_region_interactive_with_report<H: Host + ?Sized>(
    buffer: &mut TextBuffer,
    host: &mut H,
    table: &ReplacementTable,
    args: RegionArgs,
) -> Result<ConversionReport> {
    let (start, end) = resolve_region(buffer, host, args.start, args.end)?;
    let mut report = ConversionReport::default();
    if args.strict && has_uncovered_8bit(buffer, start, end, table)? {
        host.notify(STRICT_REJECTION);
        report.strict_rejected = true;
        return Ok(report);
    }

    let mut state = ConfirmState::Prompting;
    let (mut replaced, mut skipped) = (0, 0);
    report.changed = scan_and_replace(buffer, start, end, table, |candidate| {
        let action = match state {
            ConfirmState::Prompting => {
                let prompt = ConfirmPrompt {
                    code_point: candidate.code_point,
                    position: candidate.start,
                    replacement: candidate.replacement,
                };
                match host.prompt(&prompt)? {
                    Decision::Yes => MatchAction::Replace,
                    Decision::No => MatchAction::Skip,
                    Decision::All => {
                        state = ConfirmState::AutoReplaceRest;
                        MatchAction::Replace
                    }
                    Decision::Quit => {
                        state = ConfirmState::Aborted;
                        MatchAction::Stop
                    }
                }
            }
            ConfirmState::AutoReplaceRest => MatchAction::Replace,
            ConfirmState::Aborted | ConfirmState::Done => MatchAction::Stop,
        };
        match action {
            MatchAction::Replace => replaced += 1,
            MatchAction::Skip => skipped += 1,
            MatchAction::Stop => {}
        }
        Ok(action)
    })?;

    if state != ConfirmState::Aborted {
        state = ConfirmState::Done;
    }
    report.aborted = state == ConfirmState::Aborted;
    report.replaced = replaced;
    report.skipped = skipped;
    Ok(report)
}

/// Strict-mode query on its own: does the region hold uncovered 8-bit
/// characters?
pub fn region_has_uncovered_8bit<H: Host + ?Sized>(
    buffer: &TextBuffer,
    host: &H,
    table: &ReplacementTable,
    start: Option<usize>,
    end: Option<usize>,
) -> Result<bool> {
    let (start, end) = resolve_region(buffer, host, start, end)?;
    has_uncovered_8bit(buffer, start, end, table)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;

    use super::*;

    #[derive(Default)]
    struct ScriptedHost {
        selection: Option<(usize, usize)>,
        answers: VecDeque<Decision>,
        prompts: Vec<String>,
        notices: Vec<String>,
    }

    impl ScriptedHost {
        fn whole(buffer: &TextBuffer) -> Self {
            Self {
                selection: Some((0, buffer.char_len())),
                ..Self::default()
            }
        }

        fn answering(buffer: &TextBuffer, answers: &[Decision]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                ..Self::whole(buffer)
            }
        }
    }

    impl Host for ScriptedHost {
        fn current_selection(&self, _buffer: &TextBuffer) -> Option<(usize, usize)> {
            self.selection
        }

        fn prompt(&mut self, prompt: &ConfirmPrompt<'_>) -> io::Result<Decision> {
            self.prompts.push(prompt.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| io::Error::other("no scripted answer left"))
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    fn convert(text: &str, strict: bool) -> (String, bool) {
        let mut buffer = TextBuffer::new(text);
        let mut host = ScriptedHost::whole(&buffer);
        let table = ReplacementTable::latin1();
        let changed = convert_region(
            &mut buffer,
            &mut host,
            &table,
            RegionArgs::default().strict(strict),
        )
        .unwrap();
        (buffer.into_string(), changed)
    }

    #[test]
    fn converts_guillemets_in_one_call() {
        assert_eq!(
            convert("\u{AB} hi \u{BB}", false),
            ("<< hi >>".to_string(), true)
        );
    }

    #[test]
    fn copyright_expands_and_region_end_follows() {
        let mut buffer = TextBuffer::new("a\u{A9}b");
        let mut host = ScriptedHost::whole(&buffer);
        let table = ReplacementTable::latin1();
        let changed = convert_region(
            &mut buffer,
            &mut host,
            &table,
            RegionArgs::new(Some(0), Some(3)),
        )
        .unwrap();
        assert!(changed);
        assert_eq!(buffer.as_str(), "a (C) b");
        assert_eq!(buffer.char_len(), 7);
        assert_eq!(buffer.live_markers(), 0);
    }

    #[test]
    fn every_covered_character_is_replaced_and_nothing_else() {
        let table = ReplacementTable::latin1();
        let mut input = String::from("plain \u{E9}\u{D0} ");
        let mut expected = input.clone();
        for (code, replacement) in table.iter() {
            input.push(char::from(code));
            expected.push_str(replacement);
        }
        let (output, changed) = convert(&input, false);
        assert!(changed);
        assert_eq!(output, expected);
    }

    #[test]
    fn conversion_is_idempotent() {
        let (once, _) = convert("\u{93}quoted\u{94} \u{A9} caf\u{E9} \u{C6}", false);
        let (twice, changed) = convert(&once, false);
        assert_eq!(once, twice);
        assert!(!changed);
    }

    #[test]
    fn strict_mode_is_all_or_nothing() {
        let input = "\u{AB}x\u{BB} \u{D0}";
        assert_eq!(convert(input, true), (input.to_string(), false));
        assert_eq!(convert(input, false), ("<<x>> \u{D0}".to_string(), true));
    }

    #[test]
    fn strict_unconditional_rejection_is_silent() {
        let mut buffer = TextBuffer::new("\u{D0}\u{A9}");
        let mut host = ScriptedHost::whole(&buffer);
        let table = ReplacementTable::latin1();
        let report = convert_region_with_report(
            &mut buffer,
            &mut host,
            &table,
            RegionArgs::default().strict(true),
        )
        .unwrap();
        assert!(report.strict_rejected);
        assert!(!report.changed);
        assert!(host.notices.is_empty());
    }

    #[test]
    fn strict_only_considers_the_region() {
        let mut buffer = TextBuffer::new("\u{D0} \u{A9}");
        let mut host = ScriptedHost::whole(&buffer);
        let table = ReplacementTable::latin1();
        let changed = convert_region(
            &mut buffer,
            &mut host,
            &table,
            RegionArgs::new(Some(1), Some(3)).strict(true),
        )
        .unwrap();
        assert!(changed);
        assert_eq!(buffer.as_str(), "\u{D0}  (C) ");
    }

    #[test]
    fn missing_region_is_an_error_before_mutation() {
        let mut buffer = TextBuffer::new("\u{A9}");
        let mut host = ScriptedHost::default();
        let table = ReplacementTable::latin1();
        let err = convert_region(&mut buffer, &mut host, &table, RegionArgs::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::NoRegion));
        assert_eq!(buffer.as_str(), "\u{A9}");
    }

    #[test]
    fn explicit_bounds_work_without_selection() {
        let mut buffer = TextBuffer::new("\u{A9}");
        let mut host = ScriptedHost::default();
        let table = ReplacementTable::latin1();
        assert!(
            convert_region(
                &mut buffer,
                &mut host,
                &table,
                RegionArgs::new(Some(0), Some(1))
            )
            .unwrap()
        );
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let buffer = TextBuffer::new("abc");
        let host = ScriptedHost::default();
        assert_eq!(
            resolve_region(&buffer, &host, Some(3), Some(1)).unwrap(),
            (1, 3)
        );
    }

    #[test]
    fn partial_bounds_fill_from_selection() {
        let buffer = TextBuffer::new("abcdef");
        let host = ScriptedHost::whole(&buffer);
        assert_eq!(resolve_region(&buffer, &host, Some(2), None).unwrap(), (2, 6));
        assert_eq!(resolve_region(&buffer, &host, None, Some(4)).unwrap(), (0, 4));
    }

    #[test]
    fn out_of_range_bounds_are_rejected() {
        let buffer = TextBuffer::new("abc");
        let host = ScriptedHost::default();
        assert!(matches!(
            resolve_region(&buffer, &host, Some(0), Some(10)),
            Err(ConvertError::OutOfBounds { position: 10, .. })
        ));
    }

    #[test]
    fn interactive_abort_keeps_prior_replacements() {
        let mut buffer = TextBuffer::new("\u{AB} hi \u{BB}");
        let mut host = ScriptedHost::answering(&buffer, &[Decision::Yes, Decision::Quit]);
        let table = ReplacementTable::latin1();
        let report = convert_region_interactive_with_report(
            &mut buffer,
            &mut host,
            &table,
            RegionArgs::default(),
        )
        .unwrap();
        assert!(report.changed);
        assert!(report.aborted);
        assert_eq!(report.replaced, 1);
        assert_eq!(buffer.as_str(), "<< hi \u{BB}");
        assert_eq!(host.prompts.len(), 2);
    }

    #[test]
    fn interactive_skip_then_all_stops_prompting() {
        let mut buffer = TextBuffer::new("\u{AB}\u{A9}\u{BB}\u{AB}");
        let mut host = ScriptedHost::answering(&buffer, &[Decision::No, Decision::All]);
        let table = ReplacementTable::latin1();
        let report = convert_region_interactive_with_report(
            &mut buffer,
            &mut host,
            &table,
            RegionArgs::default(),
        )
        .unwrap();
        assert_eq!(buffer.as_str(), "\u{AB} (C) >><<");
        assert_eq!(host.prompts.len(), 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.replaced, 3);
        assert!(!report.aborted);
    }

    #[test]
    fn interactive_all_no_returns_unchanged() {
        let mut buffer = TextBuffer::new("\u{AB}\u{BB}");
        let mut host = ScriptedHost::answering(&buffer, &[Decision::No, Decision::No]);
        let table = ReplacementTable::latin1();
        let changed =
            convert_region_interactive(&mut buffer, &mut host, &table, RegionArgs::default())
                .unwrap();
        assert!(!changed);
        assert_eq!(buffer.as_str(), "\u{AB}\u{BB}");
    }

    #[test]
    fn interactive_prompt_describes_candidate() {
        let mut buffer = TextBuffer::new("x\u{A9}");
        let mut host = ScriptedHost::answering(&buffer, &[Decision::Yes]);
        let table = ReplacementTable::latin1();
        convert_region_interactive(&mut buffer, &mut host, &table, RegionArgs::default())
            .unwrap();
        assert_eq!(
            host.prompts,
            vec!["Replace \u{A9} (\\251, 0xA9) with \" (C) \"?".to_string()]
        );
    }

    #[test]
    fn interactive_strict_rejection_notifies() {
        let mut buffer = TextBuffer::new("\u{AB}\u{D0}");
        let mut host = ScriptedHost::whole(&buffer);
        let table = ReplacementTable::latin1();
        let changed = convert_region_interactive(
            &mut buffer,
            &mut host,
            &table,
            RegionArgs::default().strict(true),
        )
        .unwrap();
        assert!(!changed);
        assert!(host.prompts.is_empty());
        assert_eq!(host.notices, vec![STRICT_REJECTION.to_string()]);
        assert_eq!(buffer.as_str(), "\u{AB}\u{D0}");
    }

    #[test]
    fn prompt_failure_propagates_and_keeps_earlier_work() {
        let mut buffer = TextBuffer::new("\u{AB}\u{BB}");
        let mut host = ScriptedHost::answering(&buffer, &[Decision::Yes]);
        let table = ReplacementTable::latin1();
        let err =
            convert_region_interactive(&mut buffer, &mut host, &table, RegionArgs::default())
                .unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
        assert_eq!(buffer.as_str(), "<<\u{BB}");
        assert_eq!(buffer.live_markers(), 0);
    }

    #[test]
    fn uncovered_query_distinguishes_table_members() {
        let table = ReplacementTable::latin1();
        let with_eth = TextBuffer::new("x\u{D0}y");
        let host = ScriptedHost::whole(&with_eth);
        assert!(region_has_uncovered_8bit(&with_eth, &host, &table, None, None).unwrap());

        let covered: String = table.iter().map(|(code, _)| char::from(code)).collect();
        let only_table = TextBuffer::new(covered);
        let host = ScriptedHost::whole(&only_table);
        assert!(!region_has_uncovered_8bit(&only_table, &host, &table, None, None).unwrap());
    }
}
