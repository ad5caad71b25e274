use std::io::Write;

use anyhow::Result;
use similar::{ChangeTag, TextDiff};

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy)]
pub struct DiffDisplay {
    pub context: usize,
    pub colorize: bool,
}

pub fn write_diff<W: Write>(out: &mut W, old: &str, new: &str, display: DiffDisplay) -> Result<()> {
    let diff = TextDiff::configure()
        .algorithm(similar::Algorithm::Myers)
        .diff_lines(old, new);

    for (idx, group) in diff.grouped_ops(display.context).iter().enumerate() {
        if idx > 0 {
            writeln!(out, "...")?;
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, color) = match change.tag() {
                    ChangeTag::Delete => ("- ", RED),
                    ChangeTag::Insert => ("+ ", GREEN),
                    ChangeTag::Equal => ("  ", ""),
                };
                let paint = display.colorize && !color.is_empty();
                if paint {
                    write!(out, "{color}")?;
                }
                write!(out, "{sign}{}", change.value())?;
                if change.missing_newline() {
                    writeln!(out)?;
                }
                if paint {
                    write!(out, "{RESET}")?;
                }
            }
        }
    }

    Ok(())
}

/// Number of lines that differ between `old` and `new`.
pub fn changed_lines(old: &str, new: &str) -> usize {
    TextDiff::from_lines(old, new)
        .iter_all_changes()
        .filter(|change| change.tag() == ChangeTag::Insert)
        .count()
}
