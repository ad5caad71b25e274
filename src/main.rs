use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use asciify::config::resolve_table;
use asciify::convert::{STRICT_REJECTION, resolve_region};
use asciify::host::printable_glyph;
use asciify::scan::uncovered_8bit;
use asciify::table::describe_code;
use asciify::{
    ConversionReport, Host, RegionArgs, ReplacementTable, TerminalHost, TextBuffer,
    convert_region_interactive_with_report, convert_region_with_report,
    region_has_uncovered_8bit,
};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue, json};

mod diff;
mod encoding;
mod files;
mod logging;
use diff::DiffDisplay;
use encoding::{DecodedText, EncodingStrategy};
use files::{TargetFile, TargetQuery};
use logging::ChangeLog;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn should_color(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq, Default)]
enum ReportFormat {
    #[default]
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert(cmd) => handle_convert(cmd)?,
        Command::Confirm(cmd) => handle_confirm(cmd)?,
        Command::Check(cmd) => handle_check(cmd)?,
        Command::Table(cmd) => handle_table(cmd)?,
        Command::Log(cmd) => handle_log(cmd)?,
    }

    Ok(())
}

fn handle_convert(cmd: ConvertCommand) -> Result<()> {
    let table = cmd.table.resolve()?;
    if cmd.stdin {
        return convert_stdin(&cmd, &table);
    }

    let colorize = cmd.common.color.should_color();
    let targets = resolve_entries(&cmd.common)?;
    let encoding = resolve_encoding_strategy(&cmd.common)?;
    print_command_summary(
        "convert",
        &cmd.common,
        &encoding,
        &targets,
        &[
            format!("table={}", cmd.table.describe(&table)),
            format!("strict={}", cmd.strict),
            format!("region={}", cmd.region.describe()),
        ],
    );

    let log = ChangeLog::default();
    let mut apply_all = cmd.common.auto_apply;
    let mut stats = CommandStats::default();
    for target in &targets {
        if target.is_probably_binary {
            note(&cmd.common, format_args!("skipping binary file {}", target.path.display()));
            stats.skipped += 1;
            continue;
        }
        let decoded = load_target(target, &encoding)?;
        let mut buffer = TextBuffer::new(decoded.text.clone());
        let mut host = TerminalHost::new(io::empty(), io::stdout());
        let args = cmd.region.region_args(&buffer, cmd.strict)?;
        let report = convert_region_with_report(&mut buffer, &mut host, &table, args)
            .with_context(|| format!("converting {}", target.path.display()))?;

        if report.strict_rejected {
            note(&cmd.common, format_args!("{}: {STRICT_REJECTION}", target.path.display()));
            stats.rejected += 1;
            log_change(&cmd.common, &log, "convert", &target.path, "rejected", &report);
            continue;
        }
        if !report.changed {
            stats.no_op += 1;
            log_change(&cmd.common, &log, "convert", &target.path, "no-op", &report);
            continue;
        }

        let new_text = buffer.into_string();
        preview_change(&cmd.common, &target.path, &decoded.text, &new_text, colorize)?;

        if !cmd.common.apply {
            stats.dry_run += 1;
            note(&cmd.common, "dry-run: rerun with --apply to write this change.");
            log_change(&cmd.common, &log, "convert", &target.path, "dry-run", &report);
            continue;
        }

        let decision = if apply_all {
            ApprovalDecision::Apply
        } else {
            prompt_approval(&target.path)?
        };
        match decision {
            ApprovalDecision::Apply | ApprovalDecision::ApplyAll => {
                if matches!(decision, ApprovalDecision::ApplyAll) {
                    apply_all = true;
                }
                write_converted(&cmd.common, target, &decoded, &new_text)?;
                stats.applied += 1;
                log_change(&cmd.common, &log, "convert", &target.path, "applied", &report);
            }
            ApprovalDecision::Skip => {
                note(&cmd.common, format_args!("skipped {}", target.path.display()));
                stats.skipped += 1;
                log_change(&cmd.common, &log, "convert", &target.path, "skipped", &report);
            }
            ApprovalDecision::Quit => {
                note(&cmd.common, "stopping after user request.");
                stats.skipped += 1;
                break;
            }
        }
    }
    stats.print(&cmd.common, "convert");
    Ok(())
}

fn convert_stdin(cmd: &ConvertCommand, table: &ReplacementTable) -> Result<()> {
    let mut bytes = Vec::new();
    io::stdin()
        .read_to_end(&mut bytes)
        .context("reading stdin")?;
    let encoding = resolve_encoding_strategy(&cmd.common)?;
    let decoded = encoding.decode(&bytes);
    let mut buffer = TextBuffer::new(decoded.text);
    let mut host = TerminalHost::new(io::empty(), io::stderr());
    let args = cmd.region.region_args(&buffer, cmd.strict)?;
    let report = convert_region_with_report(&mut buffer, &mut host, table, args)?;
    if report.strict_rejected {
        eprintln!("stdin: {STRICT_REJECTION}");
    }

    let (out, lossy) = decoded.decision.encode(buffer.as_str());
    if lossy {
        eprintln!(
            "warning: output contains characters not representable in {}",
            decoded.decision.label()
        );
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(&out)?;
    stdout.flush()?;
    Ok(())
}

fn handle_confirm(cmd: ConfirmCommand) -> Result<()> {
    let table = cmd.table.resolve()?;
    let targets = resolve_entries(&cmd.common)?;
    let encoding = resolve_encoding_strategy(&cmd.common)?;
    print_command_summary(
        "confirm",
        &cmd.common,
        &encoding,
        &targets,
        &[
            format!("table={}", cmd.table.describe(&table)),
            format!("strict={}", cmd.strict),
            format!("region={}", cmd.region.describe()),
        ],
    );

    // Shared across files: it owns the stdin lock and any buffered answers.
    let mut host = TerminalHost::stdio();
    let log = ChangeLog::default();
    let stats = confirm_targets(&cmd, &targets, &encoding, &table, &log, &mut host)?;
    stats.print(&cmd.common, "confirm");
    Ok(())
}

fn confirm_targets<H: Host>(
    cmd: &ConfirmCommand,
    targets: &[TargetFile],
    encoding: &EncodingStrategy,
    table: &ReplacementTable,
    log: &ChangeLog,
    host: &mut H,
) -> Result<CommandStats> {
    let colorize = cmd.common.color.should_color();
    let mut stats = CommandStats::default();
    for target in targets {
        if target.is_probably_binary {
            note(&cmd.common, format_args!("skipping binary file {}", target.path.display()));
            stats.skipped += 1;
            continue;
        }
        let decoded = load_target(target, encoding)?;
        let mut buffer = TextBuffer::new(decoded.text.clone());
        let args = cmd.region.region_args(&buffer, cmd.strict)?;
        note(
            &cmd.common,
            format_args!(
                "=== {} [{}] ===",
                target.path.display(),
                decoded.decision.describe()
            ),
        );
        let report =
            convert_region_interactive_with_report(&mut buffer, &mut *host, table, args)
                .with_context(|| format!("converting {}", target.path.display()))?;

        if report.strict_rejected {
            stats.rejected += 1;
            log_change(&cmd.common, log, "confirm", &target.path, "rejected", &report);
            continue;
        }
        if report.changed {
            let new_text = buffer.into_string();
            preview_change(&cmd.common, &target.path, &decoded.text, &new_text, colorize)?;
            if cmd.common.apply {
                write_converted(&cmd.common, target, &decoded, &new_text)?;
                stats.applied += 1;
                log_change(&cmd.common, log, "confirm", &target.path, "applied", &report);
            } else {
                stats.dry_run += 1;
                note(&cmd.common, "dry-run: rerun with --apply to write this change.");
                log_change(&cmd.common, log, "confirm", &target.path, "dry-run", &report);
            }
        } else {
            stats.no_op += 1;
            log_change(&cmd.common, log, "confirm", &target.path, "no-op", &report);
        }

        if report.aborted {
            note(&cmd.common, "stopping after user request.");
            break;
        }
    }
    Ok(stats)
}

#[derive(Debug, Serialize)]
struct UncoveredRow {
    path: String,
    position: usize,
    line: usize,
    column: usize,
    code_point: String,
    glyph: String,
}

fn handle_check(cmd: CheckCommand) -> Result<()> {
    let table = cmd.table.resolve()?;
    let targets = resolve_entries(&cmd.common)?;
    let encoding = resolve_encoding_strategy(&cmd.common)?;
    let format = if cmd.common.json {
        ReportFormat::Json
    } else {
        cmd.format
    };

    let mut flagged = 0usize;
    for target in &targets {
        if target.is_probably_binary {
            continue;
        }
        let decoded = load_target(target, &encoding)?;
        let buffer = TextBuffer::new(decoded.text);
        let host = TerminalHost::new(io::empty(), io::stdout());
        let args = cmd.region.region_args(&buffer, false)?;
        if !region_has_uncovered_8bit(&buffer, &host, &table, args.start, args.end)? {
            if matches!(format, ReportFormat::Table) {
                println!("{}: clean", target.path.display());
            }
            continue;
        }

        flagged += 1;
        let (start, end) = resolve_region(&buffer, &host, args.start, args.end)?;
        let found = uncovered_8bit(&buffer, start, end, &table)?;
        let positions: Vec<usize> = found.iter().map(|hit| hit.position).collect();
        let locations = line_columns(buffer.as_str(), &positions);
        match format {
            ReportFormat::Table => {
                println!(
                    "{}: {} uncovered character(s)",
                    target.path.display(),
                    found.len()
                );
                for (hit, (line, column)) in found.iter().zip(&locations) {
                    println!(
                        "    {line}:{column} {} {}",
                        printable_glyph(hit.code_point),
                        describe_code(hit.code_point)
                    );
                }
            }
            ReportFormat::Json => {
                for (hit, (line, column)) in found.iter().zip(&locations) {
                    let row = UncoveredRow {
                        path: target.path.display().to_string(),
                        position: hit.position,
                        line: *line,
                        column: *column,
                        code_point: format!("0x{:02X}", hit.code_point),
                        glyph: printable_glyph(hit.code_point),
                    };
                    println!("{}", serde_json::to_string(&row)?);
                }
            }
        }
    }

    if flagged > 0 {
        bail!("{flagged} file(s) contain 8-bit characters the table does not cover");
    }
    Ok(())
}

/// 1-based line and column for each char offset in `positions`, which must
/// be ascending.
fn line_columns(text: &str, positions: &[usize]) -> Vec<(usize, usize)> {
    let mut out = Vec::with_capacity(positions.len());
    let mut wanted = positions.iter().peekable();
    let (mut line, mut column) = (1, 1);
    for (offset, ch) in text.chars().enumerate() {
        while wanted.next_if(|&&pos| pos == offset).is_some() {
            out.push((line, column));
        }
        if wanted.peek().is_none() {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    out
}

fn handle_table(cmd: TableCommand) -> Result<()> {
    let table = cmd.table.resolve()?;
    match cmd.format {
        ReportFormat::Table => {
            println!("table: {}", cmd.table.describe(&table));
            for (code, replacement) in table.iter() {
                println!(
                    "  {:<8} \\{:03o}  0x{:02X}  -> {:?}",
                    printable_glyph(code),
                    code,
                    code,
                    replacement
                );
            }
        }
        ReportFormat::Json => {
            let rows: Vec<JsonValue> = table
                .iter()
                .map(|(code, replacement)| {
                    json!({
                        "code_point": format!("0x{code:02X}"),
                        "octal": format!("\\{code:03o}"),
                        "glyph": printable_glyph(code),
                        "replacement": replacement,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}

fn handle_log(cmd: LogCommand) -> Result<()> {
    let entries = ChangeLog::default().read_recent(cmd.tail)?;
    if entries.is_empty() {
        println!("change log is empty.");
        return Ok(());
    }
    for entry in entries {
        println!(
            "[{}] {:<8} {:<8} replaced={:<4} skipped={:<4} {}",
            entry.timestamp, entry.command, entry.action, entry.replaced, entry.skipped, entry.path
        );
    }
    Ok(())
}

fn load_target(target: &TargetFile, encoding: &EncodingStrategy) -> Result<DecodedText> {
    let bytes =
        fs::read(&target.path).with_context(|| format!("reading {}", target.path.display()))?;
    let decoded = encoding.decode(&bytes);
    if decoded.had_errors {
        eprintln!(
            "warning: {} did not decode cleanly as {}",
            target.path.display(),
            decoded.decision.describe()
        );
    }
    Ok(decoded)
}

fn preview_change(
    common: &CommonArgs,
    path: &Path,
    old: &str,
    new: &str,
    colorize: bool,
) -> Result<()> {
    if common.json {
        return Ok(());
    }
    println!(
        "--- preview: {} ({} line(s) changed) ---",
        path.display(),
        diff::changed_lines(old, new)
    );
    let display = DiffDisplay {
        context: common.context,
        colorize,
    };
    diff::write_diff(&mut io::stdout().lock(), old, new, display)
}

fn write_converted(
    common: &CommonArgs,
    target: &TargetFile,
    decoded: &DecodedText,
    new_text: &str,
) -> Result<()> {
    let (bytes, lossy) = decoded.decision.encode(new_text);
    if lossy {
        eprintln!(
            "warning: {} contains characters not representable in {}",
            target.path.display(),
            decoded.decision.describe()
        );
    }
    let backup = if common.no_backup {
        None
    } else {
        files::create_backup(&target.path)?
    };
    files::write_via_temp(&target.path, &bytes)?;
    if let Some(backup) = backup {
        note(common, format_args!("backup saved to {}", backup.display()));
    }
    note(common, format_args!("applied {}", target.path.display()));
    Ok(())
}

fn note(common: &CommonArgs, message: impl fmt::Display) {
    let _ = write_note(&mut io::stdout().lock(), common, message);
}

/// Progress line for humans; `--json` keeps stdout to events only.
fn write_note<W: Write>(
    out: &mut W,
    common: &CommonArgs,
    message: impl fmt::Display,
) -> io::Result<()> {
    if common.json {
        return Ok(());
    }
    writeln!(out, "{message}")
}

fn log_change(
    common: &CommonArgs,
    log: &ChangeLog,
    command: &str,
    path: &Path,
    action: &str,
    report: &ConversionReport,
) {
    let _ = log.record(command, path, action, report.replaced, report.skipped);
    emit_json_event(common, command, path, action, report);
}

fn emit_json_event(
    common: &CommonArgs,
    command: &str,
    path: &Path,
    action: &str,
    report: &ConversionReport,
) {
    if !common.json {
        return;
    }
    let mut event = JsonMap::new();
    event.insert("command".into(), JsonValue::String(command.to_string()));
    event.insert("path".into(), JsonValue::String(path.display().to_string()));
    event.insert("action".into(), JsonValue::String(action.to_string()));
    event.insert("replaced".into(), json!(report.replaced));
    event.insert("skipped".into(), json!(report.skipped));
    event.insert("aborted".into(), JsonValue::Bool(report.aborted));
    event.insert("applied".into(), JsonValue::Bool(action == "applied"));
    println!("{}", JsonValue::Object(event));
}

fn print_command_summary(
    command: &str,
    common: &CommonArgs,
    encoding: &EncodingStrategy,
    targets: &[TargetFile],
    details: &[String],
) {
    if common.json {
        return;
    }
    println!("command: {command}");
    println!(
        "mode: {}{}",
        if common.apply { "apply" } else { "dry-run" },
        if common.auto_apply {
            " (auto-approve)"
        } else {
            ""
        }
    );
    println!("encoding strategy: {}", encoding.describe());
    println!("context lines: {}", common.context);
    println!("include hidden: {}", common.include_hidden);
    if !common.exclude.is_empty() {
        println!("exclude globs: {:?}", common.exclude);
    }
    if common.no_backup {
        println!("backups disabled");
    }
    println!("resolved files ({}):", targets.len());
    for target in targets.iter().take(10) {
        let binary_hint = if target.is_probably_binary {
            ", binary? yes"
        } else {
            ""
        };
        println!(
            "  - {} ({} bytes{})",
            target.path.display(),
            target.len,
            binary_hint
        );
    }
    if targets.len() > 10 {
        println!("  ...");
    }
    for detail in details {
        println!("{detail}");
    }
    println!("---");
}

fn resolve_entries(common: &CommonArgs) -> Result<Vec<TargetFile>> {
    files::resolve_targets(&TargetQuery {
        explicit: &common.targets,
        globs: &common.globs,
        include_hidden: common.include_hidden,
        exclude: &common.exclude,
    })
}

fn resolve_encoding_strategy(common: &CommonArgs) -> Result<EncodingStrategy> {
    EncodingStrategy::new(common.encoding.as_deref())
}

#[derive(Debug, Clone, Copy)]
enum ApprovalDecision {
    Apply,
    Skip,
    ApplyAll,
    Quit,
}

fn prompt_approval(path: &Path) -> Result<ApprovalDecision> {
    loop {
        print_prompt(&format!(
            "Apply change to {}? [y]es/[n]o/[a]ll/[q]uit: ",
            path.display()
        ))?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            println!();
            return Ok(ApprovalDecision::Quit);
        }
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" | "" => return Ok(ApprovalDecision::Apply),
            "n" | "no" => return Ok(ApprovalDecision::Skip),
            "a" | "all" => return Ok(ApprovalDecision::ApplyAll),
            "q" | "quit" => return Ok(ApprovalDecision::Quit),
            _ => {
                println!("Please enter y, n, a, or q.");
            }
        }
    }
}

fn print_prompt(message: &str) -> Result<()> {
    print!("{message}");
    io::stdout().flush()?;
    Ok(())
}

#[derive(Default)]
struct CommandStats {
    applied: usize,
    skipped: usize,
    dry_run: usize,
    no_op: usize,
    rejected: usize,
}

impl CommandStats {
    fn print(&self, common: &CommonArgs, label: &str) {
        if common.json {
            return;
        }
        let total = self.applied + self.skipped + self.dry_run + self.no_op + self.rejected;
        if total == 0 {
            return;
        }
        println!(
            "{label} summary: applied={}, skipped={}, dry-run={}, no-op={}, rejected={}",
            self.applied, self.skipped, self.dry_run, self.no_op, self.rejected
        );
    }
}

fn parse_range_spec(spec: &str) -> Result<(usize, usize)> {
    let mut parts = spec.split([':', '-']);
    let start = parts
        .next()
        .ok_or_else(|| anyhow!("range spec requires start:end"))?;
    let end = parts
        .next()
        .ok_or_else(|| anyhow!("range spec requires start:end"))?;

    if parts.next().is_some() {
        bail!("range spec should be in the form start:end");
    }

    let start = start
        .trim()
        .parse::<usize>()
        .with_context(|| format!("invalid line number '{start}'"))?;
    let end = end
        .trim()
        .parse::<usize>()
        .with_context(|| format!("invalid line number '{end}'"))?;
    if start == 0 || end == 0 {
        bail!("line numbers start at 1");
    }
    if start > end {
        bail!("range start must be <= end");
    }
    Ok((start, end))
}

#[derive(Debug, Parser)]
#[command(
    name = "asciify",
    version,
    about = "Convert Latin-1 8-bit characters to plain ASCII"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace every covered character without asking.
    Convert(ConvertCommand),
    /// Ask before each replacement.
    Confirm(ConfirmCommand),
    /// List 8-bit characters the table does not cover.
    Check(CheckCommand),
    /// Print the active replacement table.
    Table(TableCommand),
    /// Show recent change-log entries.
    Log(LogCommand),
}

#[derive(Debug, Clone, Args)]
struct CommonArgs {
    #[arg(long = "glob", value_name = "GLOB")]
    globs: Vec<String>,
    #[arg(long = "target", value_name = "PATH", value_hint = ValueHint::AnyPath)]
    targets: Vec<PathBuf>,
    #[arg(long, value_name = "ENCODING")]
    encoding: Option<String>,
    #[arg(long, action = ArgAction::SetTrue)]
    apply: bool,
    #[arg(long = "yes", action = ArgAction::SetTrue)]
    auto_apply: bool,
    #[arg(long, action = ArgAction::SetTrue)]
    no_backup: bool,
    #[arg(long, default_value_t = 3)]
    context: usize,
    #[arg(long = "color", value_enum, default_value = "auto")]
    color: ColorChoice,
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    #[arg(long = "include-hidden", action = ArgAction::SetTrue)]
    include_hidden: bool,
    #[arg(long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,
}

#[derive(Debug, Clone, Args)]
struct RegionFlags {
    /// First character offset of the region (0-based).
    #[arg(long, value_name = "N", conflicts_with = "lines")]
    start: Option<usize>,
    /// Character offset just past the region.
    #[arg(long, value_name = "N", conflicts_with = "lines")]
    end: Option<usize>,
    /// Restrict to an inclusive 1-based line range, e.g. 10:20.
    #[arg(long, value_name = "A:B")]
    lines: Option<String>,
}

impl RegionFlags {
    fn region_args(&self, buffer: &TextBuffer, strict: bool) -> Result<RegionArgs> {
        if let Some(spec) = &self.lines {
            let (first, last) = parse_range_spec(spec)?;
            let (start, end) = buffer
                .line_span(first, last)
                .ok_or_else(|| anyhow!("lines {spec} are outside the file"))?;
            return Ok(RegionArgs::new(Some(start), Some(end)).strict(strict));
        }
        Ok(RegionArgs::new(self.start, self.end).strict(strict))
    }

    fn describe(&self) -> String {
        if let Some(spec) = &self.lines {
            return format!("lines {spec}");
        }
        match (self.start, self.end) {
            (None, None) => "whole file".to_string(),
            (start, end) => format!(
                "{}..{}",
                start.map_or("start".to_string(), |pos| pos.to_string()),
                end.map_or("end".to_string(), |pos| pos.to_string())
            ),
        }
    }
}

#[derive(Debug, Clone, Args)]
struct TableFlags {
    /// YAML or JSON file overriding the replacement table.
    #[arg(long = "table", value_name = "FILE", value_hint = ValueHint::FilePath)]
    file: Option<PathBuf>,
    /// Start from the control-character table instead of Latin-1.
    #[arg(long, action = ArgAction::SetTrue)]
    control: bool,
}

impl TableFlags {
    fn resolve(&self) -> Result<ReplacementTable> {
        resolve_table(self.file.as_deref(), self.control)
    }

    fn describe(&self, table: &ReplacementTable) -> String {
        let source = match (&self.file, self.control) {
            (Some(path), _) => path.display().to_string(),
            (None, true) => "control".to_string(),
            (None, false) => "latin1".to_string(),
        };
        format!("{source} ({} entries)", table.len())
    }
}

#[derive(Debug, Args)]
struct ConvertCommand {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    region: RegionFlags,
    #[command(flatten)]
    table: TableFlags,
    /// Refuse to convert a file holding 8-bit characters the table lacks.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
    /// Read text from stdin and write the converted text to stdout.
    #[arg(long, action = ArgAction::SetTrue)]
    stdin: bool,
}

#[derive(Debug, Args)]
struct ConfirmCommand {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    region: RegionFlags,
    #[command(flatten)]
    table: TableFlags,
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
}

#[derive(Debug, Args)]
struct CheckCommand {
    #[command(flatten)]
    common: CommonArgs,
    #[command(flatten)]
    region: RegionFlags,
    #[command(flatten)]
    table: TableFlags,
    #[arg(long, value_enum, default_value = "table")]
    format: ReportFormat,
}

#[derive(Debug, Args)]
struct TableCommand {
    #[command(flatten)]
    table: TableFlags,
    #[arg(long, value_enum, default_value = "table")]
    format: ReportFormat,
}

#[derive(Debug, Args)]
struct LogCommand {
    #[arg(long, default_value_t = 20)]
    tail: usize,
}
