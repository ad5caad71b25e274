use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

const LOG_DIR: &str = ".asciify";
const LOG_FILE: &str = "change_log.jsonl";
const MAX_ENTRIES: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub timestamp: String,
    pub command: String,
    pub path: String,
    pub action: String,
    pub replaced: usize,
    #[serde(default)]
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct ChangeLog {
    dir: PathBuf,
}

impl Default for ChangeLog {
    fn default() -> Self {
        Self::in_dir(LOG_DIR)
    }
}

impl ChangeLog {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file(&self) -> PathBuf {
        self.dir.join(LOG_FILE)
    }

    pub fn record(
        &self,
        command: &str,
        path: &Path,
        action: &str,
        replaced: usize,
        skipped: usize,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("creating {:?}", self.dir))?;
        let log_path = self.file();
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".into());
        let entry = ChangeLogEntry {
            timestamp,
            command: command.to_string(),
            path: path.display().to_string(),
            action: action.to_string(),
            replaced,
            skipped,
        };
        let json = serde_json::to_string(&entry)?;
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&log_path)
            .with_context(|| format!("opening {log_path:?}"))?;
        writeln!(file, "{json}")?;
        truncate_log(&log_path)?;
        Ok(())
    }

    /// The last `count` entries, oldest first. Unparseable lines are skipped.
    pub fn read_recent(&self, count: usize) -> Result<Vec<ChangeLogEntry>> {
        let log_path = self.file();
        if !log_path.exists() {
            return Ok(Vec::new());
        }
        let file = OpenOptions::new()
            .read(true)
            .open(&log_path)
            .with_context(|| format!("reading {log_path:?}"))?;
        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            if let Ok(entry) = serde_json::from_str::<ChangeLogEntry>(&line?) {
                entries.push(entry);
            }
        }
        let skip = entries.len().saturating_sub(count);
        Ok(entries.split_off(skip))
    }
}

fn truncate_log(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .with_context(|| format!("reading {path:?}"))?;
    let reader = BufReader::new(file);
    let lines: Vec<_> = reader.lines().collect::<Result<_, _>>()?;
    if lines.len() <= MAX_ENTRIES {
        return Ok(());
    }
    let keep = &lines[lines.len() - MAX_ENTRIES..];
    fs::write(path, keep.join("\n") + "\n")?;
    Ok(())
}
