use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use glob::glob;
use globset::{Glob, GlobSet, GlobSetBuilder};
use time::OffsetDateTime;
use walkdir::{DirEntry, WalkDir};

const BINARY_CHECK_BYTES: usize = 4096;

#[derive(Debug, Clone)]
pub struct TargetFile {
    pub path: PathBuf,
    pub len: u64,
    pub is_probably_binary: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TargetQuery<'a> {
    pub explicit: &'a [PathBuf],
    pub globs: &'a [String],
    pub include_hidden: bool,
    pub exclude: &'a [String],
}

pub fn resolve_targets(query: &TargetQuery<'_>) -> Result<Vec<TargetFile>> {
    let exclude = build_exclude_globs(query.exclude)?;
    let mut targets = Vec::new();

    for path in query.explicit {
        append_path(path, query.include_hidden, exclude.as_ref(), &mut targets)
            .with_context(|| format!("processing target {}", path.display()))?;
    }

    for pattern in query.globs {
        let matches =
            glob(pattern).map_err(|err| anyhow!("invalid glob pattern '{pattern}': {err}"))?;
        for entry in matches {
            let path =
                entry.map_err(|err| anyhow!("error reading matches for '{pattern}': {err}"))?;
            append_path(&path, query.include_hidden, exclude.as_ref(), &mut targets)
                .with_context(|| format!("processing match {}", path.display()))?;
        }
    }

    if targets.is_empty() {
        bail!("no files matched; provide --target, --glob or --stdin");
    }

    targets.sort_by(|a, b| a.path.cmp(&b.path));
    targets.dedup_by(|a, b| a.path == b.path);
    Ok(targets)
}

fn append_path(
    path: &Path,
    include_hidden: bool,
    exclude: Option<&GlobSet>,
    acc: &mut Vec<TargetFile>,
) -> Result<()> {
    let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let metadata = match fs::metadata(&canonical) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            bail!("{} does not exist", path.display());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("unable to read metadata for {}", canonical.display()));
        }
    };

    if metadata.is_dir() {
        let walker = WalkDir::new(&canonical)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| include_hidden || !is_hidden(entry));
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() {
                push_file(entry.into_path(), include_hidden, exclude, acc)?;
            }
        }
        return Ok(());
    }

    if metadata.is_file() {
        push_file(canonical, include_hidden, exclude, acc)?;
    }
    Ok(())
}

fn push_file(
    path: PathBuf,
    include_hidden: bool,
    exclude: Option<&GlobSet>,
    acc: &mut Vec<TargetFile>,
) -> Result<()> {
    if should_skip(&path, include_hidden, exclude) {
        return Ok(());
    }
    let metadata =
        fs::metadata(&path).with_context(|| format!("metadata for {}", path.display()))?;
    acc.push(TargetFile {
        len: metadata.len(),
        is_probably_binary: detect_binary(&path)?,
        path,
    });
    Ok(())
}

fn should_skip(path: &Path, include_hidden: bool, exclude: Option<&GlobSet>) -> bool {
    if !include_hidden && has_hidden_component(path) {
        return true;
    }
    exclude.is_some_and(|set| set.is_match(normalize_slashes(path).as_str()))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn has_hidden_component(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.') && name != "." && name != "..")
}

fn normalize_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn detect_binary(path: &Path) -> Result<bool> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("opening '{}' for binary detection", path.display()))?;
    let mut buf = [0u8; BINARY_CHECK_BYTES];
    let read = file.read(&mut buf)?;
    Ok(buf[..read].contains(&0))
}

fn build_exclude_globs(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).map_err(|err| anyhow!("invalid exclude glob '{pattern}': {err}"))?;
        builder.add(glob);
    }

    builder
        .build()
        .map(Some)
        .map_err(|err| anyhow!("unable to build exclude globs: {err}"))
}

/// Copies `path` to the first free `name.bak`, `name.bak1`, ... slot.
pub fn create_backup(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut attempt = 0usize;
    loop {
        let candidate = backup_candidate(path, attempt);
        if !candidate.exists() {
            fs::copy(path, &candidate)
                .with_context(|| format!("creating backup {}", candidate.display()))?;
            return Ok(Some(candidate));
        }
        attempt += 1;
    }
}

fn backup_candidate(path: &Path, index: usize) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("asciify_file");
    let suffix = if index == 0 {
        ".bak".to_string()
    } else {
        format!(".bak{index}")
    };
    path.with_file_name(format!("{name}{suffix}"))
}

/// Writes through a sibling temp file and renames it over `path`.
pub fn write_via_temp(path: &Path, data: &[u8]) -> Result<()> {
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let unique = format!(
        ".asciify-tmp-{}-{}",
        std::process::id(),
        OffsetDateTime::now_utc().unix_timestamp_nanos()
    );
    let temp_path = base_dir.join(unique);
    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("creating temp file {}", temp_path.display()))?;
        file.write_all(data)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("syncing temp file {}", temp_path.display()))?;
    }
    fs::rename(&temp_path, path).or_else(|err| {
        let _ = fs::remove_file(&temp_path);
        Err(err).with_context(|| format!("replacing {}", path.display()))
    })?;
    Ok(())
}
