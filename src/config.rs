use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::table::{ReplacementTable, describe_code};

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TableBase {
    #[default]
    Latin1,
    Control,
    Empty,
}

impl TableBase {
    fn table(self) -> ReplacementTable {
        match self {
            TableBase::Latin1 => ReplacementTable::latin1(),
            TableBase::Control => ReplacementTable::control(),
            TableBase::Empty => ReplacementTable::empty(),
        }
    }
}

/// Table override file. Keys accept `0xA9`, `U+00A9`, `\251`, `169` or the
/// character itself.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    #[serde(default)]
    pub base: TableBase,
    /// Added in file order, after the base table's own entries.
    #[serde(default, deserialize_with = "ordered_entries")]
    pub entries: Vec<(String, String)>,
    #[serde(default)]
    pub remove: Vec<String>,
}

impl TableConfig {
    pub fn build(&self) -> Result<ReplacementTable> {
        let mut table = self.base.table();
        for raw in &self.remove {
            let code = parse_code_point(raw)?;
            table.remove(code);
        }
        for (raw, replacement) in &self.entries {
            let code = parse_code_point(raw)?;
            self.check_key(code)?;
            table
                .insert(code, replacement.clone())
                .with_context(|| format!("table entry '{raw}'"))?;
        }
        Ok(table)
    }

    fn check_key(&self, code: u8) -> Result<()> {
        let control = code < 0x20 || code == 0x7F;
        match self.base {
            TableBase::Control if !control => bail!(
                "{} is not a control character; control tables only map 0x00-0x1F and 0x7F",
                describe_code(code)
            ),
            TableBase::Latin1 | TableBase::Empty if code < 0x80 => bail!(
                "{} is below 0x80; high-bit tables only map 0x80-0xFF",
                describe_code(code)
            ),
            _ => Ok(()),
        }
    }
}

fn ordered_entries<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of code point to replacement text")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, String>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

pub fn load_table_config(path: &Path) -> Result<TableConfig> {
    let data = fs::read(path).with_context(|| format!("reading table {}", path.display()))?;
    if path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
    {
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
    } else {
        serde_yaml::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
    }
}

/// The table a command runs with: an override file when given, otherwise the
/// built-in high-bit table or, with `control`, the control table.
pub fn resolve_table(path: Option<&Path>, control: bool) -> Result<ReplacementTable> {
    match path {
        Some(path) => {
            let config = load_table_config(path)?;
            if control && config.base != TableBase::Control {
                bail!("--control conflicts with table file base {:?}", config.base);
            }
            config.build()
        }
        None if control => Ok(ReplacementTable::control()),
        None => Ok(ReplacementTable::latin1()),
    }
}

pub fn parse_code_point(raw: &str) -> Result<u8> {
    let trimmed = raw.trim();
    let value = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .or_else(|| trimmed.strip_prefix("U+"))
        .or_else(|| trimmed.strip_prefix("u+"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(octal) = trimmed.strip_prefix('\\').filter(|rest| !rest.is_empty()) {
        u32::from_str_radix(octal, 8).ok()
    } else if !trimmed.is_empty() && trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        trimmed.parse::<u32>().ok()
    } else {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(u32::from(ch)),
            _ => None,
        }
    };

    let value = value.ok_or_else(|| anyhow!("unrecognised code point '{raw}'"))?;
    u8::try_from(value).map_err(|_| anyhow!("code point '{raw}' is above 0xFF"))
}
