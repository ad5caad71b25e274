use std::borrow::Cow;
use std::fmt;

use anyhow::{Result, anyhow};
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252, mem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSource {
    Override,
    Bom,
    Detector,
    AssumedUtf8,
}

impl fmt::Display for EncodingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EncodingSource::Override => "override",
            EncodingSource::Bom => "bom",
            EncodingSource::Detector => "detector",
            EncodingSource::AssumedUtf8 => "assumed-utf8",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EncodingDecision {
    pub encoding: &'static Encoding,
    pub source: EncodingSource,
}

impl EncodingDecision {
    /// `encoding_rs` resolves `latin1` and `iso-8859-1` to windows-1252. Those
    /// files are read byte for byte so every byte keeps its ISO-8859-1 code
    /// point, which is what the replacement tables are keyed on.
    pub fn is_latin1(&self) -> bool {
        self.encoding == WINDOWS_1252
    }

    pub fn label(&self) -> &'static str {
        if self.is_latin1() {
            "ISO-8859-1"
        } else {
            self.encoding.name()
        }
    }

    /// `ISO-8859-1 (override)` style label for messages and events.
    pub fn describe(&self) -> String {
        format!("{} ({})", self.label(), self.source)
    }

    /// Encodes `text` for writing back. Returns the bytes and whether any
    /// character could not be represented.
    pub fn encode<'a>(&self, text: &'a str) -> (Cow<'a, [u8]>, bool) {
        if self.is_latin1() {
            let unmappable = text.chars().any(|ch| u32::from(ch) > 0xFF);
            return (mem::encode_latin1_lossy(text), unmappable);
        }
        let (bytes, _, had_errors) = self.encoding.encode(text);
        (bytes, had_errors)
    }
}

#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub had_errors: bool,
    pub decision: EncodingDecision,
}

#[derive(Debug, Clone)]
pub struct EncodingStrategy {
    override_encoding: Option<&'static Encoding>,
    override_label: Option<String>,
}

impl EncodingStrategy {
    pub fn new(override_label: Option<&str>) -> Result<Self> {
        if let Some(label) = override_label {
            let trimmed = label.trim();
            let encoding = Encoding::for_label(trimmed.as_bytes())
                .ok_or_else(|| anyhow!("unknown encoding override '{trimmed}'"))?;
            Ok(Self {
                override_encoding: Some(encoding),
                override_label: Some(trimmed.to_string()),
            })
        } else {
            Ok(Self {
                override_encoding: None,
                override_label: None,
            })
        }
    }

    pub fn describe(&self) -> String {
        if let (Some(label), Some(enc)) = (&self.override_label, self.override_encoding) {
            format!(
                "override '{}' ({}), auto-detect disabled",
                label,
                enc.name()
            )
        } else {
            "auto-detect (BOM → UTF-8 → detector, windows-1252 read as ISO-8859-1)".to_string()
        }
    }

    pub fn decide(&self, bytes: &[u8]) -> EncodingDecision {
        if let Some(encoding) = self.override_encoding {
            return EncodingDecision {
                encoding,
                source: EncodingSource::Override,
            };
        }

        detect_auto(bytes)
    }

    pub fn decode(&self, bytes: &[u8]) -> DecodedText {
        let decision = self.decide(bytes);
        if decision.is_latin1() {
            return DecodedText {
                text: mem::decode_latin1(bytes).into_owned(),
                had_errors: false,
                decision,
            };
        }
        let (cow, _encoding_used, had_errors) = decision.encoding.decode(bytes);
        DecodedText {
            text: cow.into_owned(),
            had_errors,
            decision,
        }
    }
}

fn detect_auto(bytes: &[u8]) -> EncodingDecision {
    if let Some(encoding) = detect_bom(bytes) {
        return EncodingDecision {
            encoding,
            source: EncodingSource::Bom,
        };
    }

    if std::str::from_utf8(bytes).is_ok() {
        return EncodingDecision {
            encoding: UTF_8,
            source: EncodingSource::AssumedUtf8,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    EncodingDecision {
        encoding,
        source: EncodingSource::Detector,
    }
}

fn detect_bom(bytes: &[u8]) -> Option<&'static Encoding> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Some(UTF_8);
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Some(UTF_16LE);
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Some(UTF_16BE);
    }

    None
}
