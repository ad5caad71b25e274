//! Converts Latin-1 high-bit characters in a text region to plain 7-bit
//! ASCII, so outgoing mail and news text does not need quoted-printable.
//!
//! The engine is table driven: a [`table::ReplacementTable`] maps code points
//! to replacement text, [`scan::scan_and_replace`] walks a region of a
//! [`buffer::TextBuffer`] and the [`convert`] functions add strict and
//! interactive policies on top. The editing environment is abstracted as a
//! [`host::Host`].

pub mod buffer;
pub mod config;
pub mod convert;
pub mod error;
pub mod host;
pub mod scan;
pub mod table;

pub use buffer::{InsertionType, MarkerId, TextBuffer};
pub use convert::{
    ConversionReport, RegionArgs, convert_region, convert_region_interactive,
    convert_region_interactive_with_report, convert_region_with_report,
    region_has_uncovered_8bit,
};
pub use error::ConvertError;
pub use host::{ConfirmPrompt, Decision, Host, TerminalHost};
pub use scan::{Candidate, MatchAction, Uncovered, has_uncovered_8bit, scan_and_replace};
pub use table::ReplacementTable;
