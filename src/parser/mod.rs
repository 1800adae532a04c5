//! Scanner output parsers.
//!
//! Both parsers accumulate into a private draft and hand back a partially
//! defaulted `ScanResult`; [`crate::normalize`] applies the shared finishing
//! rules.

mod draft;
mod text;
mod xml;

pub use text::parse_text;
pub use xml::parse_xml;

use crate::error::ParseFailure;
use crate::runner::OutputMode;
use crate::types::ScanResult;

/// Parse raw scanner output with the parser matching `mode`.
pub fn parse(raw: &str, mode: OutputMode) -> Result<ScanResult, ParseFailure> {
    match mode {
        OutputMode::Text => parse_text(raw),
        OutputMode::Xml => parse_xml(raw),
    }
}
