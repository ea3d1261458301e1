//! Record extraction from Scoop's text output.
//!
//! Scoop prints human-oriented tables, not a structured format, so extraction
//! is a best-effort scrape: lines that do not match the expected shape
//! (headers, separators, blank lines, warnings) simply produce no record.

use once_cell::sync::Lazy;
use regex::Regex;
use scoopdeck_types::AppEntry;
use tracing::trace;

/// Bucket name of the default Scoop manifest source.
pub const DEFAULT_BUCKET: &str = "scoop";

/// Bucket label for list entries that carry no `[bucket]` suffix.
pub const LOCAL_BUCKET_LABEL: &str = "(scoop)";

/// Regex for `scoop list` rows
/// Matches patterns like:
/// - "  7zip        19.00       [extras]"
/// - "  git         2.31.1"
static LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+(\S+)\s+(\S+)(\s+\[(\S+)\])?$").expect("Invalid list regex")
});

/// Regex for `scoop status` rows, e.g. "  git: 2.30.0 -> 2.31.1"
static STATUS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+(\S+):\s+(\S+)\s+->\s+(\S+)$").expect("Invalid status regex")
});

/// Which command's output a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    List,
    Status,
    Bucket,
}

/// A record scraped from one output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    App(AppEntry),
    Bucket(String),
}

/// Extract a record from a single line, or `None` if the line does not match.
pub fn extract(line: &str, mode: ExtractMode) -> Option<Record> {
    let record = match mode {
        ExtractMode::List => LIST_RE.captures(line).map(|caps| {
            Record::App(AppEntry {
                name: caps[1].to_string(),
                version: Some(caps[2].to_string()),
                latest: None,
                bucket: Some(
                    caps.get(4)
                        .map_or(LOCAL_BUCKET_LABEL, |m| m.as_str())
                        .to_string(),
                ),
            })
        }),
        ExtractMode::Status => STATUS_RE.captures(line).map(|caps| {
            Record::App(AppEntry {
                name: caps[1].to_string(),
                version: Some(caps[2].to_string()),
                latest: Some(caps[3].to_string()),
                bucket: None,
            })
        }),
        ExtractMode::Bucket => {
            (!line.trim().is_empty()).then(|| Record::Bucket(line.to_string()))
        }
    };

    if record.is_none() {
        trace!(target: "scoopdeck::parser", "No {:?} record in line: {:?}", mode, line);
    }
    record
}
