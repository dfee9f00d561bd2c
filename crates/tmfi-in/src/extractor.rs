//! Record extraction from free-form generator output.
//!
//! Four strategies are tried in order; each returns its own `ParseError`
//! and the first success wins:
//! 1. the whole text
//! 2. a ```` ```json ```` fenced block
//! 3. any fenced block, minus a first-line language tag
//! 4. the first balanced `{ ... }` span

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tmfi_core::{IngestError, Record};

lazy_static! {
    /// Fenced block tagged `json` (any case)
    static ref TAGGED_FENCE: Regex = Regex::new(r"(?is)```[ \t]*json\b(.*?)```").unwrap();

    /// Any fenced block
    static ref ANY_FENCE: Regex = Regex::new(r"(?s)```(.*?)```").unwrap();

    /// A bare language tag on the first line of a fence
    static ref LANG_TAG: Regex = Regex::new(r"^[A-Za-z0-9_+.-]+$").unwrap();
}

/// Extraction strategy, in the order they are attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Direct,
    TaggedFence,
    AnyFence,
    BraceScan,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Direct,
        Strategy::TaggedFence,
        Strategy::AnyFence,
        Strategy::BraceScan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::TaggedFence => "tagged_fence",
            Strategy::AnyFence => "any_fence",
            Strategy::BraceScan => "brace_scan",
        }
    }

    fn parse(&self, text: &str) -> Result<Record, ParseError> {
        match self {
            Strategy::Direct => parse_record(text.trim()),
            Strategy::TaggedFence => parse_fences(&TAGGED_FENCE, text, str::trim),
            Strategy::AnyFence => parse_fences(&ANY_FENCE, text, strip_lang_tag),
            Strategy::BraceScan => parse_record(first_balanced_object(text).ok_or(ParseError::NotFound("balanced object"))?),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single strategy did not produce a record
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("no {0} found")]
    NotFound(&'static str),

    #[error("invalid JSON: {0}")]
    Json(String),

    #[error(transparent)]
    Shape(#[from] IngestError),
}

/// Every strategy failed; terminal for this input
#[derive(Debug, Clone, Error, PartialEq)]
#[error("failed to extract")]
pub struct ExtractionFailure {
    pub attempts: Vec<(Strategy, ParseError)>,
}

/// A record plus the strategy that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub record: Record,
    pub strategy: Strategy,
}

/// Extract a record from generator output
pub fn extract(text: &str) -> Result<Record, ExtractionFailure> {
    extract_with_strategy(text).map(|e| e.record)
}

/// Like [`extract`], also reporting which strategy succeeded
pub fn extract_with_strategy(text: &str) -> Result<Extraction, ExtractionFailure> {
    let mut attempts = Vec::new();

    for strategy in Strategy::ALL {
        match strategy.parse(text) {
            Ok(record) => {
                tracing::debug!(strategy = %strategy, failed_before = attempts.len(), "record extracted");
                return Ok(Extraction { record, strategy });
            }
            Err(e) => attempts.push((strategy, e)),
        }
    }

    tracing::debug!(attempts = attempts.len(), "extraction failed");
    Err(ExtractionFailure { attempts })
}

fn parse_record(candidate: &str) -> Result<Record, ParseError> {
    let value: Value = serde_json::from_str(candidate).map_err(|e| ParseError::Json(e.to_string()))?;
    Ok(Record::from_json(value)?)
}

/// Try every match of `fence` in turn; the first that parses wins
fn parse_fences(fence: &Regex, text: &str, body: fn(&str) -> &str) -> Result<Record, ParseError> {
    let mut last = ParseError::NotFound("fenced block");
    for caps in fence.captures_iter(text) {
        let inner = caps.get(1).map_or("", |m| m.as_str());
        match parse_record(body(inner)) {
            Ok(record) => return Ok(record),
            Err(e) => last = e,
        }
    }
    Err(last)
}

fn strip_lang_tag(inner: &str) -> &str {
    match inner.split_once('\n') {
        Some((first, rest)) if LANG_TAG.is_match(first.trim()) => rest.trim(),
        _ => inner.trim(),
    }
}

/// Span from the first `{` to its matching `}`; quoted braces are not special
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, c) in text[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
