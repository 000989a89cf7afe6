//! Text traces, one access per line:
//!
//! ```text
//! # comment
//! L 0x0000000000001000
//! S 1040
//! ```
//!
//! The operation is `L`/`R` for loads or `S`/`W` for stores, in either case. Addresses are
//! hexadecimal, with an optional `0x` prefix. Blank lines and lines starting with `#` are skipped

use std::str;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::simulator::{Access, AccessKind};

lazy_static! {
    static ref ACCESS_PATTERN: Regex =
        Regex::new(r"^\s*(?P<op>[LlRrSsWw])\s+(?:0[xX])?(?P<address>[0-9a-fA-F]{1,16})\s*$")
            .expect("the access pattern is a valid regex");
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("couldn't read the trace: {0}")]
    Io(#[from] std::io::Error),
    #[error("the trace isn't valid UTF-8: {0}")]
    NotUtf8(#[from] str::Utf8Error),
    #[error("line {line} of the trace isn't an access: `{content}`")]
    Malformed { line: usize, content: String },
}

/// Parses one line of a trace
///
/// returns: `None` if the line isn't an access, including blank lines and comments
///
/// # Examples
///
/// ```
/// use stratumlib::simulator::Access;
/// use stratumlib::trace::parse_access;
/// assert_eq!(parse_access("S 0x1f"), Some(Access::store(0x1f)));
/// assert_eq!(parse_access("load 10"), None);
/// ```
pub fn parse_access(line: &str) -> Option<Access> {
    let captures = ACCESS_PATTERN.captures(line)?;
    let kind = match captures.name("op")?.as_str() {
        "L" | "l" | "R" | "r" => AccessKind::Load,
        _ => AccessKind::Store,
    };
    // At most 16 hex digits, so this always fits
    let address = u64::from_str_radix(captures.name("address")?.as_str(), 16).ok()?;
    Some(Access { address, kind })
}

/// Parses a whole trace, in order
///
/// # Arguments
///
/// * `bytes`: The contents of a trace file
///
/// returns: Result<Vec<Access>, TraceError>
pub fn parse_trace(bytes: &[u8]) -> Result<Vec<Access>, TraceError> {
    let text = str::from_utf8(bytes)?;
    let mut accesses = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_access(trimmed) {
            Some(access) => accesses.push(access),
            None => {
                return Err(TraceError::Malformed {
                    line: index + 1,
                    content: line.to_string(),
                })
            }
        }
    }
    Ok(accesses)
}
