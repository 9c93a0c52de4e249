//! Line-number remapping for shader compiler output.
//!
//! GL info logs report positions as `<source>:<line>` (for example
//! `ERROR: 0:12: 'foo' : undeclared identifier`). Lines count from the top of
//! the composed source, header included. [`remap_diagnostic`] shifts every
//! such line number back by the header length so it points into the
//! caller's own pass body.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static POSITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+):(\d+)").expect("position pattern is valid"));

/// Rewrites every `A:B` token in `log` to `A:(B - injected_lines)`.
///
/// Numbers are rewritten as signed values; a position inside the header
/// comes out as zero or negative.
pub fn remap_diagnostic(log: &str, injected_lines: usize) -> String {
    let offset = injected_lines as i64;
    POSITION
        .replace_all(log, |caps: &Captures| match caps[2].parse::<i64>() {
            Ok(line) => format!("{}:{}", &caps[1], line - offset),
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}
