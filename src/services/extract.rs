//! Link extraction from raw message text.
//!
//! Scans chat-formatted `<URL>` / `<URL|label>` tokens outside of code
//! spans, filters them through the intent classifier, and returns the raw
//! links deduplicated in first-seen order.

use crate::services::intent::is_intentional_link;
use regex::Regex;
use std::collections::HashSet;
use tracing::trace;

/// Extracts candidate links from message text.
///
/// All patterns are compiled once at construction and scoped to the
/// instance, so extractors are cheap to share and trivial to test in
/// isolation.
#[derive(Debug)]
pub struct LinkExtractor {
    /// Fenced ``` blocks, including newlines.
    fenced_code: Regex,
    /// Inline `code` spans on a single line.
    inline_code: Regex,
    /// Chat link tokens: `<URL>` or `<URL|label>`.
    link_token: Regex,
    /// Numeric operand of a karma-style `+=` / `-=` command.
    karma_operand: Regex,
}

impl LinkExtractor {
    /// Creates an extractor with its patterns compiled.
    #[must_use]
    #[allow(clippy::expect_used)] // static patterns, guaranteed to compile
    pub fn new() -> Self {
        Self {
            fenced_code: Regex::new(r"(?s)```.*?```").expect("static regex: fenced code"),
            inline_code: Regex::new(r"`[^`\n]+`").expect("static regex: inline code"),
            link_token: Regex::new(r"<([^<>|]+)(?:\|[^<>]*)?>").expect("static regex: link token"),
            karma_operand: Regex::new(r"[+-]=\s*<?\d+(?:\.\d+)*>?")
                .expect("static regex: karma operand"),
        }
    }

    /// Extracts intentional links from `text`.
    ///
    /// Returns raw link tokens (without brackets or display labels) in
    /// first-occurrence order, deduplicated by exact raw string.
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<String> {
        let sanitized = self.blank_non_link_regions(text);

        let mut seen: HashSet<&str> = HashSet::new();
        let mut links: Vec<String> = Vec::new();

        for captures in self.link_token.captures_iter(&sanitized) {
            let Some(token) = captures.get(1) else {
                continue;
            };
            let token = token.as_str().trim();

            // User and channel mentions share the token syntax.
            if token.starts_with('@') || token.starts_with('#') {
                continue;
            }
            // IP addresses, version strings, and dates parse as domains but
            // are never link shares.
            if is_numeric_token(token) {
                trace!(token, "skipping numeric token");
                continue;
            }
            if !is_intentional_link(token) {
                trace!(token, "skipping unintentional link");
                continue;
            }
            if seen.insert(token) {
                links.push(token.to_string());
            }
        }

        metrics::counter!("relink_links_extracted_total").increment(links.len() as u64);
        links
    }

    /// Blanks code spans and karma operands with equal-length whitespace.
    ///
    /// Filling the matched byte ranges with spaces keeps every other byte at
    /// its original offset, so the link scan cannot land inside a blanked
    /// region. Matches always start and end on character boundaries, which
    /// keeps the buffer valid UTF-8.
    fn blank_non_link_regions(&self, text: &str) -> String {
        let mut buf = text.as_bytes().to_vec();
        for pattern in [&self.fenced_code, &self.inline_code, &self.karma_operand] {
            for found in pattern.find_iter(text) {
                buf[found.range()].fill(b' ');
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// A scheme-less token made of digits, dots, and at most a port separator:
/// an IP address, a version string, or a date, never a shared link.
fn is_numeric_token(token: &str) -> bool {
    if token.contains("://") || token.is_empty() {
        return false;
    }
    token
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == ':')
}
