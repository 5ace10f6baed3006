//! Shared helpers: secret handling and free-text hygiene

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static LEADING_BLOCK_MARKERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[#>\s]+").unwrap());
static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// A string wrapper that masks its contents in Debug/Display output.
/// Keeps the generation API key out of logs and error messages.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Access the raw secret (request headers, query strings).
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Normalise user-typed text before it is placed inside a prompt.
///
/// Control characters are dropped, every whitespace run (newlines included)
/// becomes one space, backticks become single quotes and leading markdown
/// heading and quote markers (`#`, `>`) are stripped. Nothing else is
/// removed, so ordinary prose such as "hamstring strain" or
/// "-15 degree extension deficit" comes through unchanged.
pub fn sanitize_free_text(input: &str) -> String {
    let visible: String = input
        .chars()
        .map(|c| match c {
            '`' => '\'',
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '\u{0}',
            c => c,
        })
        .filter(|c| *c != '\u{0}')
        .collect();

    let collapsed = WHITESPACE_RUN.replace_all(&visible, " ");
    let stripped = LEADING_BLOCK_MARKERS.replace(collapsed.trim(), "");

    stripped.trim().to_string()
}

/// Lowercase, dash-separated form used in file names ("Fast Bowler" -> "fast-bowler").
pub fn slugify(input: &str) -> String {
    let lower = input.to_lowercase();
    NON_SLUG.replace_all(&lower, "-").trim_matches('-').to_string()
}
