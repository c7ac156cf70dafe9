//! Parsing of the HTTP `Accept` header.
//!
//! Every comma separated media range becomes a [`MediaTypeEntry`] keyed by
//! its trimmed text. Parsing never fails: anything that does not fit the
//! grammar is recorded with default values (`quality = 1.0`, empty type
//! structure) so a client-supplied header can never abort a request.
//!
//! See <http://www.w3.org/Protocols/rfc2616/rfc2616-sec14.html> and
//! <http://www.ietf.org/rfc/rfc3023.txt>.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};

use crate::errors::PulseError;

/// Media range followed by a `q` or `level` parameter.
static QUALITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\S+)\s*;\s*(?:q|level)=([0-9.]+)").expect("quality pattern is valid")
});

/// `(type)/(subtype)+(suffix)`
static STRUCTURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([^/]+)/([^+]+)\+?(.*)").expect("structure pattern is valid")
});

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*").expect("separator pattern is valid"));

/// One media range of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaTypeEntry {
    /// The trimmed token as it appeared in the header.
    pub raw: String,
    /// The media range without its `q` / `level` parameter.
    pub media: String,
    /// Quality value in `[0.0, 1.0]`, `1.0` when absent or unparseable.
    pub quality: f64,
    /// Part before `/`, e.g. `application`.
    pub media_type: String,
    /// Part between `/` and an optional `+`, e.g. `vnd.pulse.v1`.
    pub sub_type: String,
    /// Structured syntax suffix after `+`, e.g. `json`.
    pub suffix: String,
}

impl MediaTypeEntry {
    /// Parses a single media range.
    pub fn parse(token: &str) -> Self {
        let (media, quality) = match QUALITY_RE.captures(token) {
            Some(caps) => {
                let quality = caps[2]
                    .parse::<f64>()
                    .map(|q| q.clamp(0.0, 1.0))
                    .unwrap_or(1.0);
                (caps[1].to_string(), quality)
            }
            None => (token.to_string(), 1.0),
        };

        let (media_type, sub_type, suffix) = match STRUCTURE_RE.captures(&media) {
            Some(caps) => (
                caps[1].to_string(),
                caps[2].to_string(),
                caps[3].to_string(),
            ),
            None => (String::new(), String::new(), String::new()),
        };

        Self {
            raw: token.to_string(),
            media,
            quality,
            media_type,
            sub_type,
            suffix,
        }
    }
}

/// All media ranges of one `Accept` header, in the order they first appeared.
///
/// A token that occurs twice keeps its first position; the later occurrence
/// replaces the stored entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAccept {
    types: IndexMap<String, MediaTypeEntry>,
}

impl ParsedAccept {
    /// Parses a raw header value.
    ///
    /// An empty (or blank) header yields a single degenerate entry keyed by
    /// the empty string.
    ///
    /// ```
    /// use pulse_server::http::accept::ParsedAccept;
    ///
    /// let accept = ParsedAccept::parse("audio/*; q=0.2, audio/basic");
    /// assert_eq!(accept.raw_types(), vec!["audio/*; q=0.2", "audio/basic"]);
    /// assert_eq!(accept.get("audio/*; q=0.2").unwrap().quality, 0.2);
    /// ```
    pub fn parse(header: &str) -> Self {
        let mut types = IndexMap::new();

        for token in SEPARATOR_RE.split(header).map(str::trim) {
            if !token.is_empty() {
                types.insert(token.to_string(), MediaTypeEntry::parse(token));
            }
        }

        if types.is_empty() {
            types.insert(String::new(), MediaTypeEntry::parse(""));
        }

        Self { types }
    }

    /// The raw tokens, in header order.
    pub fn raw_types(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    /// Raw token → entry, in header order.
    pub fn types(&self) -> &IndexMap<String, MediaTypeEntry> {
        &self.types
    }

    /// Entry stored under a raw token.
    pub fn get(&self, raw: &str) -> Option<&MediaTypeEntry> {
        self.types.get(raw)
    }

    /// Earliest entry in the header.
    pub fn first(&self) -> Option<&MediaTypeEntry> {
        self.types.first().map(|(_, entry)| entry)
    }

    /// Number of distinct raw tokens.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Only true for a filtered subset; a parsed header always has an entry.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// `(raw, entry)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MediaTypeEntry)> {
        self.types.iter().map(|(raw, entry)| (raw.as_str(), entry))
    }

    /// Entries whose raw token contains a match for `re`.
    pub fn filter(&self, re: &Regex) -> Self {
        let types = self
            .types
            .iter()
            .filter(|(raw, _)| re.is_match(raw))
            .map(|(raw, entry)| (raw.clone(), entry.clone()))
            .collect();

        Self { types }
    }

    /// Compiles `pattern` case-insensitively and returns the matching
    /// entries. The pattern is not anchored.
    ///
    /// Fails only when `pattern` is not a valid regular expression.
    pub fn types_matching(&self, pattern: &str) -> Result<Self, PulseError> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(PulseError::InvalidPattern)?;

        Ok(self.filter(&re))
    }
}

impl<'a> IntoIterator for &'a ParsedAccept {
    type Item = &'a MediaTypeEntry;
    type IntoIter = indexmap::map::Values<'a, String, MediaTypeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.values()
    }
}
