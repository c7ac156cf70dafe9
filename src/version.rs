//! API version negotiation.
//!
//! Clients pick an API version through a vendor media type in `Accept`:
//!
//! ```text
//! Accept: application/vnd.pulse.v2+json
//! ```
//!
//! Anything else falls back to the configured default version.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::http::accept::ParsedAccept;

/// Where a negotiated version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// A vendor media type in the Accept value.
    Accept,
    /// No usable vendor media type; the default was used.
    Default,
}

/// Major API version selected for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion {
    pub number: u32,
    pub source: VersionSource,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number)
    }
}

/// Maps a parsed Accept value to an [`ApiVersion`].
#[derive(Debug, Clone)]
pub struct VersionNegotiator {
    default_version: u32,
    /// Selects `application/<vendor>` entries by raw token.
    media_re: Regex,
    /// Pulls the version digits out of the sub type.
    version_re: Regex,
}

impl VersionNegotiator {
    pub fn new(vendor: &str, default_version: u32) -> Self {
        let escaped = regex::escape(vendor);

        // Both patterns are built from an escaped literal and cannot fail.
        let media_re = RegexBuilder::new(&format!("application/{escaped}"))
            .case_insensitive(true)
            .build()
            .expect("escaped vendor pattern is valid");
        let version_re = RegexBuilder::new(&format!(r"^{escaped}\.v(\d+)"))
            .case_insensitive(true)
            .build()
            .expect("escaped vendor pattern is valid");

        Self {
            default_version,
            media_re,
            version_re,
        }
    }

    pub fn default_version(&self) -> ApiVersion {
        ApiVersion {
            number: self.default_version,
            source: VersionSource::Default,
        }
    }

    /// Only the first vendor entry, in header order, is consulted.
    pub fn negotiate(&self, accept: &ParsedAccept) -> ApiVersion {
        let vendor_types = accept.filter(&self.media_re);

        let number = vendor_types
            .first()
            .and_then(|entry| self.version_re.captures(&entry.sub_type))
            .and_then(|caps| caps[1].parse::<u32>().ok());

        match number {
            Some(number) => ApiVersion {
                number,
                source: VersionSource::Accept,
            },
            None => self.default_version(),
        }
    }

    /// Convenience for a raw header value.
    pub fn negotiate_header(&self, header: &str) -> ApiVersion {
        self.negotiate(&ParsedAccept::parse(header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn negotiator() -> VersionNegotiator {
        VersionNegotiator::new("vnd.pulse", 1)
    }

    #[rstest]
    #[case("application/vnd.pulse.v2+json", 2)]
    #[case("application/vnd.pulse.v12", 12)]
    #[case("text/html, application/vnd.pulse.v3+json;q=0.8", 3)]
    #[case("APPLICATION/VND.PULSE.V4+JSON", 4)]
    fn picks_version_from_vendor_media_type(#[case] header: &str, #[case] expected: u32) {
        let version = negotiator().negotiate_header(header);

        assert_eq!(version.number, expected);
        assert_eq!(version.source, VersionSource::Accept);
    }

    #[rstest]
    #[case("")]
    #[case("application/json")]
    #[case("application/vnd.pulse+json")]
    #[case("application/vnd.pulse.vX+json")]
    #[case("application/vnd.pulse.v99999999999+json")]
    #[case("application/vnd.other.v2+json")]
    fn falls_back_to_default(#[case] header: &str) {
        let version = negotiator().negotiate_header(header);

        assert_eq!(version, negotiator().default_version());
    }

    #[test]
    fn first_vendor_entry_wins() {
        let version =
            negotiator().negotiate_header("application/vnd.pulse+json, application/vnd.pulse.v2+json");

        assert_eq!(version.source, VersionSource::Default);
    }

    #[test]
    fn vendor_is_matched_literally() {
        let negotiator = VersionNegotiator::new("vnd.a+b", 5);

        assert_eq!(negotiator.negotiate_header("application/vnd.aab.v2").number, 5);
    }

    #[test]
    fn displays_as_namespace() {
        assert_eq!(negotiator().default_version().to_string(), "v1");
    }
}
