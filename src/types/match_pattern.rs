//! WebExtension-style URL match patterns (`*://*.youtube.com/*`).
//!
//! A pattern is `<scheme>://<host><path>`. The scheme `*` stands for `http`
//! or `https`; a host of `*` matches anything and `*.example.com` matches
//! `example.com` and all of its subdomains; `*` in the path matches any run
//! of characters. Ports and fragments are ignored.

use std::fmt;

use regex::Regex;

use super::errors::ConfigError;

#[derive(Debug, Clone)]
pub struct MatchPattern {
    source: String,
    regex: Regex,
}

impl MatchPattern {
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = pattern
            .split_once("://")
            .ok_or_else(|| invalid("missing '://'"))?;
        let (host, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => return Err(invalid("missing path")),
        };

        let scheme_re = match scheme {
            "*" => "https?".to_string(),
            "http" | "https" | "file" | "ws" | "wss" => regex::escape(scheme),
            _ => return Err(invalid("unsupported scheme")),
        };

        let host_re = if host == "*" {
            "[^/:]*".to_string()
        } else if let Some(domain) = host.strip_prefix("*.") {
            if domain.is_empty() || domain.contains('*') {
                return Err(invalid("wildcard host must be '*' or '*.<domain>'"));
            }
            format!(r"(?:[^/:]*\.)?{}", regex::escape(domain))
        } else if host.contains('*') {
            return Err(invalid("wildcard host must be '*' or '*.<domain>'"));
        } else {
            regex::escape(host)
        };

        let path_re = path
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let full = format!(r"(?i)^{scheme_re}://{host_re}(?::\d+)?{path_re}$");
        let regex = Regex::new(&full).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, url: &str) -> bool {
        let without_fragment = url.split('#').next().unwrap_or(url);
        self.regex.is_match(without_fragment)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for MatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for MatchPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Extracts the host of an absolute URL, without port or credentials.
pub fn host_of(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(&['/', '?', '#'][..]).next().unwrap_or(rest);
    let host_port = authority.rsplit('@').next().unwrap_or(authority);
    let host = host_port.split(':').next().unwrap_or(host_port);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// True if `host` is `domain` itself or one of its subdomains.
pub fn host_in_domain(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();
    host == domain || host.ends_with(&format!(".{domain}"))
}
