//! `Cache-Control` parsing (RFC 7234 §5.2).
//!
//! Parsing is lenient: unknown directives are kept as extensions and a
//! malformed delta-seconds value is dropped with a warning. A bad header never
//! fails a fetch.

/// Largest delta-seconds value kept; larger values are clamped (RFC 7234 §1.2.1).
pub const DELTA_SECONDS_MAX: u64 = 2_147_483_648;

/// `max-stale` on a request, with or without a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxStale {
    Any,
    Seconds(u64),
}

/// Directives a client sent with its request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDirectives {
    pub max_age: Option<u64>,
    pub max_stale: Option<MaxStale>,
    pub min_fresh: Option<u64>,
    pub no_cache: bool,
    pub no_store: bool,
    pub no_transform: bool,
    pub only_if_cached: bool,
    pub extensions: Vec<String>,
}

/// Directives an origin sent with its response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseDirectives {
    pub must_revalidate: bool,
    pub no_cache: bool,
    /// Field names from `no-cache="..."`.
    pub no_cache_fields: Vec<String>,
    pub no_store: bool,
    pub no_transform: bool,
    pub public: bool,
    pub private: bool,
    /// Field names from `private="..."`.
    pub private_fields: Vec<String>,
    pub proxy_revalidate: bool,
    pub max_age: Option<u64>,
    pub s_maxage: Option<u64>,
    pub immutable: bool,
    pub extensions: Vec<String>,
}

impl RequestDirectives {
    pub fn parse(header: &str) -> Self {
        let mut out = Self::default();
        for (name, value) in tokenize(header) {
            match name.as_str() {
                "max-age" => out.max_age = delta_seconds(&name, value.as_deref()),
                "max-stale" => {
                    out.max_stale = match value.as_deref() {
                        None => Some(MaxStale::Any),
                        Some(v) => delta_seconds(&name, Some(v)).map(MaxStale::Seconds),
                    }
                }
                "min-fresh" => out.min_fresh = delta_seconds(&name, value.as_deref()),
                "no-cache" => out.no_cache = true,
                "no-store" => out.no_store = true,
                "no-transform" => out.no_transform = true,
                "only-if-cached" => out.only_if_cached = true,
                _ => out.extensions.push(extension(&name, value.as_deref())),
            }
        }
        out
    }
}

impl ResponseDirectives {
    pub fn parse(header: &str) -> Self {
        let mut out = Self::default();
        for (name, value) in tokenize(header) {
            match name.as_str() {
                "must-revalidate" => out.must_revalidate = true,
                "no-cache" => {
                    out.no_cache = true;
                    out.no_cache_fields.extend(field_names(value.as_deref()));
                }
                "no-store" => out.no_store = true,
                "no-transform" => out.no_transform = true,
                "public" => out.public = true,
                "private" => {
                    out.private = true;
                    out.private_fields.extend(field_names(value.as_deref()));
                }
                "proxy-revalidate" => out.proxy_revalidate = true,
                "max-age" => out.max_age = delta_seconds(&name, value.as_deref()),
                "s-maxage" => out.s_maxage = delta_seconds(&name, value.as_deref()),
                "immutable" => out.immutable = true,
                _ => out.extensions.push(extension(&name, value.as_deref())),
            }
        }
        out
    }
}

/// Split a header into `(lowercased name, unquoted value)` pairs, honoring
/// commas inside quoted strings.
fn tokenize(header: &str) -> Vec<(String, Option<String>)> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in header.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            let (name, value) = match part.split_once('=') {
                Some((n, v)) => (n.trim(), Some(unquote(v.trim()))),
                None => (part, None),
            };
            Some((name.to_ascii_lowercase(), value))
        })
        .collect()
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else {
                    out.push(c);
                }
            }
            out
        }
        None => value.to_string(),
    }
}

fn delta_seconds(name: &str, value: Option<&str>) -> Option<u64> {
    let Some(value) = value else {
        tracing::warn!(directive = name, "cache directive missing delta-seconds value; ignored");
        return None;
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        tracing::warn!(directive = name, value, "malformed delta-seconds; ignored");
        return None;
    }
    // All digits, so a parse failure can only be overflow.
    Some(value.parse::<u64>().map_or(DELTA_SECONDS_MAX, |v| v.min(DELTA_SECONDS_MAX)))
}

fn field_names(value: Option<&str>) -> impl Iterator<Item = String> + '_ {
    value
        .into_iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

fn extension(name: &str, value: Option<&str>) -> String {
    match value {
        Some(v) => format!("{name}={v}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_basic() {
        let d = ResponseDirectives::parse("public, max-age=3600, s-maxage=60, must-revalidate");
        assert!(d.public);
        assert!(d.must_revalidate);
        assert_eq!(d.max_age, Some(3600));
        assert_eq!(d.s_maxage, Some(60));
        assert!(!d.no_store);
    }

    #[test]
    fn test_parse_is_case_insensitive_and_tolerates_spacing() {
        let d = ResponseDirectives::parse("  No-Store ,PRIVATE,, Max-Age = 10 ");
        assert!(d.no_store);
        assert!(d.private);
        assert_eq!(d.max_age, Some(10));
    }

    #[test]
    fn test_parse_quoted_field_lists() {
        let d = ResponseDirectives::parse(r#"private="Set-Cookie, X-Token", no-cache="Authorization""#);
        assert!(d.private);
        assert_eq!(d.private_fields, vec!["Set-Cookie", "X-Token"]);
        assert!(d.no_cache);
        assert_eq!(d.no_cache_fields, vec!["Authorization"]);
    }

    #[test]
    fn test_parse_quoted_delta_seconds() {
        let d = ResponseDirectives::parse(r#"max-age="120""#);
        assert_eq!(d.max_age, Some(120));
    }

    #[test]
    fn test_malformed_delta_seconds_ignored() {
        let d = ResponseDirectives::parse("max-age=abc, s-maxage=-5, public");
        assert_eq!(d.max_age, None);
        assert_eq!(d.s_maxage, None);
        assert!(d.public);
    }

    #[test]
    fn test_delta_seconds_overflow_clamped() {
        let d = ResponseDirectives::parse("max-age=99999999999999999999999");
        assert_eq!(d.max_age, Some(DELTA_SECONDS_MAX));
    }

    #[test]
    fn test_extensions_preserved() {
        let d = ResponseDirectives::parse("immutable, stale-while-revalidate=30, community=\"UCI\"");
        assert!(d.immutable);
        assert_eq!(d.extensions, vec!["stale-while-revalidate=30", "community=UCI"]);
    }

    #[test]
    fn test_parse_request() {
        let d = RequestDirectives::parse("no-cache, max-stale, min-fresh=5, only-if-cached");
        assert!(d.no_cache);
        assert_eq!(d.max_stale, Some(MaxStale::Any));
        assert_eq!(d.min_fresh, Some(5));
        assert!(d.only_if_cached);
        assert!(!d.no_store);

        let d = RequestDirectives::parse("no-store, max-stale=30, max-age=0");
        assert!(d.no_store);
        assert_eq!(d.max_stale, Some(MaxStale::Seconds(30)));
        assert_eq!(d.max_age, Some(0));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ResponseDirectives::parse(""), ResponseDirectives::default());
        assert_eq!(RequestDirectives::parse(" , "), RequestDirectives::default());
    }
}
