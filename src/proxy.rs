//! Internal-route to backend-URL mapping
//!
//! The dashboard calls the gateway with stable internal paths under
//! `/api/proxy/`; this module owns the static table translating those to the
//! backend's real endpoints. Internal paths may carry bracketed placeholder
//! segments (`/trade/[tradeId]/get`); templates carry `{name}` placeholders
//! filled from captured segments first, then query parameters. First match
//! wins in table order. Unmapped paths resolve to `None` and the catch-all
//! answers 404.

use crate::error::{AppError, Result};
use std::collections::HashMap;

/// One entry in the internal-to-backend route table.
pub struct RouteMapping {
    /// Internal path, relative to `/api/proxy`. Bracketed segments capture.
    pub path: &'static str,
    /// Backend URL template relative to the versioned base.
    pub template: &'static str,
}

/// The proxied dashboard surface. Order matters: first match wins.
pub const ROUTE_TABLE: &[RouteMapping] = &[
    RouteMapping {
        path: "/user/update",
        template: "/user/update",
    },
    RouteMapping {
        path: "/portfolio/get-all",
        template: "/portfolio/get-all",
    },
    RouteMapping {
        path: "/portfolio/[portfolioId]/get",
        template: "/portfolio/get?portfolioId={portfolioId}",
    },
    RouteMapping {
        path: "/trade/get-all",
        template: "/trade/all?accountNumber={accountNumber}",
    },
    RouteMapping {
        path: "/trade/get-paged",
        template: "/trade/paged?accountNumber={accountNumber}&page={page}&pageSize={pageSize}",
    },
    RouteMapping {
        path: "/trade/for-interval",
        template: "/trade/for-interval?accountNumber={accountNumber}&start={start}&end={end}",
    },
    RouteMapping {
        path: "/trade/recent",
        template: "/trade/recent?accountNumber={accountNumber}&count={count}",
    },
    RouteMapping {
        path: "/trade/[tradeId]/get",
        template: "/trade/get?tradeId={tradeId}&accountNumber={accountNumber}",
    },
    RouteMapping {
        path: "/transaction/for-account",
        template: "/transaction/for-account?accountNumber={accountNumber}",
    },
    RouteMapping {
        path: "/analysis/equity-curve",
        template: "/analysis/equity-curve?accountNumber={accountNumber}&interval={interval}",
    },
    RouteMapping {
        path: "/analysis/win-loss",
        template: "/analysis/win-loss?accountNumber={accountNumber}",
    },
    RouteMapping {
        path: "/analysis/weekday-buckets",
        template: "/analysis/weekday-buckets?accountNumber={accountNumber}",
    },
    RouteMapping {
        path: "/news/for-interval",
        template: "/news/for-interval?start={start}&end={end}",
    },
    RouteMapping {
        path: "/job/for-type",
        template: "/job/for-type?jobType={jobType}",
    },
    RouteMapping {
        path: "/job/[jobId]/get",
        template: "/job/get?jobId={jobId}",
    },
];

/// Resolve an internal proxy path against the route table.
///
/// `None` means the path is unmapped (the caller answers 404). A mapped path
/// whose template cannot be fully substituted is a validation error.
pub fn resolve(
    base: &str,
    path: &str,
    query: &HashMap<String, String>,
) -> Option<Result<String>> {
    let mapping = ROUTE_TABLE
        .iter()
        .find_map(|entry| match_path(entry.path, path).map(|caps| (entry, caps)));

    let (entry, captures) = mapping?;
    Some(build_url(base, entry.template, &captures, query))
}

/// Whether `path` starts with the given internal route prefix, e.g. `/news`.
pub fn is_mapped_under(path: &str, prefix: &str) -> bool {
    ROUTE_TABLE
        .iter()
        .any(|entry| entry.path.starts_with(prefix) && match_path(entry.path, path).is_some())
}

/// Segment-wise match of an internal path against a table pattern.
///
/// Bracketed pattern segments capture the corresponding path segment; all
/// other segments must be equal. Returns captured values on match.
fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut captures = HashMap::new();
    for (pattern_seg, path_seg) in pattern_segments.iter().zip(path_segments.iter()) {
        if let Some(name) = pattern_seg
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
        {
            captures.insert(name.to_string(), path_seg.to_string());
        } else if pattern_seg != path_seg {
            return None;
        }
    }

    Some(captures)
}

/// Substitute every `{name}` in the template and append leftover query
/// parameters.
///
/// Each placeholder is filled exactly once, from captured path segments
/// first, then query parameters, with values URL-encoded. A placeholder with
/// no value is rejected rather than interpolated literally.
fn build_url(
    base: &str,
    template: &str,
    captures: &HashMap<String, String>,
    query: &HashMap<String, String>,
) -> Result<String> {
    let mut url = String::with_capacity(base.len() + template.len());
    url.push_str(base);

    let mut consumed: Vec<&str> = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        url.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| AppError::Internal(format!("Unclosed placeholder in '{}'", template)))?;
        let name = &after[..close];

        let value = captures
            .get(name)
            .or_else(|| query.get(name))
            .ok_or_else(|| {
                AppError::Validation(format!("Missing value for parameter '{}'", name))
            })?;

        url.push_str(&urlencoding::encode(value));
        consumed.push(name);
        rest = &after[close + 1..];
    }
    url.push_str(rest);

    // Query parameters the template did not consume pass through verbatim.
    let mut leftover: Vec<(&String, &String)> = query
        .iter()
        .filter(|(key, _)| !consumed.contains(&key.as_str()))
        .collect();
    leftover.sort_by(|a, b| a.0.cmp(b.0));

    for (key, value) in leftover {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&urlencoding::encode(key));
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }

    // The substituted result must still be a well-formed absolute URL.
    url::Url::parse(&url)
        .map_err(|e| AppError::Internal(format!("Built malformed backend URL '{}': {}", url, e)))?;

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8080/api/v1";

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_static_path_resolves() {
        let url = resolve(BASE, "/portfolio/get-all", &query(&[]))
            .unwrap()
            .unwrap();
        assert_eq!(url, "http://localhost:8080/api/v1/portfolio/get-all");
    }

    #[test]
    fn test_query_placeholders_substituted() {
        let url = resolve(
            BASE,
            "/trade/for-interval",
            &query(&[
                ("accountNumber", "1234"),
                ("start", "2025-01-01"),
                ("end", "2025-02-01"),
            ]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            url,
            "http://localhost:8080/api/v1/trade/for-interval\
             ?accountNumber=1234&start=2025-01-01&end=2025-02-01"
        );
        assert!(!url.contains('{'), "no literal placeholder may remain");
    }

    #[test]
    fn test_path_segment_captured() {
        let url = resolve(
            BASE,
            "/trade/abc-123/get",
            &query(&[("accountNumber", "1234")]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            url,
            "http://localhost:8080/api/v1/trade/get?tradeId=abc-123&accountNumber=1234"
        );
    }

    #[test]
    fn test_values_url_encoded() {
        let url = resolve(
            BASE,
            "/trade/for-interval",
            &query(&[
                ("accountNumber", "1234"),
                ("start", "2025-01-01 00:00"),
                ("end", "2025-02-01 00:00"),
            ]),
        )
        .unwrap()
        .unwrap();
        assert!(url.contains("start=2025-01-01%2000%3A00"));
    }

    #[test]
    fn test_leftover_query_appended() {
        let url = resolve(
            BASE,
            "/trade/get-all",
            &query(&[("accountNumber", "1234"), ("symbol", "NDAQ100")]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            url,
            "http://localhost:8080/api/v1/trade/all?accountNumber=1234&symbol=NDAQ100"
        );
    }

    #[test]
    fn test_missing_placeholder_rejected() {
        let result = resolve(BASE, "/trade/get-all", &query(&[])).unwrap();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_unmapped_path_is_none() {
        assert!(resolve(BASE, "/nope/get-all", &query(&[])).is_none());
        assert!(resolve(BASE, "/trade/get-all/extra", &query(&[])).is_none());
        assert!(resolve(BASE, "/trade", &query(&[])).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        // "/trade/get-all" must hit the static entry, not the
        // "/trade/[tradeId]/get" capture.
        let url = resolve(BASE, "/trade/get-all", &query(&[("accountNumber", "1")]))
            .unwrap()
            .unwrap();
        assert!(url.ends_with("/trade/all?accountNumber=1"));
    }

    #[test]
    fn test_news_prefix_detection() {
        assert!(is_mapped_under("/news/for-interval", "/news"));
        assert!(!is_mapped_under("/trade/get-all", "/news"));
        assert!(!is_mapped_under("/news/unknown", "/news"));
    }
}
