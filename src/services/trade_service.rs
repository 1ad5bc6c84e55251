//! Trade filter parsing and validation
//!
//! Filter state lives in the URL, exactly as the dashboard keeps it: the
//! gateway parses and validates the query parameters before they feed the
//! mapped trade routes, so a bad date range or an unbounded page size is
//! rejected at the edge instead of reaching the backend.

use crate::error::{AppError, Result};
use chrono::NaiveDate;
use std::collections::HashMap;

const DEFAULT_PAGE_SIZE: u32 = 25;
const MAX_PAGE_SIZE: u32 = 100;

/// Sort order for trade listings. Anything outside the whitelist is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Validated trade-listing filter.
#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub symbol: Option<String>,
    pub sort: SortOrder,
    pub page: u32,
    pub page_size: u32,
}

impl TradeFilter {
    /// Parse a filter from request query parameters.
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self> {
        let start = parse_date(query, "start")?;
        let end = parse_date(query, "end")?;

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(AppError::Validation(format!(
                    "Invalid interval: start {} is after end {}",
                    start, end
                )));
            }
        }

        // Trimmed but otherwise verbatim; symbol casing is backend-owned.
        let symbol = query
            .get("symbol")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let sort = match query.get("sort").map(|s| s.as_str()) {
            None | Some("") => SortOrder::default(),
            Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "Unsupported sort order '{}'",
                    other
                )))
            }
        };

        let page = parse_u32(query, "page", 0)?;
        let page_size = parse_u32(query, "pageSize", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "pageSize must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(Self {
            start,
            end,
            symbol,
            sort,
            page,
            page_size,
        })
    }

    /// Re-encode the validated filter as query parameters for the mapped
    /// backend routes.
    pub fn to_query(&self) -> HashMap<String, String> {
        let mut query = HashMap::new();
        if let Some(start) = self.start {
            query.insert("start".to_string(), start.to_string());
        }
        if let Some(end) = self.end {
            query.insert("end".to_string(), end.to_string());
        }
        if let Some(symbol) = &self.symbol {
            query.insert("symbol".to_string(), symbol.clone());
        }
        query.insert("sort".to_string(), self.sort.as_str().to_string());
        query.insert("page".to_string(), self.page.to_string());
        query.insert("pageSize".to_string(), self.page_size.to_string());
        query
    }
}

fn parse_date(query: &HashMap<String, String>, key: &str) -> Result<Option<NaiveDate>> {
    match query.get(key).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::Validation(format!(
                    "Invalid date '{}' for '{}': expected YYYY-MM-DD",
                    raw, key
                ))
            }),
    }
}

fn parse_u32(query: &HashMap<String, String>, key: &str, default: u32) -> Result<u32> {
    match query.get(key).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            AppError::Validation(format!("Invalid value '{}' for '{}'", raw, key))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let filter = TradeFilter::from_query(&query(&[])).unwrap();
        assert!(filter.start.is_none());
        assert!(filter.symbol.is_none());
        assert_eq!(filter.sort, SortOrder::Desc);
        assert_eq!(filter.page, 0);
        assert_eq!(filter.page_size, 25);
    }

    #[test]
    fn test_full_filter_parses() {
        let filter = TradeFilter::from_query(&query(&[
            ("start", "2025-01-01"),
            ("end", "2025-02-01"),
            ("symbol", "ndaq100"),
            ("sort", "asc"),
            ("page", "3"),
            ("pageSize", "50"),
        ]))
        .unwrap();
        assert_eq!(filter.start.unwrap().to_string(), "2025-01-01");
        assert_eq!(filter.symbol.as_deref(), Some("ndaq100"));
        assert_eq!(filter.sort, SortOrder::Asc);
        assert_eq!(filter.page, 3);
        assert_eq!(filter.page_size, 50);
    }

    #[test]
    fn test_inverted_interval_rejected() {
        let result = TradeFilter::from_query(&query(&[
            ("start", "2025-02-01"),
            ("end", "2025-01-01"),
        ]));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_bad_date_rejected() {
        let result = TradeFilter::from_query(&query(&[("start", "01/02/2025")]));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_symbol_passed_through_verbatim() {
        let filter =
            TradeFilter::from_query(&query(&[("symbol", "  BrentCrude  ")])).unwrap();
        assert_eq!(filter.symbol.as_deref(), Some("BrentCrude"));
        assert_eq!(filter.to_query().get("symbol").unwrap(), "BrentCrude");
    }

    #[test]
    fn test_sort_whitelist() {
        let result = TradeFilter::from_query(&query(&[("sort", "sideways")]));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(TradeFilter::from_query(&query(&[("pageSize", "0")])).is_err());
        assert!(TradeFilter::from_query(&query(&[("pageSize", "101")])).is_err());
        assert!(TradeFilter::from_query(&query(&[("pageSize", "100")])).is_ok());
    }

    #[test]
    fn test_to_query_roundtrip() {
        let filter = TradeFilter::from_query(&query(&[
            ("start", "2025-01-01"),
            ("symbol", "US30"),
        ]))
        .unwrap();
        let encoded = filter.to_query();
        assert_eq!(encoded.get("start").unwrap(), "2025-01-01");
        assert_eq!(encoded.get("symbol").unwrap(), "US30");
        assert_eq!(encoded.get("sort").unwrap(), "desc");
        assert!(!encoded.contains_key("end"));
    }
}
