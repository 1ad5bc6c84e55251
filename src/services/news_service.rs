//! Market-news gating

use crate::config::AppConfig;
use serde_json::{json, Value};

/// Gates the market-news routes behind `ALLOW_FETCHING_MARKET_NEWS`.
///
/// When fetching is disabled the proxy never touches the backend news
/// endpoints; the dashboard gets an empty success payload and renders an
/// empty calendar.
pub struct NewsService;

impl NewsService {
    /// The short-circuit payload for a disabled news route, if gating
    /// applies to this internal path.
    pub fn short_circuit(config: &AppConfig, path: &str) -> Option<Value> {
        if config.allow_fetching_market_news {
            return None;
        }
        if !crate::proxy::is_mapped_under(path, "/news") {
            return None;
        }
        Some(json!({
            "success": true,
            "message": "Market news fetching is disabled",
            "data": [],
        }))
    }
}
