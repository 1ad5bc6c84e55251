//! Services layer
//!
//! The view-state logic the dashboard pages used to carry, owned server-side:
//! active account/portfolio resolution, trade filter validation, and
//! market-news gating. Services are stateless and hold no handles; handlers
//! pass in whatever data they fetched.

pub mod account_service;
pub mod news_service;
pub mod trade_service;

pub use account_service::{AccountSelector, AccountService, PortfolioSelector};
pub use news_service::NewsService;
pub use trade_service::{SortOrder, TradeFilter};
