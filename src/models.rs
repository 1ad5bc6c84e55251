//! Backend view models
//!
//! Plain DTOs mirrored from the trading-journal backend API. The gateway
//! never persists or mutates these; they exist so the typed routes and the
//! active-selection logic can read the handful of fields they care about.
//! Every payload is relayed to the dashboard as-is, so unknown backend
//! fields are tolerated and round-trip through the generic proxy untouched.

use serde::{Deserialize, Serialize};

/// Authenticated user as returned by the backend security endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub date_registered: Option<String>,
}

/// A trading account inside a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_number: i64,
    pub name: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub broker: Option<String>,
    #[serde(default)]
    pub default_account: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub last_traded: Option<String>,
}

/// A portfolio grouping one or more accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub default_portfolio: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

/// A single journaled trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub trade_id: String,
    pub symbol: String,
    /// "BUY" or "SELL"
    pub direction: String,
    #[serde(default)]
    pub trade_open_time: Option<String>,
    #[serde(default)]
    pub trade_close_time: Option<String>,
    #[serde(default)]
    pub lot_size: f64,
    #[serde(default)]
    pub open_price: f64,
    #[serde(default)]
    pub close_price: f64,
    #[serde(default)]
    pub net_profit: f64,
    #[serde(default)]
    pub points: f64,
}

/// An account funding event (deposit or withdrawal).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_date: String,
    /// "DEPOSIT" or "WITHDRAWAL"
    pub transaction_type: String,
    pub amount: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub account_number: Option<i64>,
}

/// A background job on the backend (trade imports, recalculations).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub job_type: String,
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub started: Option<String>,
    #[serde(default)]
    pub completed: Option<String>,
}

/// A market-news article slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketNews {
    pub date: String,
    #[serde(default)]
    pub slots: Vec<MarketNewsSlot>,
}

/// A timestamped group of news entries within a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketNewsSlot {
    pub time: String,
    #[serde(default)]
    pub entries: Vec<MarketNewsEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketNewsEntry {
    pub content: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Generic paged wrapper used by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_elements: u64,
}

fn default_true() -> bool {
    true
}
