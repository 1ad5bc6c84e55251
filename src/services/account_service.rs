//! Active account and portfolio resolution
//!
//! The dashboard addresses its current selection through the URL:
//! `?account=default` means "whichever account is flagged as the default",
//! a numeric value selects by account number, and portfolios mirror the
//! same scheme by id. When nothing matches, resolution yields `None` and
//! the caller surfaces a redirect hint so the dashboard can navigate back
//! to a known-good selection.

use crate::models::{Account, Portfolio};

/// Parsed `?account=` query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSelector {
    /// `?account=default`: the account flagged `defaultAccount`.
    Default,
    /// `?account=<number>`: selection by account number.
    Number(i64),
}

impl AccountSelector {
    /// Parse the query value; anything non-numeric other than `default`
    /// is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("default") {
            return Some(Self::Default);
        }
        raw.parse::<i64>().ok().map(Self::Number)
    }
}

/// Parsed `?portfolio=` query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortfolioSelector {
    Default,
    Id(i64),
}

impl PortfolioSelector {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("default") {
            return Some(Self::Default);
        }
        raw.parse::<i64>().ok().map(Self::Id)
    }
}

/// Selection rules shared by the active-account route.
pub struct AccountService;

impl AccountService {
    /// Resolve the active portfolio.
    ///
    /// An explicit id wins outright. For `default`, the session's
    /// selected-portfolio preference is tried first, then the portfolio
    /// flagged `defaultPortfolio`. Inactive portfolios never match.
    pub fn resolve_portfolio<'a>(
        portfolios: &'a [Portfolio],
        selector: PortfolioSelector,
        preferred: Option<i64>,
    ) -> Option<&'a Portfolio> {
        let find_by_id =
            |id: i64| portfolios.iter().find(|p| p.active && p.id == id);

        match selector {
            PortfolioSelector::Id(id) => find_by_id(id),
            PortfolioSelector::Default => preferred
                .and_then(find_by_id)
                .or_else(|| portfolios.iter().find(|p| p.active && p.default_portfolio)),
        }
    }

    /// Resolve the active account within a portfolio.
    pub fn resolve_account(
        portfolio: &Portfolio,
        selector: AccountSelector,
    ) -> Option<&Account> {
        match selector {
            AccountSelector::Number(number) => portfolio
                .accounts
                .iter()
                .find(|a| a.active && a.account_number == number),
            AccountSelector::Default => portfolio
                .accounts
                .iter()
                .find(|a| a.active && a.default_account),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(number: i64, default: bool, active: bool) -> Account {
        Account {
            account_number: number,
            name: format!("Account {}", number),
            currency: Some("CAD".to_string()),
            balance: 30000.0,
            account_type: Some("CFD".to_string()),
            broker: None,
            default_account: default,
            active,
            last_traded: None,
        }
    }

    fn portfolio(id: i64, default: bool, accounts: Vec<Account>) -> Portfolio {
        Portfolio {
            id,
            name: format!("Portfolio {}", id),
            default_portfolio: default,
            active: true,
            accounts,
        }
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(AccountSelector::parse("default"), Some(AccountSelector::Default));
        assert_eq!(AccountSelector::parse("Default"), Some(AccountSelector::Default));
        assert_eq!(AccountSelector::parse("1234"), Some(AccountSelector::Number(1234)));
        assert_eq!(AccountSelector::parse("abc"), None);
        assert_eq!(PortfolioSelector::parse("7"), Some(PortfolioSelector::Id(7)));
    }

    #[test]
    fn test_default_account_selected() {
        let p = portfolio(1, true, vec![account(1, false, true), account(2, true, true)]);
        let selected = AccountService::resolve_account(&p, AccountSelector::Default).unwrap();
        assert_eq!(selected.account_number, 2);
    }

    #[test]
    fn test_account_by_number() {
        let p = portfolio(1, true, vec![account(1, false, true), account(2, true, true)]);
        let selected =
            AccountService::resolve_account(&p, AccountSelector::Number(1)).unwrap();
        assert_eq!(selected.account_number, 1);
    }

    #[test]
    fn test_no_default_present_yields_none() {
        let p = portfolio(1, true, vec![account(1, false, true), account(2, false, true)]);
        assert!(AccountService::resolve_account(&p, AccountSelector::Default).is_none());
    }

    #[test]
    fn test_inactive_account_never_matches() {
        let p = portfolio(1, true, vec![account(1, true, false)]);
        assert!(AccountService::resolve_account(&p, AccountSelector::Default).is_none());
        assert!(AccountService::resolve_account(&p, AccountSelector::Number(1)).is_none());
    }

    #[test]
    fn test_portfolio_explicit_id_wins() {
        let portfolios = vec![portfolio(1, true, vec![]), portfolio(2, false, vec![])];
        let selected =
            AccountService::resolve_portfolio(&portfolios, PortfolioSelector::Id(2), Some(1))
                .unwrap();
        assert_eq!(selected.id, 2);
    }

    #[test]
    fn test_portfolio_preference_beats_default_flag() {
        let portfolios = vec![portfolio(1, true, vec![]), portfolio(2, false, vec![])];
        let selected =
            AccountService::resolve_portfolio(&portfolios, PortfolioSelector::Default, Some(2))
                .unwrap();
        assert_eq!(selected.id, 2);
    }

    #[test]
    fn test_portfolio_falls_back_to_default_flag() {
        let portfolios = vec![portfolio(1, true, vec![]), portfolio(2, false, vec![])];

        // Stale preference pointing at a portfolio that no longer exists.
        let selected =
            AccountService::resolve_portfolio(&portfolios, PortfolioSelector::Default, Some(9))
                .unwrap();
        assert_eq!(selected.id, 1);

        let selected =
            AccountService::resolve_portfolio(&portfolios, PortfolioSelector::Default, None)
                .unwrap();
        assert_eq!(selected.id, 1);
    }

    #[test]
    fn test_empty_portfolio_list_yields_none() {
        assert!(
            AccountService::resolve_portfolio(&[], PortfolioSelector::Default, None).is_none()
        );
    }
}
