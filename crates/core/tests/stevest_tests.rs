// ═══════════════════════════════════════════════════════════════════
// Stevest Facade Tests — end-to-end over a MemoryRepository
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use stevest_core::errors::CoreError;
use stevest_core::models::account::Account;
use stevest_core::models::analytics::CASH_LABEL;
use stevest_core::models::dividend::{DividendInfo, InsightStatus};
use stevest_core::models::ledger::Ledger;
use stevest_core::models::settings::PriceMode;
use stevest_core::models::snapshot::PortfolioSnapshot;
use stevest_core::models::transaction::{Transaction, TransactionSortOrder, TransactionType};
use stevest_core::pricing::{DeterministicPriceSource, QuoteBook};
use stevest_core::providers::registry::QuoteProviderRegistry;
use stevest_core::providers::traits::{InsightProvider, QuoteProvider};
use stevest_core::services::insight_service::InsightService;
use stevest_core::services::quote_service::QuoteService;
use stevest_core::storage::repository::MemoryRepository;
use stevest_core::Stevest;

fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn main_account() -> Uuid {
    Uuid::from_u128(1)
}

struct FixedQuote(&'static str, f64);

#[async_trait]
impl QuoteProvider for FixedQuote {
    fn name(&self) -> &str {
        "Fixed"
    }

    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError> {
        if symbol == self.0 {
            Ok(self.1)
        } else {
            Err(CoreError::Api {
                provider: "Fixed".into(),
                message: format!("no quote for {symbol}"),
            })
        }
    }
}

/// Echoes back one entry per requested symbol.
struct EchoInsights;

#[async_trait]
impl InsightProvider for EchoInsights {
    fn name(&self) -> &str {
        "Echo"
    }

    async fn fetch_dividend_insights(
        &self,
        symbols: &[String],
    ) -> Result<Vec<DividendInfo>, CoreError> {
        Ok(symbols
            .iter()
            .map(|s| DividendInfo {
                symbol: s.clone(),
                company_name: String::new(),
                yield_text: "0%".into(),
                pay_date: String::new(),
                ex_date: String::new(),
                amount_per_share_text: String::new(),
            })
            .collect())
    }
}

/// Seeded ledger, deterministic prices, no network providers.
fn seeded() -> Stevest {
    Stevest::with_components(
        Box::new(MemoryRepository::seeded()),
        QuoteService::new(QuoteProviderRegistry::new()),
        InsightService::new(None),
        Box::new(DeterministicPriceSource),
    )
}

// ═══════════════════════════════════════════════════════════════════
// Snapshot of the demonstration data
// ═══════════════════════════════════════════════════════════════════

mod snapshot {
    use super::*;

    #[test]
    fn seeded_snapshot() {
        let snap = seeded().snapshot().unwrap();

        // 50000 − 7505 − 4005 + 2495
        assert!(approx(snap.cash_balance, 40_985.0));
        assert_eq!(snap.holdings.len(), 2);

        let aapl = snap.holding("AAPL").unwrap();
        assert!(approx(aapl.quantity, 50.0));
        assert!(approx(aapl.average_cost, 150.0));
        assert!(approx(aapl.current_price, 142.5));
        assert!(approx(aapl.total_value, 7_125.0));
        assert!(approx(aapl.unrealized_pl, -375.0));
        assert!(approx(aapl.unrealized_pl_percent, -5.0));
        assert_eq!(aapl.realized_pl, 0.0);

        let tsla = snap.holding("TSLA").unwrap();
        assert!(approx(tsla.quantity, 10.0));
        assert!(approx(tsla.average_cost, 200.0));
        assert!(approx(tsla.current_price, 188.0));
        assert!(approx(tsla.realized_pl, 500.0));
        assert!(approx(tsla.unrealized_pl, -120.0));

        assert!(approx(snap.holdings_value, 9_005.0));
        assert!(approx(snap.total_realized_pl, 500.0));
        assert!(approx(snap.total_unrealized_pl, -495.0));
        assert!(approx(snap.total_equity, 49_990.0));
    }

    #[test]
    fn snapshot_as_of_ignores_later_rows() {
        let app = seeded();
        let snap = app.snapshot_as_of(make_date(2023, 2, 1)).unwrap();
        assert!(approx(snap.cash_balance, 42_495.0));
        assert_eq!(snap.holdings.len(), 1);
        assert!(snap.holding("TSLA").is_none());

        assert_eq!(
            app.snapshot_as_of(make_date(2022, 12, 31)).unwrap(),
            PortfolioSnapshot::default()
        );
    }

    #[test]
    fn empty_repository_gives_zero_snapshot() {
        let app = Stevest::with_components(
            Box::new(MemoryRepository::new()),
            QuoteService::new(QuoteProviderRegistry::new()),
            InsightService::new(None),
            Box::new(DeterministicPriceSource),
        );
        let snap = app.snapshot().unwrap();
        assert_eq!(snap.total_equity, 0.0);
        assert!(app.allocation().unwrap().is_empty());
    }

    #[test]
    fn new_transaction_is_reflected_immediately() {
        let mut app = seeded();
        app.add_transaction(Transaction::withdraw(main_account(), 985.0, make_date(2024, 1, 1)))
            .unwrap();
        assert!(approx(app.snapshot().unwrap().cash_balance, 40_000.0));
    }

    #[test]
    fn soft_removed_account_still_counts() {
        let mut app = seeded();
        let before = app.snapshot().unwrap();
        app.remove_account(main_account()).unwrap();
        assert_eq!(app.list_accounts().unwrap().len(), 1);
        assert_eq!(app.snapshot().unwrap(), before);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Analytics
// ═══════════════════════════════════════════════════════════════════

mod analytics {
    use super::*;

    #[test]
    fn allocation_of_seed() {
        let slices = seeded().allocation().unwrap();
        let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec![CASH_LABEL, "AAPL", "TSLA"]);

        let total_pct: f64 = slices.iter().map(|s| s.allocation_pct).sum();
        assert!((total_pct - 100.0).abs() < 1e-9);
        assert!(approx(slices[0].allocation_pct, 40_985.0 / 49_990.0 * 100.0));
    }

    #[test]
    fn negative_cash_is_not_a_slice() {
        let mut app = seeded();
        app.add_transaction(Transaction::withdraw(main_account(), 50_000.0, make_date(2024, 1, 1)))
            .unwrap();
        let slices = app.allocation().unwrap();
        assert!(slices.iter().all(|s| s.label != CASH_LABEL));
        let total_pct: f64 = slices.iter().map(|s| s.allocation_pct).sum();
        assert!((total_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn cashflow_of_seed() {
        let summary = seeded().cashflow_summary().unwrap();
        assert!(approx(summary.total_deposited, 50_000.0));
        assert_eq!(summary.total_withdrawn, 0.0);
        assert!(approx(summary.total_bought, 11_500.0));
        assert!(approx(summary.total_sold, 2_500.0));
        assert!(approx(summary.total_fees, 15.0));
        assert!(approx(summary.net_contributions, 50_000.0));
        assert_eq!(summary.transaction_count, 4);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Listing & querying
// ═══════════════════════════════════════════════════════════════════

mod listing {
    use super::*;

    #[test]
    fn list_is_newest_first() {
        let txs = seeded().list_transactions().unwrap();
        assert_eq!(txs.len(), 4);
        assert_eq!(txs[0].transaction_type, TransactionType::Sell);
        assert_eq!(txs[3].transaction_type, TransactionType::Deposit);
    }

    #[test]
    fn sorted_views() {
        let app = seeded();
        let asc = app.list_transactions_sorted(&TransactionSortOrder::DateAsc).unwrap();
        assert_eq!(asc[0].transaction_type, TransactionType::Deposit);

        let by_amount = app.list_transactions_sorted(&TransactionSortOrder::AmountDesc).unwrap();
        assert!(approx(by_amount[0].amount, 50_000.0));

        let by_symbol = app.list_transactions_sorted(&TransactionSortOrder::SymbolAsc).unwrap();
        assert_eq!(by_symbol[0].symbol.as_deref(), Some("AAPL"));
        assert_eq!(by_symbol[3].symbol, None);
    }

    #[test]
    fn filters() {
        let app = seeded();
        assert_eq!(app.transactions_for_account(main_account()).unwrap().len(), 4);
        assert!(app.transactions_for_account(Uuid::from_u128(2)).unwrap().is_empty());
        assert_eq!(app.transactions_by_type(TransactionType::Buy).unwrap().len(), 2);
        assert_eq!(
            app.transactions_in_range(make_date(2023, 1, 15), make_date(2023, 2, 10))
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn search_symbol_and_notes() {
        let app = seeded();
        assert_eq!(app.search_transactions("tsla").unwrap().len(), 2);
        let funding = app.search_transactions("initial").unwrap();
        assert_eq!(funding.len(), 1);
        assert_eq!(funding[0].transaction_type, TransactionType::Deposit);
        assert_eq!(app.search_transactions("  ").unwrap().len(), 4);
    }

    #[test]
    fn get_transaction_by_id() {
        let app = seeded();
        let id = Uuid::from_u128(0x102);
        assert_eq!(app.get_transaction(id).unwrap().unwrap().symbol.as_deref(), Some("AAPL"));
        assert!(app.get_transaction(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn add_transactions_stops_at_first_rejection() {
        let mut app = seeded();
        let batch = vec![
            Transaction::deposit(main_account(), 10.0, make_date(2024, 1, 1)),
            Transaction::deposit(main_account(), -10.0, make_date(2024, 1, 2)),
            Transaction::deposit(main_account(), 10.0, make_date(2024, 1, 3)),
        ];
        assert!(app.add_transactions(batch).is_err());
        assert_eq!(app.list_transactions().unwrap().len(), 5);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Prices, quotes & insights
// ═══════════════════════════════════════════════════════════════════

mod pricing {
    use super::*;

    #[test]
    fn cost_basis_mode_zeroes_unrealized() {
        let mut app = seeded();
        app.set_price_mode(PriceMode::CostBasis).unwrap();
        assert_eq!(app.get_settings().unwrap().price_mode, PriceMode::CostBasis);

        let snap = app.snapshot().unwrap();
        assert_eq!(snap.total_unrealized_pl, 0.0);
        assert!(approx(snap.holdings_value, 9_500.0));
    }

    #[test]
    fn use_quotes_overrides_per_symbol() {
        let mut app = seeded();
        let mut book = QuoteBook::new();
        book.insert("AAPL", 200.0);
        app.use_quotes(book).unwrap();

        let snap = app.snapshot().unwrap();
        assert!(approx(snap.holding("AAPL").unwrap().current_price, 200.0));
        // TSLA falls back to the deterministic estimate.
        assert!(approx(snap.holding("TSLA").unwrap().current_price, 188.0));
    }

    #[tokio::test]
    async fn refresh_quotes_uses_providers() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(Box::new(FixedQuote("TSLA", 300.0)));
        let mut app = Stevest::with_components(
            Box::new(MemoryRepository::seeded()),
            QuoteService::new(registry),
            InsightService::new(None),
            Box::new(DeterministicPriceSource),
        );

        assert_eq!(app.refresh_quotes().await.unwrap(), 1);
        let snap = app.snapshot().unwrap();
        assert!(approx(snap.holding("TSLA").unwrap().current_price, 300.0));
        assert!(approx(snap.holding("AAPL").unwrap().current_price, 142.5));
    }

    #[tokio::test]
    async fn refresh_without_providers_keeps_offline_prices() {
        let mut app = seeded();
        let before = app.snapshot().unwrap();
        assert_eq!(app.refresh_quotes().await.unwrap(), 0);
        assert_eq!(app.snapshot().unwrap(), before);
    }

    #[tokio::test]
    async fn dividend_insights_cover_bought_symbols() {
        let app = Stevest::with_components(
            Box::new(MemoryRepository::seeded()),
            QuoteService::new(QuoteProviderRegistry::new()),
            InsightService::new(Some(Box::new(EchoInsights))),
            Box::new(DeterministicPriceSource),
        );
        let status = app.dividend_insights().await.unwrap();
        let symbols: Vec<&str> = status.insights().iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "TSLA"]);
    }

    #[tokio::test]
    async fn dividend_insights_unavailable_without_key() {
        let status = seeded().dividend_insights().await.unwrap();
        assert!(matches!(status, InsightStatus::Unavailable { .. }));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings & accounts
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn base_currency() {
        let mut app = seeded();
        app.set_base_currency("eur").unwrap();
        assert_eq!(app.get_settings().unwrap().base_currency, "EUR");
        assert!(matches!(
            app.set_base_currency("EURO"),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn api_keys() {
        let mut app = seeded();
        app.set_api_key("Gemini", "secret").unwrap();
        assert_eq!(
            app.get_settings().unwrap().api_keys.get("gemini").map(String::as_str),
            Some("secret")
        );
        assert!(app.remove_api_key("GEMINI").unwrap());
        assert!(!app.remove_api_key("gemini").unwrap());
    }

    #[test]
    fn account_round_trip() {
        let mut app = seeded();
        let account = Account::new("Brokerage", "Schwab", "usd");
        app.upsert_account(account.clone()).unwrap();
        assert!(app.list_accounts().unwrap().iter().any(|a| a.id == account.id));

        app.add_transaction(Transaction::deposit(account.id, 500.0, make_date(2024, 1, 1)))
            .unwrap();
        assert_eq!(app.transactions_for_account(account.id).unwrap().len(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Export / import
// ═══════════════════════════════════════════════════════════════════

mod export_import {
    use super::*;

    #[test]
    fn csv_export() {
        let mut app = seeded();
        app.add_transaction(
            Transaction::deposit(main_account(), 1.0, make_date(2024, 1, 1))
                .with_notes("gift, from \"mom\""),
        )
        .unwrap();
        let csv = app.export_transactions_to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "id,account_id,type,symbol,quantity,price_per_unit,amount,fees,date,notes"
        );
        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains(",DEPOSIT,"));
        assert!(lines[1].ends_with("2023-01-01,Initial Funding"));
        assert!(lines[2].contains(",BUY,AAPL,50,150,7500,5,2023-01-15,"));
        assert!(lines[5].ends_with("\"gift, from \"\"mom\"\"\""));
    }

    #[test]
    fn json_export_then_import_into_fresh_ledger() {
        let source = seeded();
        let json = source.export_transactions_to_json().unwrap();

        let empty = Ledger {
            transactions: Vec::new(),
            ..Ledger::seeded()
        };
        let mut target = Stevest::with_components(
            Box::new(MemoryRepository::from_ledger(empty).unwrap()),
            QuoteService::new(QuoteProviderRegistry::new()),
            InsightService::new(None),
            Box::new(DeterministicPriceSource),
        );

        assert_eq!(target.import_transactions_from_json(&json).unwrap(), 4);
        assert_eq!(target.snapshot().unwrap(), source.snapshot().unwrap());

        // Same ids again: rejected as duplicates.
        assert!(target.import_transactions_from_json(&json).is_err());
    }

    #[test]
    fn import_row_without_id_gets_one_assigned() {
        let mut app = seeded();
        let json = r#"[{
            "account_id": "00000000-0000-0000-0000-000000000001",
            "transaction_type": "Deposit",
            "date": "2024-03-01",
            "symbol": null,
            "quantity": null,
            "price_per_unit": null,
            "amount": 100.0,
            "fees": 0.0
        }]"#;

        assert_eq!(app.import_transactions_from_json(json).unwrap(), 1);
        let txs = app.list_transactions().unwrap();
        assert_eq!(txs.len(), 5);
        let imported = txs
            .iter()
            .find(|t| t.date == make_date(2024, 3, 1))
            .unwrap();
        assert!(!imported.id.is_nil());
        assert_eq!(imported.amount, 100.0);
    }

    #[test]
    fn import_rejects_malformed_json() {
        let mut app = seeded();
        assert!(matches!(
            app.import_transactions_from_json("[{\"nope\": 1}]"),
            Err(CoreError::Deserialization(_))
        ));
    }
}
