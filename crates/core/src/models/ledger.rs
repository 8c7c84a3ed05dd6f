use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::Account;
use super::settings::Settings;
use super::transaction::Transaction;

/// Schema version written into every ledger. Bump on layout changes.
pub const LEDGER_SCHEMA_VERSION: u16 = 1;

/// The persisted aggregate. Everything in here gets serialized, encrypted,
/// and saved to the portable `.stvk` file.
///
/// `transactions` is kept in ascending date order; same-date rows stay in
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub schema_version: u16,
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub settings: Settings,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            schema_version: LEDGER_SCHEMA_VERSION,
            accounts: Vec::new(),
            transactions: Vec::new(),
            settings: Settings::default(),
        }
    }
}

impl Ledger {
    /// First-run demonstration data: two accounts, one deposit, two buys and
    /// a partial sell.
    pub fn seeded() -> Self {
        let main = Account {
            id: Uuid::from_u128(1),
            name: "Main Trading".into(),
            broker: "Interactive Brokers".into(),
            currency: "USD".into(),
            archived: false,
        };
        let long_term = Account {
            id: Uuid::from_u128(2),
            name: "Long Term".into(),
            broker: "Vanguard".into(),
            currency: "USD".into(),
            archived: false,
        };

        let transactions = vec![
            Transaction::deposit(main.id, 50_000.0, seed_date(2023, 1, 1))
                .with_id(Uuid::from_u128(0x101))
                .with_notes("Initial Funding"),
            Transaction::buy(main.id, "AAPL", 50.0, 150.0, seed_date(2023, 1, 15))
                .with_id(Uuid::from_u128(0x102))
                .with_fees(5.0),
            Transaction::buy(main.id, "TSLA", 20.0, 200.0, seed_date(2023, 2, 10))
                .with_id(Uuid::from_u128(0x103))
                .with_fees(5.0),
            Transaction::sell(main.id, "TSLA", 10.0, 250.0, seed_date(2023, 6, 15))
                .with_id(Uuid::from_u128(0x104))
                .with_fees(5.0),
        ];

        Self {
            schema_version: LEDGER_SCHEMA_VERSION,
            accounts: vec![main, long_term],
            transactions,
            settings: Settings::default(),
        }
    }

    pub fn find_account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn find_transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }
}

fn seed_date(y: i32, m: u32, d: u32) -> NaiveDate {
    // Literal calendar dates, always valid.
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}
