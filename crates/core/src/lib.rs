pub mod errors;
pub mod models;
pub mod pricing;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use models::{
    account::Account,
    analytics::{AllocationSlice, CashflowSummary},
    dividend::InsightStatus,
    settings::{PriceMode, Settings},
    snapshot::PortfolioSnapshot,
    transaction::{Transaction, TransactionSortOrder, TransactionType},
};
use pricing::{PriceSource, QuoteBook, QuotedPriceSource};
use providers::{gemini::GeminiInsightProvider, registry::QuoteProviderRegistry, traits::InsightProvider};
use services::{
    analytics_service::AnalyticsService, insight_service::InsightService,
    portfolio_service::PortfolioService, quote_service::QuoteService,
};
use storage::repository::LedgerRepository;
use uuid::Uuid;

use errors::CoreError;

/// Main entry point for the Stevest core library.
///
/// Composes an injected ledger repository with the derivation engine, the
/// active price source and the external providers. Every snapshot is
/// re-derived from the repository's full history.
#[must_use]
pub struct Stevest {
    repository: Box<dyn LedgerRepository>,
    portfolio_service: PortfolioService,
    analytics_service: AnalyticsService,
    quote_service: QuoteService,
    insight_service: InsightService,
    price_source: Box<dyn PriceSource>,
}

impl std::fmt::Debug for Stevest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stevest")
            .field("quote_providers", &self.quote_service.provider_names())
            .field("insights", &self.insight_service.is_configured())
            .finish_non_exhaustive()
    }
}

impl Stevest {
    /// Build with the default providers configured from the repository's
    /// settings (Yahoo Finance always, Alpha Vantage and Gemini when their
    /// API keys are set).
    pub fn new(repository: Box<dyn LedgerRepository>) -> Result<Self, CoreError> {
        let settings = repository.settings()?;
        let registry = QuoteProviderRegistry::new_with_defaults(&settings.api_keys);
        let insight_provider = settings
            .api_keys
            .get("gemini")
            .map(|key| Box::new(GeminiInsightProvider::new(key.clone())) as Box<dyn InsightProvider>);

        Ok(Self::with_components(
            repository,
            QuoteService::new(registry),
            InsightService::new(insight_provider),
            settings.price_mode.price_source(),
        ))
    }

    /// Build from explicitly supplied collaborators (no network defaults).
    pub fn with_components(
        repository: Box<dyn LedgerRepository>,
        quote_service: QuoteService,
        insight_service: InsightService,
        price_source: Box<dyn PriceSource>,
    ) -> Self {
        Self {
            repository,
            portfolio_service: PortfolioService::new(),
            analytics_service: AnalyticsService::new(),
            quote_service,
            insight_service,
            price_source,
        }
    }

    /// Replace the price source used to value open positions.
    pub fn set_price_source(&mut self, price_source: Box<dyn PriceSource>) {
        self.price_source = price_source;
    }

    // ── Accounts ────────────────────────────────────────────────────

    pub fn list_accounts(&self) -> Result<Vec<Account>, CoreError> {
        self.repository.list_accounts()
    }

    pub fn upsert_account(&mut self, account: Account) -> Result<(), CoreError> {
        self.repository.upsert_account(account)
    }

    /// Hide an account. Its transactions keep counting in every snapshot.
    pub fn remove_account(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.repository.remove_account(id)
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Validate and record a transaction; returns its id.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<Uuid, CoreError> {
        self.repository.append_transaction(tx)
    }

    /// Record several transactions, stopping at the first rejected one.
    /// Returns the ids of the ones recorded.
    pub fn add_transactions(&mut self, txs: Vec<Transaction>) -> Result<Vec<Uuid>, CoreError> {
        let mut ids = Vec::with_capacity(txs.len());
        for tx in txs {
            ids.push(self.repository.append_transaction(tx)?);
        }
        Ok(ids)
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> Result<Transaction, CoreError> {
        self.repository.remove_transaction(id)
    }

    pub fn get_transaction(&self, id: Uuid) -> Result<Option<Transaction>, CoreError> {
        Ok(self.repository.list_transactions()?.into_iter().find(|t| t.id == id))
    }

    /// All transactions, newest first (display order).
    pub fn list_transactions(&self) -> Result<Vec<Transaction>, CoreError> {
        self.list_transactions_sorted(&TransactionSortOrder::DateDesc)
    }

    pub fn list_transactions_sorted(
        &self,
        order: &TransactionSortOrder,
    ) -> Result<Vec<Transaction>, CoreError> {
        let mut txs = self.repository.list_transactions()?;
        match order {
            // Stored ascending; reversing keeps same-date rows newest-entered first.
            TransactionSortOrder::DateAsc => {}
            TransactionSortOrder::DateDesc => txs.reverse(),
            TransactionSortOrder::AmountDesc => txs.sort_by(|a, b| {
                b.amount
                    .partial_cmp(&a.amount)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            TransactionSortOrder::SymbolAsc => txs.sort_by(|a, b| match (&a.symbol, &b.symbol) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }),
        }
        Ok(txs)
    }

    /// Transactions booked against one account, newest first.
    pub fn transactions_for_account(&self, account_id: Uuid) -> Result<Vec<Transaction>, CoreError> {
        let mut txs = self.list_transactions()?;
        txs.retain(|t| t.account_id == account_id);
        Ok(txs)
    }

    /// Transactions of one type, newest first.
    pub fn transactions_by_type(&self, transaction_type: TransactionType) -> Result<Vec<Transaction>, CoreError> {
        let mut txs = self.list_transactions()?;
        txs.retain(|t| t.transaction_type == transaction_type);
        Ok(txs)
    }

    /// Transactions within a date range (inclusive), newest first.
    pub fn transactions_in_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Transaction>, CoreError> {
        let mut txs = self.list_transactions()?;
        txs.retain(|t| t.date >= from && t.date <= to);
        Ok(txs)
    }

    /// Case-insensitive search over symbol and notes, newest first.
    pub fn search_transactions(&self, query: &str) -> Result<Vec<Transaction>, CoreError> {
        let needle = query.trim().to_lowercase();
        let mut txs = self.list_transactions()?;
        if needle.is_empty() {
            return Ok(txs);
        }
        txs.retain(|t| {
            t.symbol.as_deref().is_some_and(|s| s.to_lowercase().contains(&needle))
                || t.notes.as_deref().is_some_and(|n| n.to_lowercase().contains(&needle))
        });
        Ok(txs)
    }

    // ── Derived views ───────────────────────────────────────────────

    /// Re-derive the portfolio from the complete history.
    pub fn snapshot(&self) -> Result<PortfolioSnapshot, CoreError> {
        let txs = self.repository.list_transactions()?;
        Ok(self.portfolio_service.derive(&txs, self.price_source.as_ref()))
    }

    /// Portfolio as it stood at the end of `date` (later rows ignored).
    pub fn snapshot_as_of(&self, date: NaiveDate) -> Result<PortfolioSnapshot, CoreError> {
        let mut txs = self.repository.list_transactions()?;
        txs.retain(|t| t.date <= date);
        Ok(self.portfolio_service.derive(&txs, self.price_source.as_ref()))
    }

    pub fn allocation(&self) -> Result<Vec<AllocationSlice>, CoreError> {
        Ok(self.analytics_service.allocation(&self.snapshot()?))
    }

    pub fn cashflow_summary(&self) -> Result<CashflowSummary, CoreError> {
        let txs = self.repository.list_transactions()?;
        Ok(self.analytics_service.cashflow_summary(&txs))
    }

    // ── External providers ──────────────────────────────────────────

    /// Fetch live quotes for open positions and value them with those,
    /// falling back to the configured offline price source per symbol.
    /// Returns the number of symbols quoted.
    pub async fn refresh_quotes(&mut self) -> Result<usize, CoreError> {
        let symbols: Vec<String> = self
            .snapshot()?
            .holdings
            .into_iter()
            .map(|h| h.symbol)
            .collect();
        let book = self.quote_service.fetch_quotes(&symbols).await;
        let quoted = book.len();
        self.use_quotes(book)?;
        Ok(quoted)
    }

    /// Value positions with `quotes`, falling back to the configured mode.
    pub fn use_quotes(&mut self, quotes: QuoteBook) -> Result<(), CoreError> {
        let fallback = self.repository.settings()?.price_mode.price_source();
        self.price_source = Box::new(QuotedPriceSource::new(quotes, fallback));
        Ok(())
    }

    /// Best-effort dividend data for every symbol ever bought.
    pub async fn dividend_insights(&self) -> Result<InsightStatus, CoreError> {
        let txs = self.repository.list_transactions()?;
        let symbols = InsightService::dividend_symbols(&txs);
        Ok(self.insight_service.fetch(&symbols).await)
    }

    // ── Settings ────────────────────────────────────────────────────

    pub fn get_settings(&self) -> Result<Settings, CoreError> {
        self.repository.settings()
    }

    /// Switch the offline price source. Discards any fetched quotes.
    pub fn set_price_mode(&mut self, mode: PriceMode) -> Result<(), CoreError> {
        let mut settings = self.repository.settings()?;
        settings.price_mode = mode;
        self.repository.update_settings(settings)?;
        self.price_source = mode.price_source();
        Ok(())
    }

    pub fn set_base_currency(&mut self, currency: &str) -> Result<(), CoreError> {
        let code = currency.trim().to_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::ValidationError(format!(
                "Invalid currency code '{currency}' — expected 3 letters (e.g., USD)"
            )));
        }
        let mut settings = self.repository.settings()?;
        settings.base_currency = code;
        self.repository.update_settings(settings)
    }

    /// Store an API key. Takes effect for providers on the next `Stevest::new`.
    pub fn set_api_key(&mut self, provider: &str, key: &str) -> Result<(), CoreError> {
        let mut settings = self.repository.settings()?;
        settings.api_keys.insert(provider.to_lowercase(), key.to_string());
        self.repository.update_settings(settings)
    }

    /// Returns whether a key was stored for `provider`.
    pub fn remove_api_key(&mut self, provider: &str) -> Result<bool, CoreError> {
        let mut settings = self.repository.settings()?;
        let removed = settings.api_keys.remove(&provider.to_lowercase()).is_some();
        if removed {
            self.repository.update_settings(settings)?;
        }
        Ok(removed)
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all transactions (date ascending) as pretty JSON.
    pub fn export_transactions_to_json(&self) -> Result<String, CoreError> {
        let txs = self.repository.list_transactions()?;
        serde_json::to_string_pretty(&txs)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize transactions to JSON: {e}")))
    }

    /// Export all transactions (date ascending) as CSV.
    /// Columns: id, account_id, type, symbol, quantity, price_per_unit, amount, fees, date, notes
    pub fn export_transactions_to_csv(&self) -> Result<String, CoreError> {
        let mut csv = String::from(
            "id,account_id,type,symbol,quantity,price_per_unit,amount,fees,date,notes\n",
        );
        for tx in self.repository.list_transactions()? {
            let notes = tx.notes.as_deref().unwrap_or("");
            let escaped_notes = if notes.contains(',') || notes.contains('"') || notes.contains('\n') {
                format!("\"{}\"", notes.replace('"', "\"\""))
            } else {
                notes.to_string()
            };
            let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{}\n",
                tx.id,
                tx.account_id,
                tx.transaction_type,
                tx.symbol.as_deref().unwrap_or(""),
                opt(tx.quantity),
                opt(tx.price_per_unit),
                tx.amount,
                tx.fees,
                tx.date,
                escaped_notes,
            ));
        }
        Ok(csv)
    }

    /// Import transactions from JSON, validating each one. Rows accepted
    /// before a rejected one stay recorded. Returns the number imported.
    pub fn import_transactions_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let txs: Vec<Transaction> = serde_json::from_str(json)?;
        Ok(self.add_transactions(txs)?.len())
    }
}
