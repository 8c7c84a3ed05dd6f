pub mod account;
pub mod analytics;
pub mod dividend;
pub mod ledger;
pub mod settings;
pub mod snapshot;
pub mod transaction;
