pub mod analytics_service;
pub mod insight_service;
pub mod ledger_service;
pub mod portfolio_service;
pub mod quote_service;
