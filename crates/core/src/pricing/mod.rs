pub mod quoted;
pub mod source;

pub use quoted::{QuoteBook, QuotedPriceSource};
pub use source::{CostBasisPriceSource, DeterministicPriceSource, PriceSource};
