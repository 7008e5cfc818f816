/// Closed category set
pub mod category;
/// Category filter used by summaries and listings
pub mod filter;
/// Session ledger and expense records
pub mod records;
/// Derived totals and percentages
pub mod summary;

pub use category::Category;
pub use filter::CategoryFilter;
pub use records::{ExpenseLedger, ExpenseRecord};
pub use summary::{CategoryTotal, ExpenseSummary};

use rust_decimal::Decimal;
use thiserror::Error;

/// Monetary amount; the currency symbol is a display concern
pub type Amount = Decimal;

/// Validation failures when recording an expense
///
/// A rejected input never changes the ledger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Amount was zero or negative
    #[error("amount must be greater than zero (got {0})")]
    InvalidAmount(Amount),

    /// Adding the amount would overflow the ledger total
    #[error("amount {amount} would overflow the ledger total of {total}")]
    TotalOverflow {
        /// Rejected amount
        amount: Amount,
        /// Total before the rejected add
        total: Amount,
    },

    /// Category label is not part of the fixed set
    #[error("unknown category '{input}'{}", suggestion_hint(.suggestion))]
    InvalidCategory {
        /// Label as given by the caller
        input: String,
        /// Closest known category, if any
        suggestion: Option<Category>,
    },
}

fn suggestion_hint(suggestion: &Option<Category>) -> String {
    suggestion.map_or_else(String::new, |category| {
        format!(" (did you mean {category}?)")
    })
}
