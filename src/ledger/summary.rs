use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{Amount, Category, ExpenseRecord};

/// Total and share of one category within a summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    /// Category the entry aggregates
    pub category: Category,
    /// Sum of amounts in this category
    pub total: Amount,
    /// `floor(total / summary total * 100)`
    pub percent: u32,
}

/// Aggregate view over a filtered set of records
///
/// Derived on demand and never stored; recompute after any change to the
/// ledger or the filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpenseSummary {
    total: Amount,
    categories: Vec<CategoryTotal>,
}

impl ExpenseSummary {
    /// Aggregates `records`, keeping categories in first-seen order
    ///
    /// The records must come from an [`ExpenseLedger`](super::ExpenseLedger),
    /// whose total is kept representable, so none of these sums overflow.
    pub(crate) fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ExpenseRecord>,
    {
        let mut total = Decimal::ZERO;
        let mut totals: Vec<(Category, Amount)> = Vec::new();

        for record in records {
            total += record.amount();
            match totals
                .iter_mut()
                .find(|(category, _)| *category == record.category())
            {
                Some((_, sum)) => *sum += record.amount(),
                None => totals.push((record.category(), record.amount())),
            }
        }

        // No records: no division, caller renders the empty state
        if totals.is_empty() {
            return Self::default();
        }

        let categories = totals
            .into_iter()
            .map(|(category, amount)| CategoryTotal {
                category,
                total: amount,
                percent: floor_percent(amount, total),
            })
            .collect();

        Self { total, categories }
    }

    /// True when no record matched; the total is then zero
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Sum of all matched amounts
    #[must_use]
    pub const fn total(&self) -> Amount {
        self.total
    }

    /// Per-category entries in first-seen order
    #[must_use]
    pub fn categories(&self) -> &[CategoryTotal] {
        &self.categories
    }

    /// Summed amount for `category`, if it appears in the summary
    #[must_use]
    pub fn category_total(&self, category: Category) -> Option<Amount> {
        self.entry(category).map(|entry| entry.total)
    }

    /// Floored percentage of the total for `category`, if it appears
    #[must_use]
    pub fn percent(&self, category: Category) -> Option<u32> {
        self.entry(category).map(|entry| entry.percent)
    }

    fn entry(&self, category: Category) -> Option<&CategoryTotal> {
        self.categories.iter().find(|entry| entry.category == category)
    }
}

/// `part <= total` and `total > 0`, so the quotient stays within 0..=100
fn floor_percent(part: Amount, total: Amount) -> u32 {
    (part / total * Decimal::ONE_HUNDRED)
        .floor()
        .to_u32()
        .unwrap_or(0)
}
