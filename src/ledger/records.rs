use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::{Amount, Category, CategoryFilter, ExpenseSummary, LedgerError};

/// One logged expense
///
/// Records are immutable once created; the only way to remove one is
/// [`ExpenseLedger::clear`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord {
    amount: Amount,
    category: Category,
    description: String,
}

impl ExpenseRecord {
    /// Amount spent, always greater than zero
    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    /// Category the expense belongs to
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Free-form description, possibly empty
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Expense records for one session, in insertion order
///
/// The sum of all amounts is kept alongside the records and must stay
/// representable, so every subset total (and every percentage) is exact.
///
/// The ledger is either empty or holds records: [`add`](Self::add) moves it to
/// (or keeps it in) the latter, [`clear`](Self::clear) always returns it to the
/// former. Summaries never change state.
#[derive(Debug, Default)]
pub struct ExpenseLedger {
    records: Vec<ExpenseRecord>,
    total: Amount,
}

impl ExpenseLedger {
    /// Creates an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a new expense, parsing `category` from its label
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidAmount`] if `amount <= 0`,
    /// [`LedgerError::TotalOverflow`] if the ledger total can't hold it, or
    /// [`LedgerError::InvalidCategory`] if the label is not a known category.
    /// The ledger is left unchanged on error.
    pub fn add(
        &mut self,
        amount: Amount,
        category: &str,
        description: impl Into<String>,
    ) -> Result<&ExpenseRecord, LedgerError> {
        let total = self.checked_total(amount)?;
        let category = category.parse::<Category>().inspect_err(|err| {
            warn!(error = %err, "rejected expense");
        })?;
        Ok(self.push(total, amount, category, description.into()))
    }

    /// Validates and appends a new expense with an already typed category
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidAmount`] if `amount <= 0`, or
    /// [`LedgerError::TotalOverflow`] if the ledger total can't hold it
    pub fn add_record(
        &mut self,
        amount: Amount,
        category: Category,
        description: impl Into<String>,
    ) -> Result<&ExpenseRecord, LedgerError> {
        let total = self.checked_total(amount)?;
        Ok(self.push(total, amount, category, description.into()))
    }

    /// Removes every record; returns how many were dropped
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        self.total = Decimal::ZERO;
        info!(removed = removed, "ledger cleared");
        removed
    }

    /// Totals and percentages over the records matching `filter`
    ///
    /// An empty filter includes every record. When nothing matches the result
    /// is [`ExpenseSummary::is_empty`] with a zero total.
    #[must_use]
    pub fn summarize(&self, filter: &CategoryFilter) -> ExpenseSummary {
        let summary = ExpenseSummary::from_records(self.filtered(filter));
        debug!(
            records = self.records.len(),
            unrestricted = filter.is_unrestricted(),
            categories = summary.categories().len(),
            total = %summary.total(),
            "ledger summarized"
        );
        summary
    }

    /// Records matching `filter`, in insertion order
    pub fn filtered<'a>(
        &'a self,
        filter: &'a CategoryFilter,
    ) -> impl Iterator<Item = &'a ExpenseRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| filter.matches(record.category))
    }

    /// All records, in insertion order
    #[must_use]
    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    /// Number of records held
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the ledger holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of every amount in the ledger
    #[must_use]
    pub const fn total(&self) -> Amount {
        self.total
    }

    /// New ledger total after adding `amount`, or why it can't be added
    fn checked_total(&self, amount: Amount) -> Result<Amount, LedgerError> {
        if amount <= Decimal::ZERO {
            warn!(amount = %amount, "rejected expense with non-positive amount");
            return Err(LedgerError::InvalidAmount(amount));
        }
        self.total.checked_add(amount).ok_or_else(|| {
            warn!(amount = %amount, total = %self.total, "rejected expense overflowing ledger total");
            LedgerError::TotalOverflow {
                amount,
                total: self.total,
            }
        })
    }

    fn push(
        &mut self,
        total: Amount,
        amount: Amount,
        category: Category,
        description: String,
    ) -> &ExpenseRecord {
        debug!(amount = %amount, category = %category, "expense added");
        self.total = total;
        let index = self.records.len();
        self.records.push(ExpenseRecord {
            amount,
            category,
            description,
        });
        &self.records[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ledger() -> ExpenseLedger {
        let mut ledger = ExpenseLedger::new();
        ledger.add(Decimal::from(100), "Food", "lunch").unwrap();
        ledger.add(Decimal::from(50), "Transport", "bus").unwrap();
        ledger.add(Decimal::from(25), "Food", "snack").unwrap();
        ledger
    }

    #[test]
    fn test_add_returns_created_record() {
        let mut ledger = ExpenseLedger::new();
        let record = ledger
            .add(Decimal::new(1250, 2), "shopping", "socks")
            .unwrap()
            .clone();

        assert_eq!(record.amount(), Decimal::new(1250, 2));
        assert_eq!(record.category(), Category::Shopping);
        assert_eq!(record.description(), "socks");
        assert_eq!(ledger.records(), &[record]);
    }

    #[test]
    fn test_add_accepts_empty_description() {
        let mut ledger = ExpenseLedger::new();
        ledger.add(Decimal::ONE, "Other", "").unwrap();
        assert_eq!(ledger.records()[0].description(), "");
    }

    #[test]
    fn test_add_accepts_fractional_amount() {
        let mut ledger = ExpenseLedger::new();
        assert!(ledger.add(Decimal::new(1, 2), "Bills", "fee").is_ok());
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let ledger = sample_ledger();
        let descriptions: Vec<_> = ledger.records().iter().map(ExpenseRecord::description).collect();
        assert_eq!(descriptions, vec!["lunch", "bus", "snack"]);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut ledger = sample_ledger();
        let err = ledger.add(Decimal::ZERO, "Food", "free").unwrap_err();
        assert_eq!(err, LedgerError::InvalidAmount(Decimal::ZERO));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut ledger = sample_ledger();
        let err = ledger
            .add_record(Decimal::from(-5), Category::Food, "refund")
            .unwrap_err();
        assert_eq!(err, LedgerError::InvalidAmount(Decimal::from(-5)));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut ledger = sample_ledger();
        let err = ledger.add(Decimal::from(10), "Unknown", "??").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidCategory { .. }));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_amount_checked_before_category() {
        let mut ledger = ExpenseLedger::new();
        let err = ledger.add(Decimal::ZERO, "Unknown", "").unwrap_err();
        assert_eq!(err, LedgerError::InvalidAmount(Decimal::ZERO));
    }

    #[test]
    fn test_overflowing_amount_rejected() {
        let mut ledger = ExpenseLedger::new();
        ledger.add(Decimal::MAX, "Food", "everything").unwrap();

        let err = ledger.add(Decimal::MAX, "Transport", "more").unwrap_err();
        assert_eq!(
            err,
            LedgerError::TotalOverflow {
                amount: Decimal::MAX,
                total: Decimal::MAX,
            }
        );
        let err = ledger
            .add_record(Decimal::ONE, Category::Bills, "one more")
            .unwrap_err();
        assert!(matches!(err, LedgerError::TotalOverflow { .. }));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total(), Decimal::MAX);
    }

    #[test]
    fn test_overflow_checked_before_category() {
        let mut ledger = ExpenseLedger::new();
        ledger.add(Decimal::MAX, "Food", "").unwrap();
        let err = ledger.add(Decimal::MAX, "Unknown", "").unwrap_err();
        assert!(matches!(err, LedgerError::TotalOverflow { .. }));
    }

    #[test]
    fn test_clear_resets_total() {
        let mut ledger = ExpenseLedger::new();
        ledger.add(Decimal::MAX, "Food", "").unwrap();
        ledger.clear();
        assert_eq!(ledger.total(), Decimal::ZERO);
        assert!(ledger.add(Decimal::MAX, "Bills", "").is_ok());
    }

    #[test]
    fn test_clear_empties_ledger() {
        let mut ledger = sample_ledger();
        assert_eq!(ledger.clear(), 3);
        assert!(ledger.is_empty());
        assert!(ledger.summarize(&CategoryFilter::all()).is_empty());
    }

    #[test]
    fn test_clear_on_empty_ledger() {
        let mut ledger = ExpenseLedger::new();
        assert_eq!(ledger.clear(), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_add_after_clear() {
        let mut ledger = sample_ledger();
        ledger.clear();
        ledger.add(Decimal::from(7), "Bills", "water").unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.summarize(&CategoryFilter::all()).total(), Decimal::from(7));
    }

    #[test]
    fn test_summarize_all() {
        let ledger = sample_ledger();
        let summary = ledger.summarize(&CategoryFilter::all());

        assert_eq!(summary.total(), Decimal::from(175));
        assert_eq!(summary.category_total(Category::Food), Some(Decimal::from(125)));
        assert_eq!(summary.category_total(Category::Transport), Some(Decimal::from(50)));
        assert_eq!(summary.percent(Category::Food), Some(71));
        assert_eq!(summary.percent(Category::Transport), Some(28));
        assert_eq!(summary.category_total(Category::Bills), None);
    }

    #[test]
    fn test_summarize_keeps_first_seen_order() {
        let mut ledger = ExpenseLedger::new();
        ledger.add(Decimal::from(5), "Bills", "").unwrap();
        ledger.add(Decimal::from(5), "Food", "").unwrap();
        ledger.add(Decimal::from(5), "Bills", "").unwrap();
        ledger.add(Decimal::from(5), "Other", "").unwrap();

        let order: Vec<_> = ledger
            .summarize(&CategoryFilter::all())
            .categories()
            .iter()
            .map(|entry| entry.category)
            .collect();
        assert_eq!(order, vec![Category::Bills, Category::Food, Category::Other]);
    }

    #[test]
    fn test_summarize_single_category_filter() {
        let ledger = sample_ledger();
        let filter: CategoryFilter = std::iter::once(Category::Transport).collect();
        let summary = ledger.summarize(&filter);

        assert_eq!(summary.total(), Decimal::from(50));
        assert_eq!(summary.categories().len(), 1);
        assert_eq!(summary.percent(Category::Transport), Some(100));
    }

    #[test]
    fn test_summarize_filter_without_matches() {
        let ledger = sample_ledger();
        let filter: CategoryFilter = std::iter::once(Category::Shopping).collect();
        let summary = ledger.summarize(&filter);

        assert!(summary.is_empty());
        assert_eq!(summary.total(), Decimal::ZERO);
    }

    #[test]
    fn test_summarize_empty_ledger() {
        let summary = ExpenseLedger::new().summarize(&CategoryFilter::all());
        assert!(summary.is_empty());
        assert_eq!(summary.total(), Decimal::ZERO);
        assert!(summary.categories().is_empty());
    }

    #[test]
    fn test_summarize_does_not_change_state() {
        let ledger = sample_ledger();
        let first = ledger.summarize(&CategoryFilter::all());
        let second = ledger.summarize(&CategoryFilter::all());
        assert_eq!(first, second);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_filtered_listing() {
        let ledger = sample_ledger();
        let filter: CategoryFilter = std::iter::once(Category::Food).collect();
        let listed: Vec<_> = ledger.filtered(&filter).map(ExpenseRecord::description).collect();
        assert_eq!(listed, vec!["lunch", "snack"]);
    }

    #[test]
    fn test_unfiltered_total_matches_sum_of_adds() {
        let amounts = [3, 14, 15, 92, 65, 35, 89, 79];
        let labels = ["Food", "Transport", "Shopping", "Bills", "Other"];
        let mut ledger = ExpenseLedger::new();
        for (i, amount) in amounts.iter().enumerate() {
            ledger
                .add(Decimal::from(*amount), labels[i % labels.len()], "")
                .unwrap();
        }

        let summary = ledger.summarize(&CategoryFilter::all());
        assert_eq!(summary.total(), Decimal::from(amounts.iter().sum::<i32>()));
        assert_eq!(summary.total(), ledger.total());
    }
}
