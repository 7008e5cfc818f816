use std::collections::BTreeSet;

use super::{Category, LedgerError};

/// Set of categories a summary or listing is restricted to
///
/// An **empty filter means "no filter"**: every record matches. It never
/// means "match nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    categories: BTreeSet<Category>,
}

impl CategoryFilter {
    /// Filter that matches every record
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse a filter from user-supplied labels
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidCategory`] for the first unknown label
    pub fn from_labels<I, S>(labels: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .map(|label| label.as_ref().parse::<Category>())
            .collect()
    }

    /// Whether a record in `category` passes this filter
    #[must_use]
    pub fn matches(&self, category: Category) -> bool {
        self.categories.is_empty() || self.categories.contains(&category)
    }

    /// True when no category is selected, i.e. everything matches
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.categories.is_empty()
    }

    /// Selected categories in display order
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.iter().copied()
    }
}

impl FromIterator<Category> for CategoryFilter {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        Self {
            categories: iter.into_iter().collect(),
        }
    }
}
