use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::LedgerError;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion
const SUGGESTION_THRESHOLD: f64 = 0.7;

/// Fixed set of expense categories
///
/// The set is closed: extending it is a code change, never a runtime decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Meals, groceries, snacks
    Food,
    /// Fares, fuel, tickets
    Transport,
    /// Purchases of goods
    Shopping,
    /// Utilities, rent, subscriptions
    Bills,
    /// Anything else
    Other,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Self; 5] = [
        Self::Food,
        Self::Transport,
        Self::Shopping,
        Self::Bills,
        Self::Other,
    ];

    /// Canonical label shown to the user
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Shopping => "Shopping",
            Self::Bills => "Bills",
            Self::Other => "Other",
        }
    }

    /// Closest category to a mistyped label, if any is similar enough
    ///
    /// Matching is case-insensitive and uses Jaro-Winkler similarity.
    #[must_use]
    pub fn suggest(input: &str) -> Option<Self> {
        let normalized = input.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        let mut best_match: Option<(Self, f64)> = None;
        for category in Self::ALL {
            let similarity =
                strsim::jaro_winkler(&normalized, &category.label().to_lowercase());

            if similarity >= SUGGESTION_THRESHOLD {
                if let Some((_, best_score)) = best_match {
                    if similarity > best_score {
                        best_match = Some((category, similarity));
                    }
                } else {
                    best_match = Some((category, similarity));
                }
            }
        }

        if let Some((category, score)) = best_match {
            debug!(input = input, suggestion = %category, similarity = %score, "category suggestion");
        }
        best_match.map(|(category, _)| category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LedgerError::InvalidCategory {
                input: trimmed.to_owned(),
                suggestion: Self::suggest(trimmed),
            })
    }
}
