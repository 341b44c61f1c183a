//! Filtered views over the library.
//!
//! A view is always rebuilt from the library, never patched in place. Both
//! predicates are applied together and the library's order is kept.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::sample::{Category, CategoryFilter, Sample};

/// The category and text predicates of a view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Category predicate.
    pub category: CategoryFilter,
    /// Case-insensitive substring of the sample name; empty matches all.
    pub search: String,
}

impl Query {
    /// Query for a category and search text.
    pub fn new(category: impl Into<CategoryFilter>, search: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            search: search.into(),
        }
    }

    /// Whether `sample` passes both predicates.
    #[must_use]
    pub fn matches(&self, sample: &Sample) -> bool {
        Matcher::new(self).matches(sample)
    }

    /// Apply this query to `library`.
    #[must_use]
    pub fn apply(&self, library: &[Arc<Sample>]) -> Vec<Arc<Sample>> {
        filter(library, self.category, &self.search)
    }
}

impl From<Category> for Query {
    fn from(category: Category) -> Self {
        Self::new(category, "")
    }
}

/// Query with the search text lower-cased once.
struct Matcher {
    category: CategoryFilter,
    needle: Option<String>,
}

impl Matcher {
    fn new(query: &Query) -> Self {
        Self::from_parts(query.category, &query.search)
    }

    fn from_parts(category: CategoryFilter, search: &str) -> Self {
        Self {
            category,
            needle: (!search.is_empty()).then(|| search.to_lowercase()),
        }
    }

    fn matches(&self, sample: &Sample) -> bool {
        self.category.accepts(sample.category())
            && self
                .needle
                .as_deref()
                .is_none_or(|needle| sample.name().to_lowercase().contains(needle))
    }
}

/// Samples of `library` that pass `category` and contain `search`
/// (case-insensitive) in their name, in library order.
#[must_use]
pub fn filter(library: &[Arc<Sample>], category: CategoryFilter, search: &str) -> Vec<Arc<Sample>> {
    let matcher = Matcher::from_parts(category, search);
    library
        .iter()
        .filter(|sample| matcher.matches(sample))
        .cloned()
        .collect()
}
