//! Free-text search and the suggestion cursor.
//!
//! A search term is split on whitespace into lowercase terms, and an item
//! qualifies only when *every* term appears as a case-insensitive
//! substring of its display name or of the rendered text of any value of
//! any searchable facet it carries. Substring means substring - "car"
//! matches "Bluecar Deluxe" even though it isn't a whitespace-bounded
//! token there.
//!
//! The suggestion cursor is the keyboard side of the word wheel: an index
//! into an externally ranked completion list, where -1 means "show the
//! raw typed text". Ranking is the caller's job; this module only
//! navigates and commits.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::format::facet_value_string;
use crate::types::Item;

/// The most suggestions a word wheel renders at once.
pub const MAX_SUGGESTIONS: usize = 15;

// =============================================================================
// QUERIES
// =============================================================================

/// A parsed search term: the lowercase terms that must all match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    /// Tokenize a raw term. Returns `None` when the term contains no
    /// tokens - whitespace-only input is "no search", not "match all".
    pub fn parse(term: &str) -> Option<SearchQuery> {
        let terms: Vec<String> = term
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if terms.is_empty() {
            None
        } else {
            Some(SearchQuery { terms })
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Does the item satisfy every term?
    ///
    /// `searchable_facets` are the facet names eligible for the word
    /// wheel; values render through `format` so a term matches exactly
    /// what a user would see in the details view.
    pub fn matches(&self, item: &Item, searchable_facets: &[String]) -> bool {
        let name = item.name.to_lowercase();
        self.terms.iter().all(|term| {
            name.contains(term)
                || searchable_facets.iter().any(|facet| {
                    item.values(facet).is_some_and(|values| {
                        values
                            .iter()
                            .any(|v| facet_value_string(v).to_lowercase().contains(term))
                    })
                })
        })
    }
}

/// The byte range of the first case-insensitive occurrence of `term`
/// inside `suggestion`, for bolding the matched part of a completion.
///
/// Offsets are computed on the lowercase folding of both strings, which
/// is what the rendered word wheel shows.
pub fn match_range(suggestion: &str, term: &str) -> Option<(usize, usize)> {
    let haystack = suggestion.to_lowercase();
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return None;
    }
    haystack.find(&needle).map(|start| (start, start + needle.len()))
}

// =============================================================================
// SUGGESTION CURSOR
// =============================================================================

/// Search term, suggestion list, and cursor for one browsing session.
///
/// The cursor lives in `[-1, suggestions.len() - 1]`; -1 selects the
/// originally typed text. Moving past either end wraps to the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    /// The committed search, or `None` when no search is active.
    term: Option<String>,
    /// What the user actually typed, restored when the cursor is at -1.
    typed: Option<String>,
    /// Last rendered completion list, ranked by the caller.
    suggestions: Vec<String>,
    cursor: isize,
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState::new()
    }
}

impl SearchState {
    pub fn new() -> Self {
        SearchState {
            term: None,
            typed: None,
            suggestions: Vec::new(),
            cursor: -1,
        }
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// The active query, if a non-empty term is committed.
    pub fn query(&self) -> Option<SearchQuery> {
        self.term.as_deref().and_then(SearchQuery::parse)
    }

    pub fn set_term(&mut self, term: &str) {
        debug!(term, "set search term");
        self.term = Some(term.to_string());
        self.reset_suggestions();
    }

    pub fn clear_term(&mut self) {
        self.term = None;
        self.reset_suggestions();
    }

    /// Install a freshly ranked suggestion list for the given typed
    /// text. The list is capped at `MAX_SUGGESTIONS` and the cursor
    /// resets to the typed text.
    pub fn set_suggestions(&mut self, typed: &str, ranked: Vec<String>) {
        self.typed = Some(typed.to_string());
        self.suggestions = ranked;
        self.suggestions.truncate(MAX_SUGGESTIONS);
        self.cursor = -1;
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    /// Move the cursor by `delta`, wrapping at both ends: below -1 wraps
    /// to the last suggestion, at or past the end wraps back to -1.
    pub fn move_cursor(&mut self, delta: isize) -> isize {
        let count = self.suggestions.len() as isize;
        let mut next = self.cursor + delta;
        if next >= count {
            next = -1;
        } else if next < -1 {
            next = count - 1;
        }
        self.cursor = next;
        next
    }

    /// The text the cursor currently selects: the typed text at -1, the
    /// suggestion's full text otherwise.
    pub fn current_text(&self) -> Option<&str> {
        if self.cursor == -1 {
            self.typed.as_deref()
        } else {
            self.suggestions.get(self.cursor as usize).map(|s| s.as_str())
        }
    }

    /// Commit the cursor's text as the active search term.
    pub fn commit_cursor(&mut self) -> Option<String> {
        let text = self.current_text()?.to_string();
        self.set_term(&text);
        Some(text)
    }

    fn reset_suggestions(&mut self) {
        self.typed = None;
        self.suggestions.clear();
        self.cursor = -1;
    }
}
