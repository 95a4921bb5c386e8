//! The filter engine: active per-facet predicates and counting.
//!
//! State is an explicit map from facet name to one `FilterPredicate` -
//! never more than one per facet, and never an entry with an empty value
//! list (setting an empty list removes the entry). Predicates are plain
//! data: the facet's declared type plus the literal target values that
//! generated them, which keeps them pure, comparable, and serializable.
//!
//! `qualifying_items` recomputes the qualifying set from scratch on every
//! call. That is the contract: correctness over incremental cleverness -
//! cost is O(items × facets-per-item) and callers that need
//! responsiveness at scale should debounce, not cache.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::format::facet_value_string;
use crate::types::{EngineError, FacetType, FilterValue, Item, RankedOrder, NO_INFO};

// =============================================================================
// PREDICATES
// =============================================================================

/// One facet's active filter: the facet name, its declared type, and the
/// literal target values.
///
/// Matching rules per type:
/// - String/LongString/Link: the item matches if any of its labels for
///   the facet equals any target label; an item with no values matches
///   only when some target is the `"(no info)"` sentinel.
/// - Number/DateTime: the item matches if any of its values falls in any
///   target range (`v >= lower` and `v <= upper` if inclusive, else
///   `v < upper`; a missing bound is unbounded); an item with no values
///   matches only a range whose lower bound is unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPredicate {
    pub facet: String,
    pub facet_type: FacetType,
    pub values: Vec<FilterValue>,
}

impl FilterPredicate {
    pub fn matches(&self, item: &Item) -> bool {
        match self.facet_type {
            FacetType::String | FacetType::LongString | FacetType::Link => {
                self.matches_labels(item)
            }
            FacetType::Number | FacetType::DateTime => self.matches_ranges(item),
        }
    }

    fn matches_labels(&self, item: &Item) -> bool {
        let is_target = |label: &str| {
            self.values
                .iter()
                .any(|v| matches!(v, FilterValue::Label(t) if t == label))
        };
        match item.values(&self.facet) {
            None => is_target(NO_INFO),
            Some(values) => values.iter().filter_map(|v| v.label()).any(is_target),
        }
    }

    fn matches_ranges(&self, item: &Item) -> bool {
        match item.values(&self.facet) {
            None => self.values.iter().any(|v| match v {
                FilterValue::NumberRange { lower_bound, .. } => lower_bound.is_none(),
                FilterValue::DateRange { lower_bound, .. } => lower_bound.is_none(),
                FilterValue::Label(_) => false,
            }),
            Some(values) => values.iter().any(|value| {
                self.values.iter().any(|range| match range {
                    FilterValue::NumberRange {
                        lower_bound,
                        upper_bound,
                        inclusive,
                    } => value.as_number().is_some_and(|n| {
                        n >= lower_bound.unwrap_or(f64::NEG_INFINITY)
                            && if *inclusive {
                                n <= upper_bound.unwrap_or(f64::INFINITY)
                            } else {
                                n < upper_bound.unwrap_or(f64::INFINITY)
                            }
                    }),
                    FilterValue::DateRange {
                        lower_bound,
                        upper_bound,
                    } => value.as_date().is_some_and(|d| {
                        lower_bound.map_or(true, |lo| d >= lo)
                            && upper_bound.map_or(true, |hi| d < hi)
                    }),
                    FilterValue::Label(_) => false,
                })
            }),
        }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// The set of active filters, at most one per facet name.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    active: HashMap<String, FilterPredicate>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the filter for a facet. An empty value list
    /// clears the facet instead - the active map never holds an empty
    /// predicate.
    pub fn set_filter(&mut self, facet: &str, facet_type: FacetType, values: Vec<FilterValue>) {
        if values.is_empty() {
            self.clear_filter(facet);
            return;
        }
        debug!(facet, count = values.len(), "set filter");
        self.active.insert(
            facet.to_string(),
            FilterPredicate {
                facet: facet.to_string(),
                facet_type,
                values,
            },
        );
    }

    /// Tag-boundary variant of `set_filter` for callers holding a string
    /// type tag (restore data, CLI arguments).
    pub fn set_filter_tagged(
        &mut self,
        facet: &str,
        tag: &str,
        values: Vec<FilterValue>,
    ) -> Result<(), EngineError> {
        let facet_type = FacetType::from_tag(tag)?;
        self.set_filter(facet, facet_type, values);
        Ok(())
    }

    /// Remove a facet's filter. No-op when absent.
    pub fn clear_filter(&mut self, facet: &str) {
        if self.active.remove(facet).is_some() {
            debug!(facet, "cleared filter");
        }
    }

    pub fn clear_all(&mut self) {
        self.active.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn get(&self, facet: &str) -> Option<&FilterPredicate> {
        self.active.get(facet)
    }

    pub fn predicates(&self) -> impl Iterator<Item = &FilterPredicate> {
        self.active.values()
    }

    /// The subset of `items` satisfying every active predicate, except
    /// (optionally) the one owned by `exclude`.
    ///
    /// The exclusion is the "what-if" view: while a facet's panel is
    /// open, its value counts are computed as if that facet weren't
    /// filtered, so the user can broaden or narrow within the category
    /// without losing sibling-facet filters.
    pub fn qualifying_items<'a>(
        &self,
        items: &'a [Item],
        exclude: Option<&str>,
    ) -> Vec<&'a Item> {
        items
            .iter()
            .filter(|item| {
                self.active
                    .values()
                    .filter(|p| exclude != Some(p.facet.as_str()))
                    .all(|p| p.matches(item))
            })
            .collect()
    }
}

// =============================================================================
// TALLYING
// =============================================================================

/// One row of a value-frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueCount {
    pub label: String,
    pub count: usize,
}

/// Count occurrences of each distinct rendered label of a facet across
/// the given items. Items with no values for the facet contribute one
/// count to `"(no info)"`.
pub fn tally_values(items: &[&Item], facet: &str) -> Vec<ValueCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in items {
        match item.values(facet) {
            Some(values) => {
                for value in values {
                    *counts.entry(facet_value_string(value)).or_insert(0) += 1;
                }
            }
            None => {
                *counts.entry(NO_INFO.to_string()).or_insert(0) += 1;
            }
        }
    }
    let mut rows: Vec<ValueCount> = counts
        .into_iter()
        .map(|(label, count)| ValueCount { label, count })
        .collect();
    // stable starting point before a display comparator is applied
    rows.sort_by(|a, b| a.label.cmp(&b.label));
    rows
}

// =============================================================================
// COMPARATORS
// =============================================================================

/// Which comparator is presenting a facet's value list. Presentation
/// only - cycling the ordering never alters the active filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueOrdering {
    /// The collection's explicit ranked order, when the facet declares one.
    Ranked,
    ByQuantity,
    Alphabetical,
}

/// Higher counts first; ties keep their prior relative order.
pub fn by_quantity_descending(a: &ValueCount, b: &ValueCount) -> Ordering {
    b.count.cmp(&a.count)
}

/// Lexicographic by label, except `"(no info)"` always sorts last.
pub fn alphabetical(a: &ValueCount, b: &ValueCount) -> Ordering {
    match (a.label == NO_INFO, b.label == NO_INFO) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.label.cmp(&b.label),
    }
}

/// Order by position in an explicit ranked list; labels the list doesn't
/// mention sort after all listed ones, alphabetically among themselves.
pub fn ranked(order: &RankedOrder) -> impl Fn(&ValueCount, &ValueCount) -> Ordering + '_ {
    move |a, b| {
        let pos = |label: &str| order.order.iter().position(|o| o == label);
        match (pos(&a.label), pos(&b.label)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => alphabetical(a, b),
        }
    }
}

/// Apply the selected ordering to a tallied value list.
pub fn sort_value_counts(
    rows: &mut [ValueCount],
    ordering: ValueOrdering,
    ranked_order: Option<&RankedOrder>,
) {
    match (ordering, ranked_order) {
        (ValueOrdering::Ranked, Some(order)) => rows.sort_by(ranked(order)),
        // a facet without a declared order falls back to quantity
        (ValueOrdering::Ranked, None) | (ValueOrdering::ByQuantity, _) => {
            rows.sort_by(by_quantity_descending)
        }
        (ValueOrdering::Alphabetical, _) => rows.sort_by(alphabetical),
    }
}
