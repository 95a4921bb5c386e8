//! The filter combinator: one faceted browsing session.
//!
//! `FacetBrowser` owns a loaded collection plus the filter and search
//! state for browsing it, and composes the two qualifying rules:
//!
//! ```text
//! qualifying = FilterEngine::qualifying_items ∩ search-term matches
//! ```
//!
//! Every mutating operation is synchronous and leaves the browser in a
//! state from which `qualifying_items` can be recomputed from scratch.
//! There is deliberately no caching of qualifying sets - each call
//! recomputes, and a newer call fully supersedes an older one.
//!
//! The browser also carries the presentation-only comparator selection
//! for each facet's value list and the serialize/restore contract for
//! filter state (filters + search term + comparator selections).

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buckets::{two_scale_buckets, TwoScaleBuckets};
use crate::filter::{sort_value_counts, tally_values, FilterEngine, ValueCount, ValueOrdering};
use crate::search::SearchState;
use crate::types::{Collection, EngineError, Facet, FacetType, FilterValue, Item};

/// One browsing session over one collection.
#[derive(Debug, Default)]
pub struct FacetBrowser {
    items: Vec<Item>,
    facets: HashMap<String, Facet>,
    filters: FilterEngine,
    search: SearchState,
    /// Facet name → index into that facet's available orderings.
    orderings: HashMap<String, usize>,
}

impl FacetBrowser {
    pub fn new(collection: Collection) -> Self {
        let mut browser = FacetBrowser::default();
        browser.load_collection(collection);
        browser
    }

    /// Wholesale-replace the collection.
    ///
    /// All filters, the search term, the suggestion cursor, and the
    /// comparator selections reset, because active predicates reference
    /// facet identity in the outgoing schema.
    pub fn load_collection(&mut self, collection: Collection) {
        debug!(
            items = collection.items.len(),
            facets = collection.facets.len(),
            "load collection"
        );
        self.items = collection.items;
        self.facets = collection
            .facets
            .into_iter()
            .map(|f| (f.name.clone(), f))
            .collect();
        self.filters = FilterEngine::new();
        self.search = SearchState::new();
        self.orderings = HashMap::new();
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item_by_id(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn facet(&self, name: &str) -> Option<&Facet> {
        self.facets.get(name)
    }

    /// Filter-visible facets in their declared display order.
    pub fn filterable_facets(&self) -> Vec<&Facet> {
        let mut facets: Vec<&Facet> = self
            .facets
            .values()
            .filter(|f| f.is_filter_visible)
            .collect();
        facets.sort_by_key(|f| f.index);
        facets
    }

    /// Facet names eligible for free-text search.
    pub fn searchable_facets(&self) -> Vec<String> {
        self.facets
            .values()
            .filter(|f| f.is_search_visible)
            .map(|f| f.name.clone())
            .collect()
    }

    // =========================================================================
    // FILTER AND SEARCH MUTATIONS
    // =========================================================================

    /// Install (or, with an empty value list, remove) the filter for a
    /// facet. The facet must exist in the schema - its declared type is
    /// what shapes the predicate.
    pub fn set_facet_filter(
        &mut self,
        facet: &str,
        values: Vec<FilterValue>,
    ) -> Result<(), EngineError> {
        let facet_type = self
            .facets
            .get(facet)
            .map(|f| f.facet_type)
            .ok_or_else(|| EngineError::UnknownFacetType {
                tag: facet.to_string(),
            })?;
        self.filters.set_filter(facet, facet_type, values);
        Ok(())
    }

    pub fn clear_facet_filter(&mut self, facet: &str) {
        self.filters.clear_filter(facet);
    }

    /// Clear every facet filter and the search term.
    pub fn clear_all_filters(&mut self) {
        debug!("clear all filters");
        self.filters.clear_all();
        self.search.clear_term();
    }

    /// Set the free-text search term. Whitespace-only input clears the
    /// search instead - there is no "match all" search.
    pub fn set_search_term(&mut self, term: &str) {
        if term.trim().is_empty() {
            self.search.clear_term();
        } else {
            self.search.set_term(term);
        }
    }

    pub fn clear_search_term(&mut self) {
        self.search.clear_term();
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.term()
    }

    pub fn active_filter_count(&self) -> usize {
        self.filters.len()
    }

    // =========================================================================
    // QUALIFYING SETS
    // =========================================================================

    /// The items satisfying every active filter and the search term.
    pub fn qualifying_items(&self) -> Vec<&Item> {
        self.qualify(None)
    }

    /// The what-if set: qualifying items as if `facet` weren't filtered.
    pub fn qualifying_items_excluding(&self, facet: &str) -> Vec<&Item> {
        self.qualify(Some(facet))
    }

    fn qualify(&self, exclude: Option<&str>) -> Vec<&Item> {
        let filtered = self.filters.qualifying_items(&self.items, exclude);
        match self.search.query() {
            None => filtered,
            Some(query) => {
                let searchable = self.searchable_facets();
                filtered
                    .into_iter()
                    .filter(|item| query.matches(item, &searchable))
                    .collect()
            }
        }
    }

    // =========================================================================
    // VALUE LISTS AND HISTOGRAMS
    // =========================================================================

    /// The value-frequency table a facet's panel shows: tallied over the
    /// what-if set and sorted by the facet's active comparator.
    pub fn facet_values(&self, facet: &str) -> Vec<ValueCount> {
        let items = self.qualifying_items_excluding(facet);
        let mut rows = tally_values(&items, facet);
        let ranked = self
            .facets
            .get(facet)
            .and_then(|f| f.ranked_order.as_ref());
        sort_value_counts(&mut rows, self.active_ordering(facet), ranked);
        rows
    }

    /// The orderings a facet's panel can cycle through: the declared
    /// ranked order first when there is one, then quantity, then
    /// alphabetical.
    pub fn available_orderings(&self, facet: &str) -> Vec<ValueOrdering> {
        let has_ranked = self
            .facets
            .get(facet)
            .is_some_and(|f| f.ranked_order.is_some());
        if has_ranked {
            vec![
                ValueOrdering::Ranked,
                ValueOrdering::ByQuantity,
                ValueOrdering::Alphabetical,
            ]
        } else {
            vec![ValueOrdering::ByQuantity, ValueOrdering::Alphabetical]
        }
    }

    pub fn active_ordering(&self, facet: &str) -> ValueOrdering {
        let available = self.available_orderings(facet);
        let index = self.orderings.get(facet).copied().unwrap_or(0);
        available[index % available.len()]
    }

    /// Cycle a facet's comparator. Presentation only: the active filter
    /// is untouched.
    pub fn cycle_comparator(&mut self, facet: &str) -> ValueOrdering {
        let count = self.available_orderings(facet).len();
        let index = self.orderings.entry(facet.to_string()).or_insert(0);
        *index = (*index + 1) % count;
        self.active_ordering(facet)
    }

    /// The two-scale temporal histogram a DateTime facet's panel shows,
    /// computed over the what-if set. `Ok(None)` when no qualifying item
    /// carries the facet.
    pub fn temporal_histogram(
        &self,
        facet: &str,
    ) -> Result<Option<TwoScaleBuckets>, EngineError> {
        let items = self.qualifying_items_excluding(facet);
        two_scale_buckets(&items, facet)
    }

    // =========================================================================
    // SUGGESTIONS
    // =========================================================================

    /// Install a freshly ranked completion list for the typed text.
    /// Ranking is delegated to the item-browsing side.
    pub fn set_suggestions(&mut self, typed: &str, ranked: Vec<String>) {
        self.search.set_suggestions(typed, ranked);
    }

    /// Move the suggestion cursor, wrapping at both ends.
    pub fn move_cursor(&mut self, delta: isize) -> isize {
        self.search.move_cursor(delta)
    }

    /// The text the cursor currently selects.
    pub fn current_suggestion(&self) -> Option<&str> {
        self.search.current_text()
    }

    /// Commit the cursor's text as the active search term.
    pub fn commit_cursor(&mut self) -> Option<String> {
        self.search.commit_cursor()
    }

    // =========================================================================
    // SERIALIZE / RESTORE
    // =========================================================================

    /// Snapshot the filter state: active filters (type tag + literal
    /// values), search term, comparator selections. Date bounds
    /// serialize as epoch milliseconds; unbounded numeric bounds as
    /// null.
    pub fn serialize(&self) -> String {
        let filters: BTreeMap<String, SerializedFilter> = self
            .filters
            .predicates()
            .map(|p| {
                (
                    p.facet.clone(),
                    SerializedFilter {
                        data_type: p.facet_type.as_tag().to_string(),
                        values: p.values.iter().map(SerializedFilterValue::from).collect(),
                    },
                )
            })
            .collect();
        let state = SerializedState {
            filters,
            search: self.search.term().map(|t| t.to_string()),
            orderings: self.orderings.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        };
        // plain data with string keys; serialization cannot fail
        serde_json::to_string(&state).unwrap_or_else(|_| "{}".to_string())
    }

    /// Rebuild filter state from a `serialize` snapshot.
    ///
    /// Decoding is all-or-nothing: on any error the browser keeps its
    /// prior state untouched and the error is returned.
    pub fn restore(&mut self, data: &str) -> Result<(), EngineError> {
        let state: SerializedState =
            serde_json::from_str(data).map_err(|e| EngineError::MalformedRestoreData {
                reason: e.to_string(),
            })?;

        // build the replacement engine completely before committing
        let mut filters = FilterEngine::new();
        for (facet, serialized) in &state.filters {
            let facet_type = FacetType::from_tag(&serialized.data_type)?;
            let values = serialized
                .values
                .iter()
                .map(|v| v.to_filter_value(facet_type))
                .collect::<Result<Vec<_>, _>>()?;
            filters.set_filter(facet, facet_type, values);
        }

        debug!(filters = filters.len(), "restore filter state");
        self.filters = filters;
        match &state.search {
            Some(term) => self.set_search_term(term),
            None => self.clear_search_term(),
        }
        self.orderings = state
            .orderings
            .into_iter()
            .filter(|(facet, _)| self.facets.contains_key(facet))
            .collect();
        Ok(())
    }
}

// =============================================================================
// WIRE FORMAT
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializedState {
    #[serde(default)]
    filters: BTreeMap<String, SerializedFilter>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    orderings: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializedFilter {
    data_type: String,
    values: Vec<SerializedFilterValue>,
}

/// A label as a bare string, a range as a bounds object. Date bounds are
/// epoch milliseconds.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum SerializedFilterValue {
    Label(String),
    #[serde(rename_all = "camelCase")]
    Range {
        lower_bound: Option<f64>,
        upper_bound: Option<f64>,
        #[serde(default)]
        inclusive: bool,
    },
}

impl From<&FilterValue> for SerializedFilterValue {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::Label(label) => SerializedFilterValue::Label(label.clone()),
            FilterValue::NumberRange {
                lower_bound,
                upper_bound,
                inclusive,
            } => SerializedFilterValue::Range {
                lower_bound: lower_bound.filter(|b| b.is_finite()),
                upper_bound: upper_bound.filter(|b| b.is_finite()),
                inclusive: *inclusive,
            },
            FilterValue::DateRange {
                lower_bound,
                upper_bound,
            } => SerializedFilterValue::Range {
                lower_bound: lower_bound.map(epoch_ms),
                upper_bound: upper_bound.map(epoch_ms),
                inclusive: false,
            },
        }
    }
}

impl SerializedFilterValue {
    fn to_filter_value(&self, facet_type: FacetType) -> Result<FilterValue, EngineError> {
        match (facet_type, self) {
            (t, SerializedFilterValue::Label(label)) if t.is_string_like() => {
                Ok(FilterValue::Label(label.clone()))
            }
            (
                FacetType::Number,
                SerializedFilterValue::Range {
                    lower_bound,
                    upper_bound,
                    inclusive,
                },
            ) => {
                // null bounds re-expand to ±infinity
                Ok(FilterValue::NumberRange {
                    lower_bound: Some(lower_bound.unwrap_or(f64::NEG_INFINITY)),
                    upper_bound: Some(upper_bound.unwrap_or(f64::INFINITY)),
                    inclusive: *inclusive,
                })
            }
            (
                FacetType::DateTime,
                SerializedFilterValue::Range {
                    lower_bound,
                    upper_bound,
                    ..
                },
            ) => Ok(FilterValue::DateRange {
                lower_bound: lower_bound.map(from_epoch_ms).transpose()?,
                upper_bound: upper_bound.map(from_epoch_ms).transpose()?,
            }),
            _ => Err(EngineError::MalformedRestoreData {
                reason: format!("value shape does not fit facet type {}", facet_type),
            }),
        }
    }
}

fn epoch_ms(instant: NaiveDateTime) -> f64 {
    instant.and_utc().timestamp_millis() as f64
}

fn from_epoch_ms(ms: f64) -> Result<NaiveDateTime, EngineError> {
    DateTime::from_timestamp_millis(ms as i64)
        .map(|d| d.naive_utc())
        .ok_or_else(|| EngineError::MalformedRestoreData {
            reason: format!("date bound {} out of range", ms),
        })
}
