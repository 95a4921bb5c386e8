//! The building blocks of a faceted collection.
//!
//! These types define how items, facet definitions, and filter values fit
//! together. Everything downstream (bucketing, filtering, search) reads
//! this model and nothing here is mutated after a collection is loaded.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **Item**: `facets` maps facet name to a non-empty ordered value list.
//!   An absent key means "no info" - code that cares about missing facets
//!   must check for absence, never for an empty list.
//!
//! - **Facet**: `name` is the unique key into the collection's facet map,
//!   and `facet_type` never changes once the collection is loaded.
//!   Replacing the facet set resets every active filter, because filter
//!   predicates reference facet identity.
//!
//! - **FilterValue**: a range with `lower_bound: None` is the "unset"
//!   sentinel - it matches items carrying *no* values for the facet.
//!   See `FilterPredicate` in `filter` for the exact matching rules.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Label under which items missing a facet are tallied and filtered.
///
/// This literal is user-visible (it shows up in value lists next to real
/// labels) and is also the sentinel a string filter uses to select items
/// with no values for the facet.
pub const NO_INFO: &str = "(no info)";

// =============================================================================
// FACET TYPES
// =============================================================================

/// Declared type of a facet category.
///
/// This is a closed enumeration: filter construction, value rendering, and
/// comparator selection all match on it exhaustively, so adding a new facet
/// type is a compile-time-checked exercise. The serialized tags
/// (`"String"`, `"LongString"`, ...) are the same tags the collection
/// format uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacetType {
    String,
    LongString,
    Link,
    Number,
    DateTime,
}

impl FacetType {
    /// The serialized tag for this type.
    pub fn as_tag(self) -> &'static str {
        match self {
            FacetType::String => "String",
            FacetType::LongString => "LongString",
            FacetType::Link => "Link",
            FacetType::Number => "Number",
            FacetType::DateTime => "DateTime",
        }
    }

    /// Parse a serialized tag.
    ///
    /// This is the boundary where `UnknownFacetType` comes from: internal
    /// code passes `FacetType` values around and cannot hit it, but
    /// restore data and CLI arguments arrive as strings.
    pub fn from_tag(tag: &str) -> Result<Self, EngineError> {
        match tag {
            "String" => Ok(FacetType::String),
            "LongString" => Ok(FacetType::LongString),
            "Link" => Ok(FacetType::Link),
            "Number" => Ok(FacetType::Number),
            "DateTime" => Ok(FacetType::DateTime),
            _ => Err(EngineError::UnknownFacetType {
                tag: tag.to_string(),
            }),
        }
    }

    /// String-like types filter by label equality; Number/DateTime filter
    /// by range membership.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            FacetType::String | FacetType::LongString | FacetType::Link
        )
    }
}

impl fmt::Display for FacetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

// =============================================================================
// FACET VALUES
// =============================================================================

/// One typed value an item carries for a facet.
///
/// String/LongString facets carry `Text`; Link carries a label plus an
/// href; Number carries a float; DateTime carries a timezone-naive
/// instant (the collection format has no zone information).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacetValue {
    Text(String),
    Link { label: String, href: String },
    Number(f64),
    Date(NaiveDateTime),
}

impl FacetValue {
    /// The label text for filtering purposes, if this is a string-like
    /// value. Link values compare by label, never by href.
    pub fn label(&self) -> Option<&str> {
        match self {
            FacetValue::Text(s) => Some(s),
            FacetValue::Link { label, .. } => Some(label),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FacetValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            FacetValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

// =============================================================================
// ITEMS
// =============================================================================

/// One richly-attributed item in the collection.
///
/// Items are created by the ingestion side and are read-only here: the
/// engine decides which items qualify, it never changes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Stable unique identifier.
    pub id: String,
    /// Display name, also the primary text-search target.
    pub name: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Facet name → ordered value list. Absent key = "no info".
    #[serde(default)]
    pub facets: HashMap<String, Vec<FacetValue>>,
}

impl Item {
    /// The item's values for a facet, or `None` when it has no info.
    pub fn values(&self, facet: &str) -> Option<&[FacetValue]> {
        self.facets.get(facet).map(|v| v.as_slice())
    }
}

// =============================================================================
// FACET DEFINITIONS
// =============================================================================

/// An explicit ranked value order declared by the collection, usable as an
/// alternate comparator for a string-like facet ("Sort: Size" with
/// small < medium < large, say).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedOrder {
    pub name: String,
    pub order: Vec<String>,
}

fn default_visible() -> bool {
    true
}

/// A facet category definition. Immutable once the collection is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facet {
    pub name: String,
    #[serde(rename = "type")]
    pub facet_type: FacetType,
    /// Ordinal position for display ordering.
    #[serde(default)]
    pub index: usize,
    /// Offered in the filter pane.
    #[serde(default = "default_visible")]
    pub is_filter_visible: bool,
    /// Shown in the item details view.
    #[serde(default = "default_visible")]
    pub is_details_visible: bool,
    /// Eligible for free-text search.
    #[serde(default = "default_visible")]
    pub is_search_visible: bool,
    #[serde(default)]
    pub ranked_order: Option<RankedOrder>,
}

impl Facet {
    /// A facet with default visibility: everything on, except that search
    /// eligibility defaults off for Number/DateTime facets (collections
    /// usually want text search over names and labels, not over rendered
    /// numbers - an explicit flag can still opt them in).
    pub fn new(name: impl Into<String>, facet_type: FacetType) -> Self {
        Facet {
            name: name.into(),
            facet_type,
            index: 0,
            is_filter_visible: true,
            is_details_visible: true,
            is_search_visible: facet_type.is_string_like(),
            ranked_order: None,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_ranked_order(mut self, name: impl Into<String>, order: Vec<String>) -> Self {
        self.ranked_order = Some(RankedOrder {
            name: name.into(),
            order,
        });
        self
    }
}

/// A whole collection as produced by the ingestion side: the facet schema
/// plus the item list. This is the wholesale-replaced unit - loading a new
/// `Collection` into a browser resets all filter and search state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(default)]
    pub facets: Vec<Facet>,
    #[serde(default)]
    pub items: Vec<Item>,
}

// =============================================================================
// FILTER VALUES
// =============================================================================

/// One literal target value of a filter predicate.
///
/// String-like facets use `Label`; Number facets use `NumberRange`;
/// DateTime facets use `DateRange`. Date ranges are always half-open
/// (upper bound exclusive) because they come from bucket intervals;
/// number ranges carry an explicit inclusivity flag because a slider can
/// end exactly on a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterValue {
    Label(String),
    NumberRange {
        /// `None` is the "unset" sentinel: matches items with no values.
        lower_bound: Option<f64>,
        upper_bound: Option<f64>,
        inclusive: bool,
    },
    DateRange {
        lower_bound: Option<NaiveDateTime>,
        upper_bound: Option<NaiveDateTime>,
    },
}

impl FilterValue {
    /// The filter selecting exactly one displayed value, as used when the
    /// user clicks a value in the details view: labels match themselves,
    /// numbers become the inclusive range `[v, v]`, and dates become the
    /// half-open second `[v, v + 1s)`.
    pub fn pinpoint(value: &FacetValue) -> FilterValue {
        match value {
            FacetValue::Text(s) => FilterValue::Label(s.clone()),
            FacetValue::Link { label, .. } => FilterValue::Label(label.clone()),
            FacetValue::Number(n) => FilterValue::NumberRange {
                lower_bound: Some(*n),
                upper_bound: Some(*n),
                inclusive: true,
            },
            FacetValue::Date(d) => FilterValue::DateRange {
                lower_bound: Some(*d),
                upper_bound: Some(*d + chrono::Duration::seconds(1)),
            },
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Everything that can go wrong inside the engine.
///
/// All of these are recoverable: the failing operation is a no-op and
/// prior state is kept. A failed bucket computation for one facet must
/// never prevent filtering by other facets.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Bucket generation over an inverted interval, or a scale code finer
    /// than the finest supported granularity.
    InvalidRange { reason: String },
    /// A facet type tag that isn't one of the five known tags.
    UnknownFacetType { tag: String },
    /// Serialized filter state that can't be decoded.
    MalformedRestoreData { reason: String },
}

impl EngineError {
    pub(crate) fn inverted_range(min: NaiveDateTime, max: NaiveDateTime) -> Self {
        EngineError::InvalidRange {
            reason: format!("max {} precedes min {}", max, min),
        }
    }

    pub(crate) fn scale_too_fine(code: i32) -> Self {
        EngineError::InvalidRange {
            reason: format!("scale code {} is below the finest granularity", code),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidRange { reason } => {
                write!(f, "invalid range: {}", reason)
            }
            EngineError::UnknownFacetType { tag } => {
                write!(f, "unknown facet type \"{}\"", tag)
            }
            EngineError::MalformedRestoreData { reason } => {
                write!(f, "malformed restore data: {}", reason)
            }
        }
    }
}

impl std::error::Error for EngineError {}
