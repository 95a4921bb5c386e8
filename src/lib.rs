//! Faceted filtering and search with adaptive temporal histograms.
//!
//! This crate is the engine behind a Pivot-style faceted browser: given
//! an in-memory collection of richly-attributed items, it decides which
//! items qualify under any combination of categorical, numeric, string,
//! and temporal filters plus free-text search, and it renders temporal
//! facets as adaptively-scaled histogram buckets.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌─────────────┐
//! │  types.rs   │──▶│  filter.rs   │──▶│ browser.rs  │
//! │ (Item,Facet,│   │ (predicates, │   │(FacetBrowser│
//! │ FilterValue)│   │  tallying)   │   │ combinator) │
//! └─────────────┘   └──────────────┘   └─────────────┘
//!        │          ┌──────────────┐          ▲
//!        ├─────────▶│  buckets.rs  │──────────┤
//!        │          │ (DateScale,  │          │
//!        │          │  histograms) │          │
//!        │          └──────────────┘          │
//!        │          ┌──────────────┐          │
//!        └─────────▶│  search.rs   │──────────┘
//!                   │ (SearchQuery,│
//!                   │  word wheel) │
//!                   └──────────────┘
//! ```
//!
//! The rendering surface is a pure consumer: it calls `FacetBrowser`
//! operations and draws their outputs. Nothing in here touches a UI.
//!
//! # Usage
//!
//! ```
//! use pivot::{Collection, Facet, FacetBrowser, FacetType, FacetValue, FilterValue, Item};
//! use std::collections::HashMap;
//!
//! let collection = Collection {
//!     facets: vec![Facet::new("Color", FacetType::String)],
//!     items: vec![Item {
//!         id: "1".to_string(),
//!         name: "Cherry".to_string(),
//!         href: None,
//!         description: None,
//!         facets: HashMap::from([(
//!             "Color".to_string(),
//!             vec![FacetValue::Text("Red".to_string())],
//!         )]),
//!     }],
//! };
//!
//! let mut browser = FacetBrowser::new(collection);
//! browser
//!     .set_facet_filter("Color", vec![FilterValue::Label("Red".to_string())])
//!     .unwrap();
//! assert_eq!(browser.qualifying_items().len(), 1);
//! ```

mod browser;
mod buckets;
mod filter;
mod format;
mod search;
pub mod testing;
mod types;

pub use browser::FacetBrowser;
pub use buckets::{
    choose_scale, count_buckets, date_extent, generate_buckets, two_scale_buckets, BucketLabel,
    DateBucket, DateScale, TwoScaleBuckets, FINEST_SCALE_CODE,
};
pub use filter::{
    alphabetical, by_quantity_descending, ranked, sort_value_counts, tally_values, FilterEngine,
    FilterPredicate, ValueCount, ValueOrdering,
};
pub use format::{facet_value_string, format_date_time, format_number};
pub use search::{match_range, SearchQuery, SearchState, MAX_SUGGESTIONS};
pub use types::{
    Collection, EngineError, Facet, FacetType, FacetValue, FilterValue, Item, RankedOrder, NO_INFO,
};
