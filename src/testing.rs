//! Canonical test fixtures.
//!
//! Shared by the in-crate unit tests and the `tests/` suites so that
//! every test builds items the same way.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::{FacetValue, Item};

/// An item with a single facet value.
pub fn item_with(id: &str, name: &str, facet: &str, value: FacetValue) -> Item {
    items_with(id, name, facet, vec![value])
}

/// An item with several values for one facet.
pub fn items_with(id: &str, name: &str, facet: &str, values: Vec<FacetValue>) -> Item {
    let mut facets = HashMap::new();
    facets.insert(facet.to_string(), values);
    Item {
        id: id.to_string(),
        name: name.to_string(),
        href: None,
        description: None,
        facets,
    }
}

/// An item carrying no facet info at all.
pub fn no_facets(id: &str, name: &str) -> Item {
    Item {
        id: id.to_string(),
        name: name.to_string(),
        href: None,
        description: None,
        facets: HashMap::new(),
    }
}

/// Shorthand datetime constructor for tests.
pub fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .expect("valid test date")
        .and_hms_opt(h, mi, s)
        .expect("valid test time")
}
