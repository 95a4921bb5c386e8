//! Shared test utilities and fixtures.

#![allow(dead_code)]

use pivot::{Collection, Facet, FacetType, FacetValue};

// Re-export canonical test utilities from pivot::testing
pub use pivot::testing::{dt, item_with, items_with, no_facets};

/// A small car collection exercising every facet type:
/// Color (String), Maker (Link), Price (Number), Listed (DateTime).
pub fn car_collection() -> Collection {
    Collection {
        facets: vec![
            Facet::new("Color", FacetType::String).with_index(0),
            Facet::new("Maker", FacetType::Link).with_index(1),
            Facet::new("Price", FacetType::Number).with_index(2),
            Facet::new("Listed", FacetType::DateTime).with_index(3),
        ],
        items: vec![
            {
                let mut item = item_with(
                    "blue-car",
                    "Blue Car",
                    "Color",
                    FacetValue::Text("Blue".to_string()),
                );
                item.facets.insert(
                    "Maker".to_string(),
                    vec![FacetValue::Link {
                        label: "Acme Motors".to_string(),
                        href: "https://acme.example".to_string(),
                    }],
                );
                item.facets
                    .insert("Price".to_string(), vec![FacetValue::Number(12000.0)]);
                item.facets.insert(
                    "Listed".to_string(),
                    vec![FacetValue::Date(dt(2019, 4, 10, 9, 0, 0))],
                );
                item
            },
            {
                let mut item = item_with(
                    "bluecar-deluxe",
                    "Bluecar Deluxe",
                    "Color",
                    FacetValue::Text("Blue".to_string()),
                );
                item.facets
                    .insert("Price".to_string(), vec![FacetValue::Number(18500.0)]);
                item.facets.insert(
                    "Listed".to_string(),
                    vec![FacetValue::Date(dt(2020, 7, 2, 14, 30, 0))],
                );
                item
            },
            {
                let mut item = item_with(
                    "red-truck",
                    "Red Truck",
                    "Color",
                    FacetValue::Text("Red".to_string()),
                );
                item.facets.insert(
                    "Maker".to_string(),
                    vec![FacetValue::Link {
                        label: "Bolt Works".to_string(),
                        href: "https://bolt.example".to_string(),
                    }],
                );
                item.facets
                    .insert("Price".to_string(), vec![FacetValue::Number(22000.0)]);
                item.facets.insert(
                    "Listed".to_string(),
                    vec![FacetValue::Date(dt(2021, 1, 15, 11, 0, 0))],
                );
                item
            },
            // no Color, no Price: exercises the "(no info)" paths
            no_facets("mystery", "Mystery Vehicle"),
        ],
    }
}
