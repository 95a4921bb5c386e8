//! Filter construction across facet types and the tag boundary.

use super::common::{car_collection, dt};
use pivot::{
    tally_values, EngineError, FacetBrowser, FacetType, FacetValue, FilterEngine, FilterValue,
    Item, NO_INFO,
};

fn refs(items: &[Item]) -> Vec<&Item> {
    items.iter().collect()
}

#[test]
fn tagged_construction_accepts_known_tags() {
    let collection = car_collection();
    let mut engine = FilterEngine::new();
    engine
        .set_filter_tagged(
            "Color",
            "String",
            vec![FilterValue::Label("Blue".to_string())],
        )
        .unwrap();
    assert_eq!(engine.qualifying_items(&collection.items, None).len(), 2);
}

#[test]
fn tagged_construction_rejects_unknown_tags() {
    let mut engine = FilterEngine::new();
    let err = engine
        .set_filter_tagged(
            "Color",
            "Colour",
            vec![FilterValue::Label("Blue".to_string())],
        )
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::UnknownFacetType {
            tag: "Colour".to_string()
        }
    );
    // the failed call left no filter behind
    assert!(engine.is_empty());
}

#[test]
fn link_facets_filter_by_label() {
    let collection = car_collection();
    let mut engine = FilterEngine::new();
    engine.set_filter(
        "Maker",
        FacetType::Link,
        vec![FilterValue::Label("Acme Motors".to_string())],
    );
    let ids: Vec<&str> = engine
        .qualifying_items(&collection.items, None)
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(ids, vec!["blue-car"]);
}

#[test]
fn date_range_filters_like_a_clicked_bucket() {
    let collection = car_collection();
    let mut engine = FilterEngine::new();
    // the 2020 year bucket, half-open
    engine.set_filter(
        "Listed",
        FacetType::DateTime,
        vec![FilterValue::DateRange {
            lower_bound: Some(dt(2020, 1, 1, 0, 0, 0)),
            upper_bound: Some(dt(2021, 1, 1, 0, 0, 0)),
        }],
    );
    let ids: Vec<&str> = engine
        .qualifying_items(&collection.items, None)
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(ids, vec!["bluecar-deluxe"]);
}

#[test]
fn several_ranges_under_one_facet_are_a_union() {
    let collection = car_collection();
    let mut engine = FilterEngine::new();
    engine.set_filter(
        "Listed",
        FacetType::DateTime,
        vec![
            FilterValue::DateRange {
                lower_bound: Some(dt(2019, 1, 1, 0, 0, 0)),
                upper_bound: Some(dt(2020, 1, 1, 0, 0, 0)),
            },
            FilterValue::DateRange {
                lower_bound: Some(dt(2021, 1, 1, 0, 0, 0)),
                upper_bound: Some(dt(2022, 1, 1, 0, 0, 0)),
            },
        ],
    );
    let mut ids: Vec<&str> = engine
        .qualifying_items(&collection.items, None)
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["blue-car", "red-truck"]);
}

#[test]
fn filters_on_different_facets_are_an_intersection() {
    let collection = car_collection();
    let mut engine = FilterEngine::new();
    engine.set_filter(
        "Color",
        FacetType::String,
        vec![FilterValue::Label("Blue".to_string())],
    );
    engine.set_filter(
        "Price",
        FacetType::Number,
        vec![FilterValue::NumberRange {
            lower_bound: Some(15000.0),
            upper_bound: None,
            inclusive: true,
        }],
    );
    let ids: Vec<&str> = engine
        .qualifying_items(&collection.items, None)
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(ids, vec!["bluecar-deluxe"]);
}

#[test]
fn pinpoint_filters_select_the_clicked_value() {
    let collection = car_collection();
    let mut browser = FacetBrowser::new(collection);

    // clicking "12000" in the details view re-filters to exactly it
    let filter = FilterValue::pinpoint(&FacetValue::Number(12000.0));
    browser.set_facet_filter("Price", vec![filter]).unwrap();
    let ids: Vec<&str> = browser
        .qualifying_items()
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(ids, vec!["blue-car"]);

    // clicking a date value selects its one-second window
    browser.clear_all_filters();
    let filter = FilterValue::pinpoint(&FacetValue::Date(dt(2021, 1, 15, 11, 0, 0)));
    browser.set_facet_filter("Listed", vec![filter]).unwrap();
    let ids: Vec<&str> = browser
        .qualifying_items()
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(ids, vec!["red-truck"]);
}

#[test]
fn tally_renders_numbers_and_counts_missing_items() {
    let collection = car_collection();
    let rows = tally_values(&refs(&collection.items), "Price");
    assert!(rows.iter().any(|r| r.label == "12000" && r.count == 1));
    assert!(rows.iter().any(|r| r.label == NO_INFO && r.count == 1));
    let total: usize = rows.iter().map(|r| r.count).sum();
    assert_eq!(total, collection.items.len());
}
