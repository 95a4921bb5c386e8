//! Bucket generation and counting against realistic value spreads.

use super::common::{dt, item_with, items_with, no_facets};
use pivot::{
    count_buckets, date_extent, generate_buckets, two_scale_buckets, DateScale, FacetValue, Item,
};

fn refs(items: &[Item]) -> Vec<&Item> {
    items.iter().collect()
}

#[test]
fn extent_spans_all_values_of_all_items() {
    let items = vec![
        item_with(
            "a",
            "Alpha",
            "When",
            FacetValue::Date(dt(2019, 5, 1, 0, 0, 0)),
        ),
        items_with(
            "b",
            "Beta",
            "When",
            vec![
                FacetValue::Date(dt(2018, 2, 1, 0, 0, 0)),
                FacetValue::Date(dt(2021, 9, 30, 12, 0, 0)),
            ],
        ),
        no_facets("c", "Gamma"),
    ];
    let (min, max) = date_extent(&refs(&items), "When").unwrap();
    assert_eq!(min, dt(2018, 2, 1, 0, 0, 0));
    assert_eq!(max, dt(2021, 9, 30, 12, 0, 0));
}

#[test]
fn extent_is_none_when_no_item_carries_the_facet() {
    let items = vec![no_facets("a", "Alpha"), no_facets("b", "Beta")];
    assert!(date_extent(&refs(&items), "When").is_none());
}

#[test]
fn counting_is_per_value_and_membership_per_item() {
    let items = vec![
        items_with(
            "a",
            "Alpha",
            "When",
            vec![
                FacetValue::Date(dt(2020, 1, 10, 0, 0, 0)),
                FacetValue::Date(dt(2020, 1, 20, 0, 0, 0)),
            ],
        ),
        item_with(
            "b",
            "Beta",
            "When",
            FacetValue::Date(dt(2020, 2, 5, 0, 0, 0)),
        ),
    ];
    let mut buckets = generate_buckets(
        &dt(2020, 1, 1, 0, 0, 0),
        &dt(2020, 2, 28, 0, 0, 0),
        Some(DateScale::Month),
    )
    .unwrap();
    count_buckets(&mut buckets, &refs(&items), "When");

    // both of a's values fall in January
    assert_eq!(buckets[0].count, 2);
    assert_eq!(buckets[0].items, vec!["a".to_string()]);
    assert_eq!(buckets[1].count, 1);
    assert_eq!(buckets[1].items, vec!["b".to_string()]);
}

#[test]
fn an_item_lands_in_two_buckets_only_via_two_values() {
    let items = vec![items_with(
        "a",
        "Alpha",
        "When",
        vec![
            FacetValue::Date(dt(2020, 1, 10, 0, 0, 0)),
            FacetValue::Date(dt(2020, 2, 10, 0, 0, 0)),
        ],
    )];
    let mut buckets = generate_buckets(
        &dt(2020, 1, 1, 0, 0, 0),
        &dt(2020, 2, 28, 0, 0, 0),
        Some(DateScale::Month),
    )
    .unwrap();
    count_buckets(&mut buckets, &refs(&items), "When");
    assert_eq!(buckets[0].items, vec!["a".to_string()]);
    assert_eq!(buckets[1].items, vec!["a".to_string()]);
}

#[test]
fn century_scale_labels() {
    let buckets = generate_buckets(
        &dt(1870, 1, 1, 0, 0, 0),
        &dt(2020, 1, 1, 0, 0, 0),
        Some(DateScale::Years(2)),
    )
    .unwrap();
    let labels: Vec<String> = buckets.iter().map(|b| b.label.text()).collect();
    assert_eq!(labels, vec!["1800s", "1900s", "2000s"]);
    assert_eq!(buckets[0].lower_bound, dt(1800, 1, 1, 0, 0, 0));
}

#[test]
fn two_scale_histogram_counts_agree_between_levels() {
    let items = vec![
        item_with(
            "a",
            "Alpha",
            "When",
            FacetValue::Date(dt(2019, 3, 5, 0, 0, 0)),
        ),
        item_with(
            "b",
            "Beta",
            "When",
            FacetValue::Date(dt(2020, 8, 20, 0, 0, 0)),
        ),
        item_with(
            "c",
            "Gamma",
            "When",
            FacetValue::Date(dt(2021, 12, 1, 0, 0, 0)),
        ),
    ];
    let histogram = two_scale_buckets(&refs(&items), "When").unwrap().unwrap();
    assert_eq!(histogram.scale, DateScale::Years(0));
    // every value lands exactly once per level
    let coarse_total: usize = histogram.coarse.iter().map(|b| b.count).sum();
    let fine_total: usize = histogram.fine.iter().map(|b| b.count).sum();
    assert_eq!(coarse_total, 3);
    assert_eq!(fine_total, 3);
    // the fine level is one scale down: months instead of years
    assert!(histogram.fine.len() > histogram.coarse.len());
}

#[test]
fn two_scale_histogram_at_the_floor_has_no_fine_level() {
    let items = vec![
        item_with(
            "a",
            "Alpha",
            "When",
            FacetValue::Date(dt(2020, 1, 1, 0, 0, 1)),
        ),
        item_with(
            "b",
            "Beta",
            "When",
            FacetValue::Date(dt(2020, 1, 1, 0, 0, 3)),
        ),
    ];
    let histogram = two_scale_buckets(&refs(&items), "When").unwrap().unwrap();
    assert_eq!(histogram.scale, DateScale::Second);
    assert!(histogram.fine.is_empty());
    assert!(!histogram.coarse.is_empty());
}

#[test]
fn two_scale_histogram_without_the_facet_is_not_applicable() {
    let items = vec![no_facets("a", "Alpha")];
    assert!(two_scale_buckets(&refs(&items), "When").unwrap().is_none());
}

#[test]
fn half_day_labels_carry_the_day_across_buckets() {
    let buckets = generate_buckets(
        &dt(2020, 6, 1, 3, 0, 0),
        &dt(2020, 6, 2, 20, 0, 0),
        Some(DateScale::HalfDay),
    )
    .unwrap();
    let labels: Vec<String> = buckets.iter().map(|b| b.label.text()).collect();
    assert_eq!(
        labels,
        vec![
            "6/1/2020 12:00:00 AM to 12:00:00 PM",
            "12:00:00 PM to 6/2/2020 12:00:00 AM",
            "6/2/2020 12:00:00 AM to 12:00:00 PM",
            "12:00:00 PM to 6/3/2020 12:00:00 AM",
        ]
    );
}

#[test]
fn values_outside_the_generated_range_are_not_counted() {
    let items = vec![item_with(
        "a",
        "Alpha",
        "When",
        FacetValue::Date(dt(2025, 1, 1, 0, 0, 0)),
    )];
    let mut buckets = generate_buckets(
        &dt(2020, 1, 1, 0, 0, 0),
        &dt(2020, 12, 31, 0, 0, 0),
        Some(DateScale::Month),
    )
    .unwrap();
    count_buckets(&mut buckets, &refs(&items), "When");
    assert!(buckets.iter().all(|b| b.count == 0));
}
