//! Search matching over names and facet text, and the word wheel flow.

use super::common::car_collection;
use pivot::{match_range, FacetBrowser, SearchQuery, SearchState};

#[test]
fn search_covers_searchable_facet_labels() {
    let mut browser = FacetBrowser::new(car_collection());
    // "acme" appears only in the Maker link label
    browser.set_search_term("acme");
    let ids: Vec<&str> = browser
        .qualifying_items()
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(ids, vec!["blue-car"]);
}

#[test]
fn number_facets_are_not_searched_by_default() {
    let collection = car_collection();
    let mut browser = FacetBrowser::new(collection);
    // "12000" renders in the Price facet, but Number facets default to
    // search-invisible
    browser.set_search_term("12000");
    assert!(browser.qualifying_items().is_empty());
}

#[test]
fn multi_term_queries_require_every_term() {
    let query = SearchQuery::parse("blue deluxe").unwrap();
    let collection = car_collection();
    let matching: Vec<&str> = collection
        .items
        .iter()
        .filter(|i| query.matches(i, &[]))
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(matching, vec!["bluecar-deluxe"]);
}

#[test]
fn match_range_bolds_the_matched_slice() {
    let (start, end) = match_range("Bluecar Deluxe", "deluxe").unwrap();
    assert_eq!(&"bluecar deluxe"[start..end], "deluxe");
}

#[test]
fn typing_then_committing_a_suggestion_searches_for_it() {
    let mut state = SearchState::new();
    state.set_suggestions("blu", vec!["blue car".to_string(), "bluecar".to_string()]);
    state.move_cursor(1);
    state.move_cursor(1);
    assert_eq!(state.current_text(), Some("bluecar"));
    state.commit_cursor();
    assert_eq!(state.term(), Some("bluecar"));
}

#[test]
fn clearing_the_term_resets_the_word_wheel() {
    let mut state = SearchState::new();
    state.set_term("blue");
    state.set_suggestions("blue", vec!["blue car".to_string()]);
    state.move_cursor(1);
    state.clear_term();
    assert_eq!(state.term(), None);
    assert_eq!(state.cursor(), -1);
    assert!(state.suggestions().is_empty());
}

#[test]
fn whole_browser_search_is_case_insensitive() {
    let mut browser = FacetBrowser::new(car_collection());
    browser.set_search_term("BLUE");
    assert_eq!(browser.qualifying_items().len(), 2);
}
