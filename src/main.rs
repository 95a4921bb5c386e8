use std::fs;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pivot::{
    facet_value_string, Collection, EngineError, FacetBrowser, FacetType, FilterValue,
    ValueOrdering,
};

mod cli;
use cli::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Query {
            input,
            filter,
            search,
        } => run_query(&input, &filter, search.as_deref()),
        Commands::Tally {
            input,
            facet,
            order,
        } => run_tally(&input, &facet, &order),
        Commands::Buckets { input, facet } => run_buckets(&input, &facet),
        Commands::Facets { input } => run_facets(&input),
        Commands::Show { input, id } => run_show(&input, &id),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn load_browser(input: &str) -> Result<FacetBrowser, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(input)?;
    let collection: Collection = serde_json::from_str(&raw)?;
    Ok(FacetBrowser::new(collection))
}

fn run_query(
    input: &str,
    filters: &[String],
    search: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut browser = load_browser(input)?;
    for spec in filters {
        let (facet, value) = split_filter_spec(spec)?;
        let facet_type = browser
            .facet(facet)
            .map(|f| f.facet_type)
            .ok_or_else(|| EngineError::UnknownFacetType {
                tag: facet.to_string(),
            })?;
        let filter_value = parse_filter_value(facet_type, value)?;
        browser.set_facet_filter(facet, vec![filter_value])?;
    }
    if let Some(term) = search {
        browser.set_search_term(term);
    }

    let qualifying = browser.qualifying_items();
    println!("{} of {} items qualify", qualifying.len(), browser.items().len());
    for item in qualifying {
        println!("{}\t{}", item.id, item.name);
    }
    Ok(())
}

fn run_tally(input: &str, facet: &str, order: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut browser = load_browser(input)?;
    let wanted = match order {
        "quantity" => ValueOrdering::ByQuantity,
        "alpha" => ValueOrdering::Alphabetical,
        "ranked" => ValueOrdering::Ranked,
        other => return Err(format!("unknown ordering \"{}\"", other).into()),
    };
    if !browser.available_orderings(facet).contains(&wanted) {
        return Err(format!("facet \"{}\" declares no ranked order", facet).into());
    }
    while browser.active_ordering(facet) != wanted {
        browser.cycle_comparator(facet);
    }
    for row in browser.facet_values(facet) {
        println!("{}\t{}", row.count, row.label);
    }
    Ok(())
}

fn run_buckets(input: &str, facet: &str) -> Result<(), Box<dyn std::error::Error>> {
    let browser = load_browser(input)?;
    let Some(histogram) = browser.temporal_histogram(facet)? else {
        println!("not currently applicable");
        return Ok(());
    };
    println!("scale code {}", histogram.scale.code());
    for bucket in &histogram.coarse {
        println!("{}\t{}", bucket.count, bucket.label.text());
    }
    if !histogram.fine.is_empty() {
        println!("--");
        for bucket in &histogram.fine {
            println!("{}\t{}", bucket.count, bucket.label.text());
        }
    }
    Ok(())
}

fn run_facets(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let browser = load_browser(input)?;
    for facet in browser.filterable_facets() {
        println!("{}\t{}", facet.facet_type, facet.name);
    }
    Ok(())
}

fn run_show(input: &str, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let browser = load_browser(input)?;
    let item = browser
        .item_by_id(id)
        .ok_or_else(|| format!("no item with id \"{}\"", id))?;
    println!("{}", item.name);
    if let Some(href) = &item.href {
        println!("{}", href);
    }
    if let Some(description) = &item.description {
        println!("{}", description);
    }
    let mut facets: Vec<_> = item
        .facets
        .keys()
        .filter_map(|name| browser.facet(name))
        .filter(|f| f.is_details_visible)
        .collect();
    facets.sort_by_key(|f| f.index);
    for facet in facets {
        let rendered: Vec<String> = item
            .values(&facet.name)
            .unwrap_or_default()
            .iter()
            .map(facet_value_string)
            .collect();
        println!("{}: {}", facet.name, rendered.join(", "));
    }
    Ok(())
}

fn split_filter_spec(spec: &str) -> Result<(&str, &str), Box<dyn std::error::Error>> {
    spec.split_once('=')
        .ok_or_else(|| format!("filter \"{}\" is not Facet=Value", spec).into())
}

/// Parse a CLI filter value by facet type: string-like facets take the
/// literal label, Number and DateTime take a `lo..hi` range with either
/// end omittable.
fn parse_filter_value(
    facet_type: FacetType,
    value: &str,
) -> Result<FilterValue, Box<dyn std::error::Error>> {
    if facet_type.is_string_like() {
        return Ok(FilterValue::Label(value.to_string()));
    }
    let (lo, hi) = value
        .split_once("..")
        .ok_or_else(|| format!("range \"{}\" is not lo..hi", value))?;
    match facet_type {
        FacetType::Number => Ok(FilterValue::NumberRange {
            lower_bound: parse_end(lo, str::parse::<f64>)?,
            upper_bound: parse_end(hi, str::parse::<f64>)?,
            inclusive: true,
        }),
        FacetType::DateTime => Ok(FilterValue::DateRange {
            lower_bound: parse_end(lo, |s| s.parse::<chrono::NaiveDateTime>())?,
            upper_bound: parse_end(hi, |s| s.parse::<chrono::NaiveDateTime>())?,
        }),
        _ => unreachable!("string-like types handled above"),
    }
}

fn parse_end<T, E, F>(end: &str, parse: F) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    E: std::error::Error + 'static,
    F: Fn(&str) -> Result<T, E>,
{
    if end.is_empty() {
        Ok(None)
    } else {
        Ok(Some(parse(end).map_err(Box::new)?))
    }
}
