//! Basic Pleiades search
//!
//! This example demonstrates the fundamental search operations:
//! - Creating a search interface backed by the default HTTP client
//! - Title, full-text and boolean searches
//! - Working with hit records

use pleiades_search::{Operator, Query, SearchConfig, SearchInterface, SearchResults};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pleiades_search::init_logging(tracing::Level::INFO)?;

    let config = SearchConfig::builder()
        .user_agent("pleiades-search-example/0.1 (+https://github.com/isawnyu/pleiades_search_api)")
        .build();
    let search = SearchInterface::with_default_web(config)?;

    println!("Searching for title 'Zucchabar':");
    let mut query = Query::new();
    query.set_parameter("title", "Zucchabar", None)?;
    print_results(&search.search(&query)?, 3);

    println!("\nSearching text for 'Zucchabar' OR 'Luxmanda':");
    query.clear_parameters();
    query.set_parameter("text", ["Zucchabar", "Luxmanda"], Some(Operator::Or))?;
    print_results(&search.search(&query)?, 3);

    println!("\nSearching descriptions for 'contested' AND 'conflict':");
    query.clear_parameters();
    query.set_parameter("description", ["contested", "conflict"], Some(Operator::And))?;
    print_results(&search.search(&query)?, 3);

    Ok(())
}

fn print_results(results: &SearchResults, limit: usize) {
    println!("  {}", results.query);
    for (i, hit) in results.hits.iter().take(limit).enumerate() {
        println!("  {}. {} ({}) - {}", i + 1, hit.title, hit.id, hit.uri);
    }

    if results.hits.len() > limit {
        println!("  ... and {} more results", results.hits.len() - limit);
    }
}
