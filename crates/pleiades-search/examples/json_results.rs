//! Search results as JSON
//!
//! Run with `cargo run --example json_results --features serde -- <title>`.

use pleiades_search::{Query, SearchConfig, SearchInterface};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let title = std::env::args().nth(1).unwrap_or_else(|| "Zucchabar".to_string());

    let search = SearchInterface::with_default_web(SearchConfig::default())?;
    let mut query = Query::new();
    query.set_parameter("title", title.as_str(), None)?;

    let results = search.search(&query)?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
