//! Places inside a bounding box
//!
//! Shows the typed field API and what the compiled query looks like before
//! it is sent.

use pleiades_search::{BoundingBox, Field, Operator, Query, SearchConfig, SearchInterface};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pleiades_search::init_logging(tracing::Level::WARN)?;

    let mut query = Query::new();
    // West, south, east, north around modern Miliana
    query.set(Field::Bbox, BoundingBox::new(2.0, 36.0, 2.5, 36.5)?, None)?;
    query.set(Field::FeatureType, ["settlement", "fort"], Some(Operator::Or))?;

    println!("Wire parameters:");
    for (key, value) in query.parameters_for_web()?.iter() {
        println!("  {key} = {value:?}");
    }

    let search = SearchInterface::with_default_web(SearchConfig::default())?;
    println!("\nRequest URI: {}", search.search_uri(&query)?);

    let results = search.search(&query)?;
    println!("Found {} places", results.len());
    for hit in &results.hits {
        println!("  {} {}", hit.id, hit.title);
    }

    Ok(())
}
