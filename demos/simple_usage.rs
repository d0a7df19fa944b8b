/// Complete Glyphdex API demo.
///
/// Demonstrates the major engine operations: ingesting documents, running
/// searches with coverage scoring, filters, boosts, and facets, deleting a
/// document, and checking statistics.
use glyphdex::core::config::ConfigurationSet;
use glyphdex::core::document::{Document, DocumentFields, Field};
use glyphdex::core::types::{DocumentKey, FieldValue};
use glyphdex::filter::ast::{CompareOp, Constant, Filter};
use glyphdex::search::results::{Boost, Query};
use glyphdex::Engine;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Glyphdex Engine Demo ===\n");

    println!("Creating engine...");
    let engine = Engine::new(ConfigurationSet::default());
    println!("Done!\n");

    println!("Indexing documents...");
    let docs = vec![
        book(1, "Rust Programming", "Fiction", 2021.0, "Learn Rust programming language from scratch"),
        book(2, "Database Systems", "Technical", 2015.0, "A survey of SQL and NoSQL database internals"),
        book(3, "Web Development", "Technical", 2019.0, "Building web applications with modern frameworks"),
    ];
    engine.index_documents(docs)?;
    println!("  Indexed 3 documents\n");

    println!("Searching...");
    let result = engine.search(&Query::new("rust programming"))?;
    println!("  'rust programming': {} results", result.records.len());
    for record in &result.records {
        println!("    key={:?} score={}", record.key, record.score);
    }
    println!();

    println!("Searching with a filter (genre = Technical)...");
    let mut filtered_query = Query::new("database");
    filtered_query.filter = Some(Filter::Value { field: "genre".into(), op: CompareOp::Eq, value: Constant::String("Technical".into()) });
    let result = engine.search(&filtered_query)?;
    println!("  'database' (Technical only): {} results\n", result.records.len());

    println!("Searching with a boost for recent books...");
    let mut boosted_query = Query::new("web development");
    boosted_query.boosts.push(Boost {
        filter: Filter::Value { field: "year".into(), op: CompareOp::Gte, value: Constant::Number(2018.0) },
        strength: 10,
    });
    let result = engine.search(&boosted_query)?;
    println!("  'web development' (boosted by recency): {} results\n", result.records.len());

    println!("Searching with facets...");
    let mut facet_query = Query::new("");
    facet_query.enable_facets = true;
    let result = engine.search(&facet_query)?;
    if let Some(facets) = &result.facets {
        if let Some(genres) = facets.get("genre") {
            println!("  genre facet:");
            for (value, count) in genres {
                println!("    {}: {}", value, count);
            }
        }
    }
    println!();

    println!("Deleting document 3...");
    let removed = engine.delete_document(DocumentKey(3));
    println!("  Marked {} document(s) deleted\n", removed);

    println!("Recalculating weights after the delete...");
    engine.calculate_weights()?;
    println!("  Done\n");

    println!("Statistics:");
    let stats = engine.statistics();
    println!("  Total documents:     {}", stats.document_count);
    println!("  Deleted documents:   {}", stats.deleted_document_count);
    println!("  Vocabulary size:     {}", stats.vocabulary_size);
    println!("  Stop terms:          {}", stats.stop_term_count);
    println!("  Indexed:             {}", stats.is_indexed);

    println!("\n=== Demo Complete ===\n");
    Ok(())
}

fn book(key: i64, title: &str, genre: &str, year: f64, body: &str) -> Document {
    let mut fields = DocumentFields::new();
    fields.insert("title", Field::text(title));
    fields.insert("body", Field::text(body));
    fields.insert("genre", Field::keyword(genre));

    let mut year_field = Field::keyword("");
    year_field.value = FieldValue::Number(year);
    fields.insert("year", year_field);

    Document::new(DocumentKey(key), 0, fields)
}
