use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glyphdex::core::config::ConfigurationSet;
use glyphdex::core::document::{Document, DocumentFields, Field};
use glyphdex::core::types::{DocumentKey, FieldValue};
use glyphdex::filter::ast::{CompareOp, Constant, Filter};
use glyphdex::search::results::{Boost, Query};
use glyphdex::Engine;
use rand::Rng;
use std::time::{Duration, Instant};

fn test_document(id: i64, content_size: usize) -> Document {
    let mut rng = rand::thread_rng();
    let words = ["the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog"];
    let content: String = (0..content_size).map(|_| words[rng.gen_range(0..words.len())]).collect::<Vec<_>>().join(" ");

    let mut fields = DocumentFields::new();
    fields.insert("title", Field::text(format!("Document {}", id)));
    fields.insert("content", Field::text(content));
    fields.insert("category", Field::keyword(format!("category_{}", id % 10)));

    let mut score_field = Field::keyword("");
    score_field.value = FieldValue::Number(rng.gen_range(0.0..100.0));
    fields.insert("score", score_field);

    Document::new(DocumentKey(id), 0, fields)
}

fn bench_single_document_add(c: &mut Criterion) {
    let engine = Engine::new(ConfigurationSet::default());

    c.bench_function("single_document_add", |b| {
        let mut id = 0i64;
        b.iter(|| {
            let doc = test_document(id, 100);
            engine.index_document(doc).unwrap();
            id += 1;
        });
    });
}

fn bench_batch_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_index");

    for batch_size in [10, 50, 100, 500, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(batch_size), batch_size, |b, &batch_size| {
            let engine = Engine::new(ConfigurationSet::default());
            let mut id_counter = 0i64;

            b.iter(|| {
                let docs: Vec<Document> = (0..batch_size)
                    .map(|_| {
                        let doc = test_document(id_counter, 100);
                        id_counter += 1;
                        doc
                    })
                    .collect();
                engine.index_documents(docs).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let engine = Engine::new(ConfigurationSet::default());
    let docs: Vec<Document> = (0..1000).map(|i| test_document(i, 100)).collect();
    engine.index_documents(docs).unwrap();

    let mut group = c.benchmark_group("search");

    group.bench_function("single_term", |b| {
        b.iter(|| {
            let _ = engine.search(black_box(&Query::new("fox"))).unwrap();
        });
    });

    group.bench_function("multi_term_coverage", |b| {
        b.iter(|| {
            let _ = engine.search(black_box(&Query::new("quick brown fox jumps"))).unwrap();
        });
    });

    group.bench_function("filtered", |b| {
        let mut query = Query::new("fox");
        query.filter = Some(Filter::Value { field: "category".into(), op: CompareOp::Eq, value: Constant::String("category_5".into()) });
        b.iter(|| {
            let _ = engine.search(black_box(&query)).unwrap();
        });
    });

    group.bench_function("boosted", |b| {
        let mut query = Query::new("fox dog");
        query.boosts.push(Boost {
            filter: Filter::Value { field: "score".into(), op: CompareOp::Gte, value: Constant::Number(50.0) },
            strength: 20,
        });
        b.iter(|| {
            let _ = engine.search(black_box(&query)).unwrap();
        });
    });

    group.bench_function("faceted_empty_query", |b| {
        let mut query = Query::new("");
        query.enable_facets = true;
        b.iter(|| {
            let _ = engine.search(black_box(&query)).unwrap();
        });
    });

    group.bench_function("fuzzy_typo", |b| {
        b.iter(|| {
            let _ = engine.search(black_box(&Query::new("quik"))).unwrap();
        });
    });

    group.finish();
}

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("index_throughput", |b| {
        b.iter_custom(|iters| {
            let engine = Engine::new(ConfigurationSet::default());
            let mut id = 0i64;

            let start = Instant::now();
            for _ in 0..iters {
                let docs: Vec<Document> = (0..100)
                    .map(|_| {
                        let doc = test_document(id, 100);
                        id += 1;
                        doc
                    })
                    .collect();
                engine.index_documents(docs).unwrap();
            }
            start.elapsed()
        });
    });

    group.bench_function("query_throughput", |b| {
        let engine = Engine::new(ConfigurationSet::default());
        let docs: Vec<Document> = (0..5000).map(|i| test_document(i, 50)).collect();
        engine.index_documents(docs).unwrap();

        let queries = vec![Query::new("fox"), Query::new("quick brown"), Query::new("lazy dog"), Query::new("jumps over")];
        let mut query_idx = 0;

        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                for _ in 0..100 {
                    let _ = engine.search(&queries[query_idx % queries.len()]).unwrap();
                    query_idx += 1;
                }
            }
            start.elapsed()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single_document_add, bench_batch_index, bench_search, bench_throughput);
criterion_main!(benches);
