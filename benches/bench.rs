//! Criterion benchmarks for arancel.
//!
//! Covers the similarity primitives and the full search path over a
//! synthetic catalog:
//! - Levenshtein and sequence ratio
//! - Closest-match lookup over all codes
//! - Spelling correction
//! - Ranking and orchestrated search

use std::hint::black_box;
use std::sync::Arc;

use arancel::audit::NullAuditSink;
use arancel::catalog::{CatalogSnapshot, Chapter, Heading, InMemoryCatalog, Section, Subheading};
use arancel::search::{ApproximateMatcher, SearchConfig, SearchOrchestrator};
use arancel::spelling::{
    SpellingCorrector, VocabularyIndex, get_close_matches, levenshtein_distance, sequence_ratio,
};
use arancel::synonym::SynonymExpander;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};

const PRODUCTS: &[&str] = &[
    "Equinos vivos",
    "Bovinos reproductores de raza pura",
    "Pescado fresco o refrigerado",
    "Truchas",
    "Salmones del Pacífico",
    "Café sin tostar",
    "Semillas de cilantro",
    "Leche y nata sin concentrar",
    "Quesos frescos",
    "Hortalizas de vaina",
    "Arroz descascarillado",
    "Maíz para siembra",
    "Azúcar de caña en bruto",
    "Cerveza de malta",
    "Calzado con suela de caucho",
];

/// Generate a catalog with `chapters` chapters of ten headings, each with
/// ten subheadings.
fn generate_catalog(chapters: u32) -> InMemoryCatalog {
    let mut snapshot = CatalogSnapshot {
        sections: vec![Section {
            id: 1,
            name: "Productos de prueba".to_string(),
            description: None,
        }],
        ..Default::default()
    };

    for c in 1..=chapters {
        snapshot.chapters.push(Chapter {
            id: c,
            section_id: 1,
            code: format!("{c:02}"),
            name: format!("Capítulo {c}"),
            description: None,
        });
        for h in 1..=10 {
            let heading_id = c * 100 + h;
            let product = PRODUCTS[(heading_id as usize) % PRODUCTS.len()];
            snapshot.headings.push(Heading {
                id: heading_id,
                chapter_id: c,
                code: format!("{c:02}.{h:02}"),
                description: product.to_string(),
            });
            for s in 1..=10 {
                let mut sub = Subheading::new(
                    heading_id * 100 + s,
                    heading_id,
                    &format!("{c:02}{h:02}.{s:02}.00.00"),
                    &format!("{product}, variedad {s}"),
                );
                sub.ga = Some(f64::from(s % 4) * 5.0);
                snapshot.subheadings.push(sub);
            }
        }
    }

    InMemoryCatalog::from_snapshot(snapshot).unwrap()
}

fn orchestrator(catalog: Arc<InMemoryCatalog>) -> SearchOrchestrator {
    let matcher = ApproximateMatcher::new(
        catalog.clone(),
        SynonymExpander::spanish(),
        SearchConfig::default(),
    );
    SearchOrchestrator::new(
        catalog,
        matcher,
        SpellingCorrector::new(),
        Arc::new(NullAuditSink),
    )
}

fn bench_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");

    group.bench_function("levenshtein_code", |b| {
        b.iter(|| levenshtein_distance(black_box("0101.21.00.00"), black_box("0101.29.00.00")))
    });

    group.bench_function("sequence_ratio_text", |b| {
        b.iter(|| {
            sequence_ratio(
                black_box("pescado fresko"),
                black_box("pescado fresco o refrigerado, excepto los filetes"),
            )
        })
    });

    let catalog = generate_catalog(50);
    let codes: Vec<String> = catalog
        .snapshot()
        .subheadings
        .iter()
        .map(|s| s.code.clone())
        .collect();
    group.throughput(Throughput::Elements(codes.len() as u64));
    group.bench_function("close_matches_5000_codes", |b| {
        b.iter(|| {
            get_close_matches(
                black_box("0101.22"),
                codes.iter().map(String::as_str),
                8,
                0.3,
            )
        })
    });

    group.finish();
}

fn bench_correction(c: &mut Criterion) {
    let catalog = generate_catalog(20);
    let vocabulary = VocabularyIndex::build(&catalog).unwrap();
    let corrector = SpellingCorrector::new();

    c.bench_function("correct_query", |b| {
        b.iter(|| corrector.correct_with(black_box("pescaddo frezco"), &vocabulary))
    });
}

fn bench_search(c: &mut Criterion) {
    let catalog = Arc::new(generate_catalog(20));
    let orchestrator = orchestrator(catalog);

    let mut group = c.benchmark_group("search");
    for query in ["0105.03.00.00", "truchas", "caballo", "pescaddo", "999999"] {
        group.bench_function(query, |b| {
            b.iter(|| orchestrator.search("bench", black_box(query)).unwrap())
        });
    }
    group.bench_function("rank_vivos", |b| {
        b.iter(|| orchestrator.complete(black_box("vivos")).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_similarity, bench_correction, bench_search);
criterion_main!(benches);
