// Criterion benchmarks for DormMatch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dormmatch::core::{haversine_distance, matching_rates, MatchEngine};
use dormmatch::models::{Dorm, QualitySignal, RankQuery, Rate, Rates, RoomType, Zone};
use chrono::Utc;

fn create_dorm(id: usize) -> Dorm {
    let zone = match id % 3 {
        0 => Zone::NorthCampus,
        1 => Zone::SouthCampus,
        _ => Zone::WestCampus,
    };
    let room_type = if id % 2 == 0 {
        RoomType::Double
    } else {
        RoomType::Single
    };
    Dorm {
        name: format!("Hall {}", id),
        zone,
        room_types: vec![room_type],
        rates: Rates::PerType(vec![Rate {
            room_type,
            amount: 3000.0 + (id % 20) as f64 * 150.0,
        }]),
        building_year: Some(1960 + (id % 60) as u16),
        coordinates: None,
        amenities: vec![],
    }
}

fn create_query() -> RankQuery {
    RankQuery {
        room_type: "Double".to_string(),
        max_budget: 4000.0,
        zone: "North Campus".to_string(),
    }
}

fn create_signal() -> QualitySignal {
    QualitySignal {
        rating: 4.3,
        review_count: 120,
        recent_reviews: vec![],
        resolved_at: Utc::now(),
    }
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(30.6280),
                black_box(-96.3344),
                black_box(30.6094),
                black_box(-96.3431),
            )
        });
    });
}

fn bench_hard_filter(c: &mut Criterion) {
    let dorm = create_dorm(0);

    c.bench_function("matching_rates", |b| {
        b.iter(|| matching_rates(black_box(&dorm), black_box("2 person")));
    });
}

fn bench_score_single_dorm(c: &mut Criterion) {
    let engine = MatchEngine::with_default_weights();
    let dorm = create_dorm(0);
    let query = create_query();
    let signal = create_signal();

    c.bench_function("score_single_dorm", |b| {
        b.iter(|| {
            engine.score(
                black_box(&dorm),
                black_box(&query),
                black_box(Some(&signal)),
                black_box(2025),
            )
        });
    });
}

fn bench_score_and_sort(c: &mut Criterion) {
    let engine = MatchEngine::with_default_weights();
    let query = create_query();
    let signal = create_signal();

    let mut group = c.benchmark_group("score_and_sort");

    for catalog_size in [15, 50, 200].iter() {
        let catalog: Vec<Dorm> = (0..*catalog_size).map(create_dorm).collect();

        group.bench_with_input(
            BenchmarkId::new("catalog", catalog_size),
            catalog_size,
            |b, _| {
                b.iter(|| {
                    let mut scored: Vec<(String, f64)> = catalog
                        .iter()
                        .filter_map(|dorm| {
                            engine
                                .score(dorm, &query, Some(&signal), 2025)
                                .map(|score| (dorm.name.clone(), score.total))
                        })
                        .collect();
                    scored.sort_by(|a, b| {
                        b.1.partial_cmp(&a.1)
                            .unwrap_or(std::cmp::Ordering::Equal)
                            .then_with(|| a.0.cmp(&b.0))
                    });
                    black_box(scored)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_hard_filter,
    bench_score_single_dorm,
    bench_score_and_sort
);

criterion_main!(benches);
