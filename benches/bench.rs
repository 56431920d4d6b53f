// Criterion benchmarks for the Amora matching engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use amora_algo::core::compatibility::{BlendWeights, CompatibilityEngine};
use amora_algo::core::distance::haversine_distance;
use amora_algo::core::traits::{score_traits, TraitWeights};
use amora_algo::core::DiscoveryEngine;
use amora_algo::models::{
    BlendMode, DealBreakerSet, DiscoveryBounds, LifestyleFacts, SubscriptionTier, TraitProfile,
    UserProfile,
};
use amora_algo::services::{CompatibilityCache, NoopInsight};

fn traits(seed: usize) -> TraitProfile {
    TraitProfile {
        openness: Some((seed % 100) as f64),
        conscientiousness: Some(((seed * 7) % 100) as f64),
        extraversion: Some(((seed * 13) % 100) as f64),
        agreeableness: Some(((seed * 31) % 100) as f64),
        neuroticism: Some(((seed * 43) % 100) as f64),
        emotional_intelligence: None,
    }
}

fn candidate(id: usize, lat: f64, lon: f64) -> UserProfile {
    UserProfile {
        user_id: format!("user-{:05}", id),
        name: format!("User {}", id),
        age: 21 + (id % 20) as u8,
        gender: if id % 2 == 0 { "female" } else { "male" }.to_string(),
        latitude: lat,
        longitude: lon,
        is_active: true,
        tier: SubscriptionTier::Free,
        traits: traits(id),
        lifestyle: LifestyleFacts::default(),
        deal_breakers: DealBreakerSet::default(),
        interests: vec![],
        values: vec![],
    }
}

fn engine() -> CompatibilityEngine {
    CompatibilityEngine::new(
        BlendWeights::default(),
        Arc::new(NoopInsight),
        Arc::new(CompatibilityCache::new(10_000, 300)),
    )
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(40.7128),
                black_box(-74.0060),
                black_box(40.72),
                black_box(-74.01),
            )
        });
    });
}

fn bench_trait_scoring(c: &mut Criterion) {
    let a = traits(17);
    let b = traits(53);
    let weights = TraitWeights::standard();

    c.bench_function("score_traits", |bench| {
        bench.iter(|| score_traits(black_box(&a), black_box(&b), black_box(&weights)));
    });
}

fn bench_pair_scoring(c: &mut Criterion) {
    let compat = engine();
    let a = candidate(1, 40.7128, -74.0060);
    let b = candidate(2, 40.72, -74.01);

    c.bench_function("score_pair_standard", |bench| {
        bench.iter(|| {
            compat
                .score_pair(black_box(&a), black_box(&b), BlendMode::Standard)
                .unwrap()
        });
    });

    c.bench_function("score_pair_detailed", |bench| {
        bench.iter(|| {
            compat
                .score_pair(black_box(&a), black_box(&b), BlendMode::Detailed)
                .unwrap()
        });
    });
}

fn bench_discovery_pipeline(c: &mut Criterion) {
    let discovery = DiscoveryEngine::new(engine());
    let seeker = candidate(0, 40.7128, -74.0060);

    let mut group = c.benchmark_group("discovery");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let pool: Vec<UserProfile> = (1..=*candidate_count)
            .map(|i| {
                let lat_offset = (i as f64 * 0.001) % 0.5;
                let lon_offset = (i as f64 * 0.001) % 0.5;
                candidate(i, 40.7128 + lat_offset, -74.0060 + lon_offset)
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("discover", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    discovery
                        .discover(
                            black_box(&seeker),
                            black_box(pool.clone()),
                            black_box(50.0),
                            &DiscoveryBounds::default(),
                            black_box(20),
                        )
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_trait_scoring,
    bench_pair_scoring,
    bench_discovery_pipeline
);

criterion_main!(benches);
