use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use solarsite::engine::Engine;
use solarsite::geo::{haversine_km, BoundingBox, Coordinate};
use solarsite::persist::{PersistenceMode, SqliteStore};
use solarsite::query::Query;
use solarsite::record::{Direction, Field, NewRecord, Sort};
use solarsite::settings::Limits;

// a grid of parcels around Miami, roughly 1 km apart
fn seeded(side: usize) -> SqliteStore {
    let store = SqliteStore::open(PersistenceMode::InMemory).unwrap();
    for i in 0..side {
        for j in 0..side {
            let lat = 25.0 + i as f64 * 0.009;
            let lon = -80.0 - j as f64 * 0.01;
            let record = NewRecord::new(format!("{i}-{j} Grid Rd"), lat, lon)
                .with(Field::SolarScore, ((i * 31 + j * 17) % 100) as f64)
                .with(Field::Slope, ((i + j) % 12) as f64);
            store.insert(&record).unwrap();
        }
    }
    store
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("haversine", |b| {
        b.iter(|| haversine_km(black_box(25.76), black_box(-80.19), black_box(29.65), black_box(-82.32)))
    });
    c.bench_function("bounding box", |b| {
        b.iter(|| BoundingBox::around(black_box(Coordinate::new(25.76, -80.19)), black_box(12.0)))
    });

    let store = seeded(100);
    let limits = Limits::default();
    let engine = Engine::new(&store, &limits);
    let filtered = Query::new()
        .with_text("Grid")
        .with_sort(Sort::new(Field::SolarScore, Direction::Desc))
        .with_limit(50);
    c.bench_function("list 10k filtered", |b| b.iter(|| engine.list(black_box(&filtered)).unwrap()));
    let ring = Query::new().with_origin(25.2, -80.3).with_radius(10.0);
    c.bench_function("list 10k radius", |b| b.iter(|| engine.list(black_box(&ring)).unwrap()));
    c.bench_function("nearest 10k", |b| b.iter(|| engine.nearest(black_box(&ring)).unwrap()));
    c.bench_function("radius 10k", |b| b.iter(|| engine.radius(black_box(&ring)).unwrap()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
