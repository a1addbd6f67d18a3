use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;
use recluster::{Catalog, CategorySet, ContentBased, Item, KMeans, KSelection, RatingTable, User};

fn synthetic_users(rng: &mut StdRng, n: usize, items: usize) -> Vec<User> {
    (0..n as u32)
        .map(|id| {
            let ratings = (0..items)
                .filter(|_| rng.random_bool(0.2))
                .map(|i| (format!("item-{i}"), f64::from(rng.random_range(1u8..=5))))
                .collect::<Vec<_>>();
            User::with_ratings(id, ratings)
        })
        .collect()
}

fn synthetic_catalog(rng: &mut StdRng, items: usize) -> Catalog {
    let items = (0..items).map(|i| {
        Item::new(format!("item-{i}"))
            .with_ints(vec![rng.random_range(0..200)])
            .with_reals(vec![rng.random::<f64>() * 10.0])
            .with_years(vec![rng.random_range(1950..2020)])
            .with_booleans([rng.random_bool(0.5).to_string()])
            .with_categories(vec![CategorySet::from_members(
                20,
                (0..20).filter(|_| rng.random_bool(0.15)),
            )])
    });
    // Generated items all carry the same attribute arity.
    Catalog::new(items.collect::<Vec<_>>()).unwrap()
}

fn bench_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("clustering");

    let mut rng = StdRng::seed_from_u64(42);
    let users = synthetic_users(&mut rng, 500, 100);

    group.bench_function("kmeans_n500_items100_k8", |b| {
        b.iter(|| {
            let mut pool = users.clone();
            KMeans::new(8).with_max_iter(20).with_seed(42).fit(black_box(&mut pool)).unwrap();
        })
    });

    group.sample_size(10);
    group.bench_function("select_k_n500_items100", |b| {
        b.iter(|| {
            let mut pool = users.clone();
            KSelection::new().with_max_iter(20).with_seed(42).fit(black_box(&mut pool)).unwrap();
        })
    });

    group.finish();
}

fn bench_content(c: &mut Criterion) {
    let mut group = c.benchmark_group("content");

    let mut rng = StdRng::seed_from_u64(7);
    let catalog = synthetic_catalog(&mut rng, 1000);
    let users = synthetic_users(&mut rng, 200, 1000);
    let table = RatingTable::from_users(&users).with_max_rating(5.0);
    let target = &users[0];

    group.bench_function("predict_items1000_top10", |b| {
        let predictor = ContentBased::new(&catalog, &table, 10);
        b.iter(|| predictor.predict(black_box(target)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_clustering, bench_content);
criterion_main!(benches);
