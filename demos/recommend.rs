//! Recommend films to a small user pool with all three strategies and score
//! each against held-out ratings.
//!
//! Run with `RUST_LOG=recluster=debug` to see the clustering passes.

use recluster::{
    mean_ndcg, Catalog, CategorySet, Item, KMeans, RatingTable, Recommender, Strategy, User,
};
use tracing_subscriber::EnvFilter;

const GENRES: usize = 4; // drama, comedy, action, documentary

fn film(id: &str, runtime: i64, year: i32, color: bool, genres: &[usize]) -> Item {
    Item::new(id)
        .with_ints(vec![runtime])
        .with_years(vec![year])
        .with_booleans([color.to_string()])
        .with_categories(vec![CategorySet::from_members(GENRES, genres.iter().copied())])
}

fn main() -> recluster::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let catalog = Catalog::new(vec![
        film("casablanca", 102, 1942, false, &[0]),
        film("brief-encounter", 86, 1945, false, &[0]),
        film("some-like-it-hot", 121, 1959, false, &[1]),
        film("the-apartment", 125, 1960, false, &[0, 1]),
        film("die-hard", 132, 1988, true, &[2]),
        film("speed", 116, 1994, true, &[2]),
        film("heat", 170, 1995, true, &[0, 2]),
        film("groundhog-day", 101, 1993, true, &[1]),
        film("hoop-dreams", 170, 1994, true, &[3]),
        film("man-on-wire", 94, 2008, true, &[3]),
    ])?;

    let pool = vec![
        User::with_ratings(1, [("casablanca", 5.0), ("brief-encounter", 5.0), ("the-apartment", 4.0), ("die-hard", 1.0)]),
        User::with_ratings(2, [("casablanca", 4.0), ("some-like-it-hot", 5.0), ("the-apartment", 5.0), ("speed", 2.0)]),
        User::with_ratings(3, [("brief-encounter", 4.0), ("the-apartment", 5.0), ("groundhog-day", 4.0)]),
        User::with_ratings(4, [("die-hard", 5.0), ("speed", 4.0), ("heat", 5.0), ("casablanca", 2.0)]),
        User::with_ratings(5, [("die-hard", 4.0), ("heat", 4.0), ("groundhog-day", 3.0), ("hoop-dreams", 2.0)]),
        User::with_ratings(6, [("speed", 5.0), ("heat", 5.0), ("man-on-wire", 2.0)]),
        User::with_ratings(7, [("hoop-dreams", 5.0), ("man-on-wire", 5.0), ("heat", 3.0)]),
        User::with_ratings(8, [("hoop-dreams", 4.0), ("man-on-wire", 4.0), ("brief-encounter", 3.0)]),
    ];
    let table = RatingTable::from_users(&pool).with_max_rating(5.0);

    // What each target revealed, and what they later rated.
    let targets = [
        (
            User::with_ratings(100, [("casablanca", 5.0), ("some-like-it-hot", 4.0)]),
            User::with_ratings(100, [("brief-encounter", 5.0), ("the-apartment", 4.0), ("speed", 1.0)]),
        ),
        (
            User::with_ratings(101, [("die-hard", 5.0), ("speed", 5.0)]),
            User::with_ratings(101, [("heat", 5.0), ("groundhog-day", 3.0), ("casablanca", 1.0)]),
        ),
    ];

    let recommender = Recommender::new(&catalog, &table, pool)
        .with_top_k(3)
        .with_clustering(KMeans::new(3).with_seed(42));

    for strategy in [Strategy::Collaborative, Strategy::ContentBased, Strategy::Hybrid] {
        println!("=== {strategy:?} ===");
        let mut scored = Vec::new();
        for (known, held_out) in &targets {
            let predictions = recommender.recommend(known, strategy)?;
            println!("  user {}:", known.id());
            for (item, score) in predictions.ranked() {
                println!("    {item:<18} {score:.2}");
            }
            scored.push((held_out, predictions.into_user(known.id())));
        }
        match mean_ndcg(scored.iter().map(|(reference, predicted)| (*reference, predicted))) {
            Ok(ndcg) => println!("  mean NDCG: {ndcg:.3}\n"),
            Err(e) => println!("  mean NDCG: {e}\n"),
        }
    }

    Ok(())
}
