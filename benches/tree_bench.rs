//! Benchmarks for tree construction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use dice_tree::games::dice::{build_game_with_config, BetLattice, DiceAction, DiceGame};
use dice_tree::tree::{BuildConfig, InformationSetTagger, LazyTree};

fn build_benchmark(c: &mut Criterion) {
    for die_size in [2u8, 3] {
        let config = BuildConfig::default().with_die_size(die_size);
        c.bench_function(&format!("build_d{}", die_size), |b| {
            b.iter(|| build_game_with_config(black_box(&config)))
        });
    }

    let parallel = BuildConfig::default().with_die_size(3).with_parallel(true);
    c.bench_function("build_d3_parallel", |b| {
        b.iter(|| build_game_with_config(black_box(&parallel)))
    });
}

fn tagging_benchmark(c: &mut Criterion) {
    let game = DiceGame::new(3).unwrap();
    let tree = build_game_with_config(&BuildConfig::default().with_die_size(3)).unwrap();

    c.bench_function("tag_info_sets_d3", |b| {
        b.iter(|| InformationSetTagger::new(&game).tag(black_box(&tree)))
    });
}

fn lattice_benchmark(c: &mut Criterion) {
    let lattice = BetLattice::new(6).unwrap();
    let prior = DiceAction::raise(3, 4);

    c.bench_function("legal_successors_d6", |b| {
        b.iter(|| lattice.legal_successors(black_box(&prior)))
    });
}

fn playout_benchmark(c: &mut Criterion) {
    let lazy = LazyTree::new(DiceGame::new(6).unwrap());
    let mut rng = StdRng::seed_from_u64(42);

    c.bench_function("lazy_playout_d6", |b| {
        b.iter(|| lazy.playout(&mut rng))
    });
}

criterion_group!(
    benches,
    build_benchmark,
    tagging_benchmark,
    lattice_benchmark,
    playout_benchmark
);
criterion_main!(benches);
