use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use gym_portal::models::{Entry, Leaderboard};
use std::hint::black_box;

fn entry(i: usize) -> Entry {
    // Spread times so inserts land all over the board.
    let time = (i * 7919) % 1800 + 120;
    Entry {
        id: i.to_string(),
        user_id: format!("u{}", i),
        user_name: format!("Member {}", i),
        time: time.to_string(),
        weight: String::new(),
    }
}

fn board(size: usize) -> Leaderboard {
    let mut board = Leaderboard::default();
    for i in 0..size {
        board.add_entry(entry(i));
    }
    board
}

fn benchmark_add_entry(c: &mut Criterion) {
    let mut group = c.benchmark_group("leaderboard_add_entry");

    for size in [10, 100, 1000] {
        let base = board(size);
        group.bench_function(format!("board_of_{}", size), |b| {
            b.iter_batched(
                || base.clone(),
                |mut board| {
                    board.add_entry(black_box(entry(size + 1)));
                    board
                },
                BatchSize::SmallInput,
            )
        });
    }

    // Legacy boards can hold non-numeric times, which sort last.
    let mut mixed = board(100);
    for i in 0..10 {
        let mut dnf = entry(1000 + i);
        dnf.time = "DNF".to_string();
        mixed.add_entry(dnf);
    }
    group.bench_function("mixed_times_100", |b| {
        b.iter_batched(
            || mixed.clone(),
            |mut board| {
                board.add_entry(black_box(entry(5000)));
                board
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn benchmark_ranked(c: &mut Criterion) {
    let board = board(500);
    c.bench_function("leaderboard_ranked_500", |b| {
        b.iter(|| black_box(&board).ranked())
    });
}

criterion_group!(benches, benchmark_add_entry, benchmark_ranked);
criterion_main!(benches);
