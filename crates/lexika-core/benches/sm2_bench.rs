//! Lexika Scheduling Benchmarks
//!
//! Benchmarks for the pure scheduling paths using Criterion.
//! Run with: cargo bench -p lexika-core

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lexika_core::session::{select_study_block, StudyCandidate};
use lexika_core::sm2::{compute_next, Sm2Scheduler};
use lexika_core::vocab::{FrequencyRank, Quality, WordId};

fn bench_compute_next(c: &mut Criterion) {
    let qualities: Vec<Quality> = (0..=5).map(|q| Quality::new(q).unwrap()).collect();

    c.bench_function("compute_next_all_qualities", |b| {
        b.iter(|| {
            for q in &qualities {
                black_box(compute_next(3, 2.5, 15, *q));
            }
        })
    });
}

fn bench_long_review_sequence(c: &mut Criterion) {
    // 100 reviews of one word: mostly passes with periodic lapses
    let qualities: Vec<Quality> = (0..100)
        .map(|i| Quality::new(if i % 9 == 0 { 2 } else { 4 }).unwrap())
        .collect();

    c.bench_function("review_sequence_100", |b| {
        b.iter(|| {
            let mut reps = 0u32;
            let mut ease = 2.5f64;
            let mut interval = 0u32;
            for q in &qualities {
                let next = compute_next(reps, ease, interval, *q);
                reps = next.repetitions;
                ease = next.ease_factor;
                interval = next.interval_days;
            }
            black_box((reps, ease, interval))
        })
    });
}

fn bench_preview(c: &mut Criterion) {
    let scheduler = Sm2Scheduler;
    let state = scheduler.new_state();

    c.bench_function("preview_all_outcomes", |b| {
        b.iter(|| {
            black_box(scheduler.preview(&state));
        })
    });
}

fn bench_select_study_block(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    // 5000 candidates: a spread of overdue reviews plus unseen words
    let candidates: Vec<StudyCandidate> = (1..=5000i64)
        .map(|i| StudyCandidate {
            word_id: WordId::new(i).unwrap(),
            frequency_rank: FrequencyRank::new((i % 3000 + 1) as u32).unwrap(),
            due_date: if i % 4 == 0 {
                None
            } else {
                today.checked_sub_days(chrono::Days::new((i % 30) as u64))
            },
        })
        .collect();

    c.bench_function("select_block_5000_candidates", |b| {
        b.iter(|| {
            black_box(select_study_block(&candidates, today, 20).unwrap());
        })
    });
}

criterion_group!(
    benches,
    bench_compute_next,
    bench_long_review_sequence,
    bench_preview,
    bench_select_study_block,
);
criterion_main!(benches);
