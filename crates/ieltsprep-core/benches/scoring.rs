use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ieltsprep_core::content::fallback_exam;
use ieltsprep_core::scoring::{correct_count, overall_band, reading_band, word_count};

fn bench_bands(c: &mut Criterion) {
    let mut group = c.benchmark_group("bands");

    group.bench_function("reading_band_all", |b| {
        b.iter(|| {
            (0..=13)
                .map(|n| reading_band(black_box(n)))
                .sum::<f64>()
        })
    });

    group.bench_function("overall_band", |b| {
        b.iter(|| overall_band(black_box(7.0), black_box(Some(6.5))))
    });

    group.finish();
}

fn bench_correct_count(c: &mut Criterion) {
    let exam = fallback_exam();
    let perfect: BTreeMap<u32, String> = exam
        .questions
        .iter()
        .map(|q| (q.id, format!("  {}  ", q.correct_answer.to_uppercase())))
        .collect();
    let empty = BTreeMap::new();

    let mut group = c.benchmark_group("correct_count");
    group.bench_function("all_correct", |b| {
        b.iter(|| correct_count(black_box(&exam), black_box(&perfect)))
    });
    group.bench_function("unanswered", |b| {
        b.iter(|| correct_count(black_box(&exam), black_box(&empty)))
    });
    group.finish();
}

fn bench_word_count(c: &mut Criterion) {
    let essay = "Universities should prepare graduates for work. ".repeat(60);
    c.bench_function("word_count_essay", |b| {
        b.iter(|| word_count(black_box(&essay)))
    });
}

criterion_group!(benches, bench_bands, bench_correct_count, bench_word_count);
criterion_main!(benches);
