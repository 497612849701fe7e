use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ieltsprep_core::content::fallback_exam;
use ieltsprep_core::grading::{parse_assessment, strip_code_fences};
use ieltsprep_core::model::ExamContent;

fn bench_assessment(c: &mut Criterion) {
    let mut group = c.benchmark_group("assessment");

    let plain = r#"{"score": 6.5, "feedback": "Clear position, limited range of vocabulary."}"#;
    let fenced = format!("```json\n{plain}\n```");
    let long_feedback = format!(
        r#"```json
{{"score": 7.0, "feedback": "{}"}}
```"#,
        "Good cohesion overall. ".repeat(100)
    );

    group.bench_function("plain", |b| {
        b.iter(|| parse_assessment(black_box(plain)))
    });

    group.bench_function("fenced", |b| {
        b.iter(|| parse_assessment(black_box(&fenced)))
    });

    group.bench_function("long_feedback", |b| {
        b.iter(|| parse_assessment(black_box(&long_feedback)))
    });

    group.bench_function("strip_fences", |b| {
        b.iter(|| strip_code_fences(black_box(&fenced)))
    });

    group.finish();
}

fn bench_exam_content(c: &mut Criterion) {
    let json = serde_json::to_string(&fallback_exam()).unwrap_or_default();

    c.bench_function("exam_content_decode", |b| {
        b.iter(|| serde_json::from_str::<ExamContent>(black_box(&json)))
    });
}

criterion_group!(benches, bench_assessment, bench_exam_content);
criterion_main!(benches);
