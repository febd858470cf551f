use chrono::{NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sciprep_core::catalog::initial_progress;
use sciprep_core::gateway::parse_question_batch;
use sciprep_core::model::{Difficulty, Question, SessionOutcome, Subject};
use sciprep_core::progress::apply_session;

fn make_question(i: usize) -> Question {
    Question {
        id: format!("bench-{i}"),
        text: "If a+b=5 and ab=3, find a^3+b^3.".into(),
        options: ["80".into(), "95".into(), "110".into(), "125".into()],
        correct_index: 0,
        explanation: "(a+b)^3 - 3ab(a+b) = 125 - 45 = 80".into(),
        difficulty: Difficulty::Medium,
        topic_tag: format!("tag-{}", i % 3),
    }
}

fn bench_apply_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_session");
    let progress = initial_progress(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

    let outcome = SessionOutcome {
        correct_count: 1,
        total: 3,
        failed_questions: (0..2).map(make_question).collect(),
    };
    group.bench_function("3 questions", |b| {
        b.iter(|| apply_session(black_box(&progress), black_box(&outcome), Subject::Math, at))
    });

    let large = SessionOutcome {
        correct_count: 10,
        total: 50,
        failed_questions: (0..40).map(make_question).collect(),
    };
    group.bench_function("50 questions", |b| {
        b.iter(|| apply_session(black_box(&progress), black_box(&large), Subject::Physics, at))
    });

    group.finish();
}

fn bench_parse_batch(c: &mut Criterion) {
    let item = r#"{"text": "pH of 0.01M HCl?", "options": ["1", "2", "3", "4"],
        "correctIndex": 1, "explanation": "-log(0.01) = 2", "topicTag": "pH", "difficulty": "easy"}"#;
    let small = format!("[{}]", vec![item; 3].join(","));
    let fenced = format!("```json\n[{}]\n```", vec![item; 20].join(","));

    let mut group = c.benchmark_group("parse_question_batch");
    group.bench_function("3 raw", |b| {
        b.iter(|| parse_question_batch(black_box(&small), 3))
    });
    group.bench_function("20 fenced", |b| {
        b.iter(|| parse_question_batch(black_box(&fenced), 20))
    });
    group.finish();
}

criterion_group!(benches, bench_apply_session, bench_parse_batch);
criterion_main!(benches);
