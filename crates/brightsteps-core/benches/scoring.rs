use criterion::{black_box, criterion_group, criterion_main, Criterion};

use brightsteps_core::model::QuestionNumber;
use brightsteps_core::questionnaire::{AnswerSet, QuestionnaireSession};
use brightsteps_core::scoring::{classify, ScoringEngine};
use brightsteps_core::RiskBands;

fn answers(mask: u32) -> AnswerSet {
    QuestionNumber::all()
        .map(|n| (n, mask & (1 << n.index()) != 0))
        .collect()
}

fn bench_score(c: &mut Criterion) {
    let engine = ScoringEngine::mchat_r();
    let mut group = c.benchmark_group("score");

    let low = answers(0b0000_0000_1000_0000_0000);
    group.bench_function("single", |b| b.iter(|| engine.score(black_box(&low))));

    group.bench_function("1024_sets", |b| {
        let sets: Vec<AnswerSet> = (0..1024u32).map(|m| answers(m * 1021)).collect();
        b.iter(|| {
            sets.iter()
                .filter_map(|s| engine.score(black_box(s)).ok())
                .map(|r| u32::from(r.total_score))
                .sum::<u32>()
        })
    });

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let bands = RiskBands::default();
    c.bench_function("classify", |b| {
        b.iter(|| {
            (0..=20u8)
                .map(|total| classify(black_box(total), black_box(total / 4), &bands))
                .max()
        })
    });
}

fn bench_session(c: &mut Criterion) {
    c.bench_function("session_fill_and_submit", |b| {
        let engine = ScoringEngine::mchat_r();
        b.iter(|| {
            let mut session = QuestionnaireSession::new();
            for n in (1..=20u8).rev() {
                let _ = session.set_answer(n, n % 3 == 0);
            }
            session.submit(black_box(&engine))
        })
    });
}

criterion_group!(benches, bench_score, bench_classify, bench_session);
criterion_main!(benches);
