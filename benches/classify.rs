//! Performance benchmarks for a3s-sid
//!
//! Run with: cargo bench

use a3s_sid::{AccountDirectory, ClassificationRun, SidClassifier, TokenSid};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_classify(c: &mut Criterion) {
    let classifier = SidClassifier::well_known();
    let directory: AccountDirectory = vec![(1001u32, "alice")].into_iter().collect();

    c.bench_function("classify exact", |b| {
        b.iter(|| classifier.classify(black_box("S-1-5-18"), Some(18), &directory));
    });

    c.bench_function("classify pattern (last entry)", |b| {
        b.iter(|| classifier.classify(black_box("S-1-5-21-4-5-6-553"), Some(553), &directory));
    });

    c.bench_function("classify account fallback", |b| {
        b.iter(|| {
            classifier.classify(black_box("S-1-5-21-111-222-1001"), Some(1001), &directory)
        });
    });
}

fn bench_run(c: &mut Criterion) {
    let directory: AccountDirectory = (1000..1100u32).map(|rid| (rid, format!("user{}", rid))).collect();
    let run = ClassificationRun::new(SidClassifier::well_known(), directory);

    let owners: Vec<(u32, Vec<TokenSid>)> = (0..200u32)
        .map(|pid| {
            (
                pid,
                vec![
                    TokenSid::new(format!("S-1-5-21-1-2-3-{}", 1000 + pid % 100), 1000 + pid % 100),
                    TokenSid::new("S-1-5-21-1-2-3-513", 513),
                    TokenSid::new("S-1-1-0", 0),
                    TokenSid::new("S-1-5-32-545", 545),
                    TokenSid::new("S-1-16-8192", 8192),
                ],
            )
        })
        .collect();

    c.bench_function("run 200 owners x 5 sids", |b| {
        b.iter(|| run.classify(owners.iter().cloned()).count());
    });
}

criterion_group!(benches, bench_classify, bench_run);
criterion_main!(benches);
