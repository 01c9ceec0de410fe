use criterion::{black_box, criterion_group, criterion_main, Criterion};
use morpheval::{evaluate, ZeroDivisionPolicy};

/// Synthetic gold/pred pairs with realistic morpheme shapes: a few thousand
/// lines, one to four morphemes each, with partial overlap between the gold
/// and the predicted bags.
fn build_lines(n: usize) -> (Vec<String>, Vec<String>) {
    let morphs = ["ak", "weene", "ki", "miin", "paro", "ta", "ma", "si"];
    let mut gold = Vec::with_capacity(n);
    let mut pred = Vec::with_capacity(n);
    for i in 0..n {
        let width = 1 + i % 4;
        let gold_line: Vec<&str> = (0..width).map(|j| morphs[(i + j) % morphs.len()]).collect();
        // Shift every other predicted line by one morph to force mismatches.
        let shift = i % 2;
        let pred_line: Vec<&str> = (0..width)
            .map(|j| morphs[(i + j + shift) % morphs.len()])
            .collect();
        gold.push(gold_line.join(" "));
        pred.push(pred_line.join(" "));
    }
    (gold, pred)
}

fn bench_evaluate(c: &mut Criterion) {
    let (gold, pred) = build_lines(10_000);
    c.bench_function("evaluate 10k lines", |b| {
        b.iter(|| {
            evaluate(
                black_box(&gold),
                black_box(&pred),
                ZeroDivisionPolicy::ReplaceBy0,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
