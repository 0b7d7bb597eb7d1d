use criterion::{criterion_group, criterion_main, Criterion};
use fuzzyseek::compare;
use std::hint::black_box;

const REF: &str = "24576:9dR6xbt+XUgTu2YL/ZtT8052UJNZyCWbGNLsw5opPm0Off225NP02Rf:9Ox56dFYr/j8CWaJopu0On22fs2Rf";
const NEAR: &str = "24576:9dR6xbt+XUgTu2YL/ZtT8052UJNZyCWbGNLsw5opXm0Qff225NP02Rf:9Ox56dFYr/j8CWaJopu0Xn22fs2Rf";
const UNRELATED: &str = "96:hAemDTVvYlBVgBWmDD3TWIGWnRtplGWahAemDTVvYlBVgBWmDD3TWIGWnRtplG:hltplGWahltplGZ";

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");
    // Identical signatures short-circuit after parsing and reduction.
    group.bench_function("identical", |b| {
        b.iter(|| compare(black_box(Some(REF)), black_box(Some(REF))))
    });
    // Near duplicates pay for the rolling-hash gate plus the edit distance.
    group.bench_function("near_duplicate", |b| {
        b.iter(|| compare(black_box(Some(REF)), black_box(Some(NEAR))))
    });
    // Unrelated blocksizes reject before any string work.
    group.bench_function("unrelated_blocksize", |b| {
        b.iter(|| compare(black_box(Some(REF)), black_box(Some(UNRELATED))))
    });
    group.finish();
}

criterion_group!(benches, bench_compare);
criterion_main!(benches);
