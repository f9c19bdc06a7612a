// Journal benchmarks — replay cost vs journal length, LCS diff cost vs file size.
// Run: cargo bench --bench journal_bench

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use openpawz_journal::engine::journal::diff::{compare_file_systems, generate_inline_diff};
use openpawz_journal::engine::journal::replay::replay;
use openpawz_journal::{JournalCommand, JournalEntry};

/// A journal that keeps growing ten files line by line.
fn synthetic_journal(len: usize) -> Vec<JournalEntry> {
    let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let mut journal = Vec::with_capacity(len);
    for i in 0..len {
        let path = format!("/memories/file-{}.md", i % 10);
        let command = if i < 10 {
            JournalCommand::Create { path, file_text: format!("line {}", i) }
        } else {
            JournalCommand::Insert { path, insert_line: 0, insert_text: format!("line {}", i) }
        };
        journal.push(JournalEntry::new(command, ts));
    }
    journal
}

fn text(lines: usize, every: usize) -> String {
    (0..lines)
        .map(|i| if every > 0 && i % every == 0 { format!("changed {}", i) } else { format!("line {}", i) })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    for len in [100, 1_000, 5_000] {
        let journal = synthetic_journal(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &journal, |b, j| {
            b.iter(|| replay(black_box(j), j.len()))
        });
    }
    group.finish();
}

fn bench_inline_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_inline_diff");
    for lines in [50, 500, 2_000] {
        let old = text(lines, 0);
        let new = text(lines, 7);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &(old, new), |b, (o, n)| {
            b.iter(|| generate_inline_diff(black_box(o), black_box(n)))
        });
    }
    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let a = replay(&synthetic_journal(1_000), 1_000).fs;
    let b = replay(&synthetic_journal(1_001), 1_001).fs;
    c.bench_function("compare_file_systems", |bench| {
        bench.iter(|| compare_file_systems(black_box(&a), black_box(&b)))
    });
}

criterion_group!(benches, bench_replay, bench_inline_diff, bench_compare);
criterion_main!(benches);
