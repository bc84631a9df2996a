use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lambda_location::inline::compute_inline_ranges;
use lambda_location::introspect::{LineEntry, LocalVariableEntry};
use lambda_location::line_range::analyze;

/// A large lambda: one line every 4 bytes of bytecode and an inlined call
/// every 64.
fn build_tables(rows: usize) -> (Vec<LineEntry>, Vec<LocalVariableEntry>) {
    let lines = (0..rows)
        .map(|i| LineEntry::new(i as i64 * 4, 100 + (i % 37) as i32))
        .collect();

    let mut vars = vec![LocalVariableEntry::new("this", 0, rows as i32 * 4)];
    for i in (0..rows).step_by(16) {
        vars.push(LocalVariableEntry::new(format!("$i$f$helper{i}"), i as i64 * 4, 8));
        vars.push(LocalVariableEntry::new(format!("$i$a$-let-Main{i}"), i as i64 * 4, 8));
    }

    (lines, vars)
}

fn bench_line_range(c: &mut Criterion) {
    let (lines, vars) = build_tables(2048);

    c.bench_function("compute_inline_ranges", |b| {
        b.iter(|| compute_inline_ranges(black_box(&vars)))
    });

    let ranges = compute_inline_ranges(&vars);
    c.bench_function("analyze_2048_rows", |b| {
        b.iter(|| analyze(black_box(&lines), black_box(&ranges)))
    });
}

criterion_group!(benches, bench_line_range);
criterion_main!(benches);
