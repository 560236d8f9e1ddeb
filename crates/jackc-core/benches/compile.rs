//! Benchmark for whole-unit compilation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jackc_core::compile_unit;

const POINT_CLASS: &str = "\
class Point {
    field int x, y;
    static int count;

    constructor Point new(int ax, int ay) {
        let x = ax;
        let y = ay;
        let count = count + 1;
        return this;
    }

    method int getX() { return x; }
    method int getY() { return y; }

    method int manhattan(Point other) {
        var int dx, dy;
        let dx = x - other.getX();
        let dy = y - other.getY();
        if (dx < 0) { let dx = -dx; }
        if (dy < 0) { let dy = -dy; }
        return dx + dy;
    }

    function int created() { return count; }
}
";

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_point_class", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            compile_unit(black_box(POINT_CLASS), &mut out).unwrap();
            out
        })
    });
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
