use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sdb::expr::Evaluator;
use sdb::machine::{Machine, MEM_BASE};

fn make_sum(terms: usize) -> String {
    (1..=terms).map(|n| n.to_string()).collect::<Vec<_>>().join(" + ")
}

fn make_nested(depth: usize) -> String {
    format!("{}1{}", "(".repeat(depth), " + 1)".repeat(depth))
}

fn bench_eval(c: &mut Criterion) {
    let mut machine = Machine::default();
    machine.set_register("sp", MEM_BASE + 0x100).ok();
    machine.write_word(MEM_BASE + 0x108, 42).ok();

    let ev = Evaluator::with_max_tokens(4096);
    let short = "2 + 3 * 4";
    let mixed = "(*($sp + 8) - 0x10) / 2 == 17 && $pc != 0";
    let sum = make_sum(200);
    let nested = make_nested(100);

    let mut g = c.benchmark_group("evaluate");

    g.bench_function("short", |b| {
        b.iter(|| ev.evaluate(black_box(short), &machine))
    });
    g.bench_function("registers_and_memory", |b| {
        b.iter(|| ev.evaluate(black_box(mixed), &machine))
    });
    g.bench_function("sum_200", |b| {
        b.iter(|| ev.evaluate(black_box(&sum), &machine))
    });
    g.bench_function("nested_100", |b| {
        b.iter(|| ev.evaluate(black_box(&nested), &machine))
    });
    g.bench_function("tokens_only_sum_200", |b| {
        b.iter(|| ev.tokens(black_box(&sum), &machine))
    });

    g.finish();
}

criterion_group!(benches, bench_eval);
criterion_main!(benches);
