use std::hint::black_box;

use codspeed_criterion_compat::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};

fn benchmark_parser(c: &mut Criterion) {
    let inputs = [
        (
            "Simple",
            r#"
            fn foo {
                return 42
            }
            "#
            .to_owned(),
        ),
        (
            "Medium",
            r#"
            export fn foo(a: number, b: string) {
                if a > 1 { return [a, b, "c\n"] } else { return null }
                // comment
                let t = { x = 1, y = this.x ?? 2 }
            }
            "#
            .repeat(16),
        ),
        ("Deep", format!("{}{}", "{ [".repeat(512), "] }".repeat(512))),
    ];

    let mut group = c.benchmark_group("Parser Benchmark");

    for (name, code) in &inputs {
        group.throughput(Throughput::Bytes(code.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse_code", name), code, |b, code| {
            b.iter(|| {
                let parse = bolt_parse::parse(code);
                black_box(parse);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_parser);
criterion_main!(benches);
