use std::hint::black_box;

use bolt_parse::Edit;
use codspeed_criterion_compat::{BenchmarkId, Criterion, criterion_group, criterion_main};
use text_size::{TextRange, TextSize};

const ITEM: &str = "fn item { let x = [1, 2, 3] return x }\n";

// Incremental times should stay flat across sizes; full parses grow with them.
fn benchmark_reparse(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reparse Benchmark");

    for items in [256, 4_096, 65_536] {
        let text = ITEM.repeat(items);
        let old = bolt_parse::parse(&text);

        let start = text.len() / 2 + text[text.len() / 2..].find("2, 3").unwrap();
        let edit = Edit::replace(TextRange::at(TextSize::new(start as u32), TextSize::new(1)), "42");
        let new_text = edit.apply(&text, "42");

        group.bench_with_input(BenchmarkId::new("incremental", items), &new_text, |b, new_text| {
            b.iter(|| black_box(old.reparse(new_text, edit)));
        });
        group.bench_with_input(BenchmarkId::new("full", items), &new_text, |b, new_text| {
            b.iter(|| black_box(bolt_parse::parse(new_text)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_reparse);
criterion_main!(benches);
