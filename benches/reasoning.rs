//! Benchmarks for trace parsing and reasoning.
//!
//! Measures the two hot paths of a trace load:
//! - Document ingestion (parse + normalization)
//! - The full reasoning pipeline over an already-loaded trace

extern crate stackscope;

use criterion::{criterion_group, criterion_main, Criterion};
use stackscope::analysis::{reason, AnalysisConfig};
use stackscope::Trace;
use std::fmt::Write;
use std::hint::black_box;

/// Builds a synthetic trace document with the given number of steps, each
/// carrying a full register file and a 16-slot stack dump.
fn synthetic_document(steps: usize) -> String {
    let mut snapshots = String::new();
    for step in 0..steps {
        if step > 0 {
            snapshots.push(',');
        }
        let mut slots = String::new();
        for slot in 0..16 {
            if slot > 0 {
                slots.push(',');
            }
            let value = if step == steps - 1 && slot == 4 {
                "\"0x41414141\"".to_string()
            } else {
                format!("{}", slot * 7)
            };
            let _ = write!(
                slots,
                r#"{{"id":{slot},"pos":{},"size":4,"value":{value}}}"#,
                slot * 4
            );
        }
        let _ = write!(
            snapshots,
            r#"{{"step":{step},"instr":"mov eax, [rbp-0x10]","line":{},"rip":"{:#x}",
                "registers":[
                    {{"name":"RBP","value":"0x7ffd1000"}},
                    {{"name":"RSP","value":"0x7ffd0fe0"}},
                    {{"name":"RAX","value":{step}}}
                ],
                "stack":[{slots}]}}"#,
            step + 1,
            0x401000 + step * 4
        );
    }
    format!(
        r#"{{"snapshots":[{snapshots}],
            "meta":{{
                "word_size":8,"buffer_offset":-32,"buffer_size":16,
                "disasm":[
                    {{"addr":"0x401000","line":1,"text":"lea rdi, [rbp-0x20]"}},
                    {{"addr":"0x401004","line":2,"text":"call read_input"}},
                    {{"addr":"0x401008","line":3,"text":"mov eax, [rbp-0x1c]"}},
                    {{"addr":"0x40100c","line":4,"text":"cmp eax, 0x2a"}}
                ]}}}}"#
    )
}

fn bench_trace_parse(c: &mut Criterion) {
    let document = synthetic_document(64);

    c.bench_function("trace_parse_64_steps", |b| {
        b.iter(|| {
            let trace = Trace::from_json(black_box(&document)).unwrap();
            black_box(trace)
        });
    });
}

fn bench_reason(c: &mut Criterion) {
    let trace = Trace::from_json(&synthetic_document(64)).unwrap();
    let config = AnalysisConfig::default();

    c.bench_function("reason_64_steps", |b| {
        b.iter(|| black_box(reason(black_box(&trace), black_box(&config))));
    });
}

fn bench_reason_large(c: &mut Criterion) {
    let trace = Trace::from_json(&synthetic_document(1024)).unwrap();
    let config = AnalysisConfig::default();

    c.bench_function("reason_1024_steps", |b| {
        b.iter(|| black_box(reason(black_box(&trace), black_box(&config))));
    });
}

criterion_group!(
    benches,
    bench_trace_parse,
    bench_reason,
    bench_reason_large
);
criterion_main!(benches);
