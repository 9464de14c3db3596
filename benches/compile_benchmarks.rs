//! Compilation throughput benchmarks.
//!
//! Measures the whole pipeline (parse, analyze, generate) on the sample
//! programs and on generated inputs of growing size.
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- "generated"
//! ```

use std::fmt::Write;
use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ycc::{CompileOptions, compile};

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// `classes` copies of a class with arithmetic, a loop and a switch.
fn generated_source(classes: usize) -> String {
    let mut source = String::new();
    for i in 0..classes {
        let _ = write!(
            source,
            "class C{i} {{
    static int calls;
    int sum(int n) {{
        int total = 0;
        for (int k = 0; k < n; k++) {{
            total += k * {i};
        }}
        calls++;
        return total;
    }}
    double mix(int a, long b, double c) {{
        switch (a) {{
            case 0: return b;
            case 1: return c;
            default: return a + b + c;
        }}
    }}
}}
"
        );
    }
    source
}

fn sample_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("compile/samples");
    let samples = [
        ("arithmetic", include_str!("../test_scripts/arithmetic.java")),
        ("loops", include_str!("../test_scripts/loops.java")),
        ("objects", include_str!("../test_scripts/objects.java")),
    ];
    for (name, source) in samples {
        let options = CompileOptions::new(format!("{name}.java"));
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let output = compile(black_box(source), &options);
                end_profiling_frame();
                black_box(output.ir.map(|ir| ir.len()))
            });
        });
    }
    group.finish();
}

fn generated_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("compile/generated");
    let options = CompileOptions::new("Generated.java");
    for classes in [10, 100, 1000] {
        let source = generated_source(classes);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(format!("{classes}_classes"), |b| {
            b.iter(|| {
                let output = compile(black_box(&source), &options);
                end_profiling_frame();
                black_box(output.ir.map(|ir| ir.len()))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, sample_benchmarks, generated_benchmarks);
criterion_main!(benches);
