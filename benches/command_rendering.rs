//! Benchmarks for command rendering
//!
//! Measures placeholder substitution and the cost of turning a recipe phase
//! into resolved argument vectors.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mediacook::recipe::{Recipe, Step};
use mediacook_av::{ProbedMetadata, TemplateContext};
use std::path::Path;

/// Argument with no placeholders (baseline)
const ARG_PLAIN: &str = "scale=trunc(in_w/2)*2:trunc(in_h/2)*2";

/// Argument with one placeholder
const ARG_STEM: &str = "{stem}.webm";

/// Argument with several placeholders and a custom variable
const ARG_MIXED: &str = "{stem}_attachment_{name} {stem}.{extension} 0:s:{n} {unknown}";

fn create_context() -> TemplateContext {
    TemplateContext::new().with_bindings(
        Path::new("/var/tmp/uploads/tmpa1b2c3d4e5/Some Episode [1080p].mkv"),
        Path::new("/srv/mediacook/storage/LxqXxVPAvqqB"),
        "mkv",
    )
}

fn full_probe() -> ProbedMetadata {
    ProbedMetadata {
        has_video: true,
        has_audio: true,
        ..Default::default()
    }
}

fn bench_substitute(c: &mut Criterion) {
    let mut group = c.benchmark_group("substitute");

    let ctx = create_context().with_var("name", "OpenSans-Bold.ttf").with_var("n", "0");

    for (label, arg) in [("plain", ARG_PLAIN), ("stem", ARG_STEM), ("mixed", ARG_MIXED)] {
        group.throughput(Throughput::Bytes(arg.len() as u64));
        group.bench_with_input(BenchmarkId::new("arg", label), &arg, |b, arg| {
            b.iter(|| ctx.substitute(black_box(arg)));
        });
    }

    group.finish();
}

fn bench_render_phase(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_phase");

    let ctx = create_context();
    let probe = full_probe();

    for recipe in [Recipe::Video, Recipe::Audio, Recipe::Svg] {
        let steps = recipe.sync_steps(&probe);
        group.bench_with_input(
            BenchmarkId::new("sync", recipe.name()),
            &steps,
            |b, steps| {
                b.iter(|| {
                    steps
                        .iter()
                        .filter_map(|step| match step {
                            Step::Run(invocation) => Some(invocation.render(black_box(&ctx))),
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                });
            },
        );
    }

    group.bench_function("build_video_steps", |b| {
        b.iter(|| Recipe::Video.sync_steps(black_box(&probe)));
    });

    group.finish();
}

fn bench_context_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("context_creation");

    let input = Path::new("/var/tmp/uploads/tmpa1b2c3d4e5");
    let stem = Path::new("/srv/mediacook/storage/LxqXxVPAvqqB");

    group.bench_function("with_bindings", |b| {
        b.iter(|| TemplateContext::new().with_bindings(black_box(input), black_box(stem), "mkv"));
    });

    group.bench_function("with_bindings_and_stream_vars", |b| {
        b.iter(|| {
            TemplateContext::new()
                .with_bindings(black_box(input), black_box(stem), "mkv")
                .with_var("index", "3")
                .with_var("n", "1")
                .with_var("subtitle_ext", "ass")
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_substitute,
    bench_render_phase,
    bench_context_creation
);
criterion_main!(benches);
