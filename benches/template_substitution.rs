//! Benchmarks for path template rendering
//!
//! Tests parsing and rendering of attachment path templates.

use attachforge_common::{PathTemplate, TemplateBindings, Token};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

/// Template with no tokens (baseline)
const TEMPLATE_NO_TOKENS: &str = "uploads/static/placeholder.png";

/// The default attachment path
const TEMPLATE_DEFAULT: &str = ":folder/:id.:ext";

/// Built-in tokens only
const TEMPLATE_BUILTIN: &str = ":folder/:model/:id/:filename-:custom.:ext";

/// Built-in and nested extended tokens
const TEMPLATE_EXTENDED: &str =
    ":folder/:model/:{owner.profile.slug}/:{category}/:{created.year}/:id-:custom.:ext";

fn create_bindings() -> TemplateBindings {
    TemplateBindings::new()
        .with(Token::Folder, "uploads")
        .with(Token::Model, "Post")
        .with(Token::Id, "12345")
        .with(Token::Ext, "jpg")
        .with(Token::Filename, "holiday-photo.jpg")
        .with(Token::Custom, "thumb")
}

fn create_record() -> Value {
    json!({
        "owner": { "profile": { "slug": "jane-doe" } },
        "category": "travel",
        "created": { "year": 2024, "month": 7 }
    })
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let bindings = create_bindings();
    let record = create_record();

    for (name, pattern) in [
        ("no_tokens", TEMPLATE_NO_TOKENS),
        ("default", TEMPLATE_DEFAULT),
        ("builtin", TEMPLATE_BUILTIN),
        ("extended", TEMPLATE_EXTENDED),
    ] {
        let template = PathTemplate::new(pattern);
        group.throughput(Throughput::Bytes(pattern.len() as u64));
        group.bench_with_input(BenchmarkId::new("template", name), &template, |b, template| {
            b.iter(|| template.render(black_box(&bindings), black_box(&record)));
        });
    }

    group.finish();
}

fn bench_render_strict(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_strict");

    let bindings = create_bindings();
    let record = create_record();
    let template = PathTemplate::new(TEMPLATE_EXTENDED);
    let broken = PathTemplate::new(":folder/:{owner.missing}/:id.:ext");

    group.bench_function("resolved", |b| {
        b.iter(|| template.render_strict(black_box(&bindings), black_box(&record)));
    });
    group.bench_function("unresolved", |b| {
        b.iter(|| broken.render_strict(black_box(&bindings), black_box(&record)));
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for (name, pattern) in [
        ("default", TEMPLATE_DEFAULT),
        ("extended", TEMPLATE_EXTENDED),
    ] {
        group.bench_with_input(BenchmarkId::new("pattern", name), &pattern, |b, pattern| {
            b.iter(|| PathTemplate::new(black_box(*pattern)));
        });
    }

    group.bench_function("variant_pattern", |b| {
        let template = PathTemplate::new(TEMPLATE_DEFAULT);
        b.iter(|| black_box(&template).variant_pattern());
    });

    group.finish();
}

criterion_group!(benches, bench_render, bench_render_strict, bench_parse);
criterion_main!(benches);
