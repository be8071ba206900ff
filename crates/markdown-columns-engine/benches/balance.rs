use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use markdown_columns_engine::parsing::parse_region_body;
use markdown_columns_engine::plain_text::{PlainTextRenderer, TextTarget};
use markdown_columns_engine::{LayoutOptions, Region, RegionRegistry, parse_document};
use xi_rope::Rope;

fn generate_region(blocks: usize) -> String {
    let mut body = String::from("```column-settings\nNumber of Columns: 3\nAuto Layout: on\n```\n\n");
    for i in 0..blocks {
        if i % 7 == 0 {
            body.push_str(&format!("## Section {i}\n"));
        }
        let words = 5 + (i * 13) % 40;
        let line = (0..words)
            .map(|w| format!("word{w}"))
            .collect::<Vec<_>>()
            .join(" ");
        body.push_str(&line);
        body.push_str("\n\n");
    }
    body
}

fn bench_auto_balance(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_balance");
    group.sample_size(20);

    let source = generate_region(200);
    let parsed = parse_region_body(&Rope::from(source.as_str()));
    let options = LayoutOptions::default();

    group.bench_function("cold_layout_200_blocks", |b| {
        b.iter(|| {
            let mut renderer = PlainTextRenderer::new();
            let mut region =
                Region::with_config("bench", TextTarget::new(120), parsed.config(), &options);
            region.sync_blocks(&mut renderer, &parsed.blocks);
            black_box(region.render(&mut renderer));
        });
    });

    let mut renderer = PlainTextRenderer::new();
    let mut region = Region::with_config("bench", TextTarget::new(120), parsed.config(), &options);
    region.sync_blocks(&mut renderer, &parsed.blocks);
    region.render(&mut renderer);
    group.bench_function("settled_refresh_200_blocks", |b| {
        b.iter(|| black_box(region.render(&mut renderer)));
    });

    group.finish();
}

fn bench_document_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_sync");
    group.sample_size(20);

    let mut document = String::new();
    for r in 0..20 {
        document.push_str(&format!("=== start-multi-column: ID_{r:04}\n"));
        document.push_str(&generate_region(20));
        document.push_str("=== end-multi-column\n\n");
    }
    let rope = Rope::from(document.as_str());

    group.bench_function("parse_20_regions", |b| {
        b.iter(|| black_box(parse_document(black_box(&rope))));
    });

    let parsed = parse_document(&rope);
    let mut renderer = PlainTextRenderer::new();
    let mut registry = RegionRegistry::default();
    registry.sync_document(&mut renderer, &parsed, || TextTarget::new(120));
    group.bench_function("resync_unchanged_20_regions", |b| {
        b.iter(|| {
            black_box(registry.sync_document(&mut renderer, &parsed, || TextTarget::new(120)));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_auto_balance, bench_document_sync);
criterion_main!(benches);
