#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use etreemodel::xml::{Element, Parser};
use etreemodel::{outline, EtreeModel, Layout, ModelConfig, ModelIndex, WriterConfig};

// Catalog with `books` entries, a few attributes and text each
fn catalog(books: usize) -> Element {
    let mut root = Element::new("catalog").with_attribute("version", "2");
    for i in 0..books {
        let book = root.sub_element("book");
        book.attributes.insert("id".to_string(), format!("bk{i}"));
        book.sub_element("title").text = Some(format!("Title {i}"));
        book.sub_element("author").text = Some("Someone, Else".to_string());
        book.sub_element("price").text = Some("9.95".to_string());
    }
    root
}

fn bench_parse(c: &mut Criterion) {
    let input = catalog(1000).to_xml(&WriterConfig::default());

    c.bench_function("parse_xml", |b| {
        b.iter(|| Parser::new(black_box(input.as_bytes())).parse().unwrap())
    });
}

fn bench_build(c: &mut Criterion) {
    let root = catalog(1000);

    for layout in [Layout::Grouped, Layout::Flat] {
        c.bench_function(&format!("build_model_{layout:?}").to_lowercase(), |b| {
            b.iter_batched(
                || root.clone(),
                |root| EtreeModel::with_config(root, ModelConfig::default().with_layout(layout)),
                BatchSize::LargeInput,
            )
        });
    }
}

fn bench_edits(c: &mut Criterion) {
    let root = catalog(200);

    c.bench_function("insert_and_remove_rows", |b| {
        b.iter_batched(
            || EtreeModel::with_config(root.clone(), ModelConfig::default()),
            |mut model| {
                let children = model.index(2, 0, &model.root_index());
                model.insert_rows(100, 50, &children);
                model.remove_rows(0, 150, &children);
                model
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("add_parent_element", |b| {
        b.iter_batched(
            || EtreeModel::with_config(root.clone(), ModelConfig::default()),
            |mut model| {
                let children = model.index(2, 0, &model.root_index());
                let book = model.index(black_box(150), 0, &children);
                model.add_parent_element(&book);
                model
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_walk(c: &mut Criterion) {
    let model = EtreeModel::with_config(catalog(500), ModelConfig::default());

    c.bench_function("outline", |b| b.iter(|| outline(black_box(&model))));
    c.bench_function("row_count_walk", |b| {
        b.iter(|| {
            let mut stack = vec![ModelIndex::invalid()];
            let mut rows = 0;
            while let Some(parent) = stack.pop() {
                let count = model.row_count(&parent);
                rows += count;
                stack.extend((0..count).map(|row| model.index(row, 0, &parent)));
            }
            rows
        })
    });
}

criterion_group!(benches, bench_parse, bench_build, bench_edits, bench_walk);
criterion_main!(benches);
