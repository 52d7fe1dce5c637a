use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use vellum_model::{
    Document, ElementKind, Fragment, MarkAttributes, MarkSpec, Operation, Range, Tree,
};

fn generate_document(paragraphs: usize) -> Tree {
    let children = (0..paragraphs).map(|i| {
        Fragment::element(
            ElementKind::Paragraph,
            [
                Fragment::text(format!("Paragraph {i} starts plainly, ")),
                Fragment::marked_text("then turns bold", [MarkSpec::bold()]),
                Fragment::text(" and ends plainly again."),
            ],
        )
    });
    Tree::from_fragment(&Fragment::root(children)).unwrap()
}

fn bench_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("operations");
    group.sample_size(20);

    let doc = Document::new(generate_document(200));

    group.bench_function("insert_text", |b| {
        b.iter_batched(
            || doc.tree().clone(),
            |mut tree| {
                let range = Range::from_paths(&tree, vec![100, 5], vec![100, 5]).unwrap();
                let op = Operation::InsertText {
                    range,
                    text: black_box("typed".to_string()),
                };
                black_box(op.execute(&mut tree).unwrap());
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("bold_across_paragraph", |b| {
        b.iter_batched(
            || doc.tree().clone(),
            |mut tree| {
                let range = Range::from_paths(&tree, vec![100, 3], vec![100, 40]).unwrap();
                let op = Operation::add_mark(range, MarkSpec::bold(), MarkAttributes::default());
                black_box(op.execute(&mut tree).unwrap());
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("remove_across_paragraphs", |b| {
        b.iter_batched(
            || doc.tree().clone(),
            |mut tree| {
                let range = Range::from_paths(&tree, vec![10, 4], vec![190, 4]).unwrap();
                black_box(Operation::Remove { range }.execute(&mut tree).unwrap());
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("map_position_through_transaction", |b| {
        let mut working = Document::new(doc.tree().clone());
        let mapper = working
            .transact("bench", |tx| {
                for i in 0..50 {
                    let range = Range::from_paths(tx.tree(), vec![i, 0], vec![i, 0])?;
                    tx.apply(Operation::InsertText {
                        range,
                        text: "x".into(),
                    })?;
                }
                Ok(tx.mapper().clone())
            })
            .unwrap();
        let range = Range::from_paths(doc.tree(), vec![120, 8], vec![150, 8]).unwrap();
        b.iter(|| black_box(mapper.map_range(black_box(&range))));
    });

    group.finish();
}

criterion_group!(benches, bench_operations);
criterion_main!(benches);
