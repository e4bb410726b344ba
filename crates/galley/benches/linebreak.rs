use criterion::{criterion_group, criterion_main, Criterion};
use galley::font::Font;
use galley::linebreaks::Paragraph;
use galley::node::{CharBox, Node};
use galley::Glue;

fn build_hlist(words: usize) -> Vec<Node> {
    let mut hlist = Vec::new();
    for i in 0..words {
        if i > 0 {
            hlist.push(Node::Glue(Glue::new(5.0, 2.0, 1.0)));
        }
        for _ in 0..5 {
            hlist.push(Node::Char(CharBox {
                char: 'm',
                font: Font(0),
                width: 10.0,
                height: 7.0,
                depth: 3.0,
                italic_correction: 0.0,
            }));
        }
    }
    hlist
}

pub fn linebreak_bench(c: &mut Criterion) {
    let paragraph = Paragraph::new(400.0);
    let mut hlist = build_hlist(200);
    paragraph.prepare(&mut hlist);

    let mut group = c.benchmark_group("linebreak");
    group.bench_function("break_200_words", |b| {
        b.iter(|| paragraph.create(&hlist).unwrap())
    });
}

criterion_group!(benches, linebreak_bench);
criterion_main!(benches);
