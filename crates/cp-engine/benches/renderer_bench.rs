use cp_engine::{DisplayList, WindowedRenderer};
use cp_ir::{encode_with, Note};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn notes(count: usize) -> Vec<Note> {
    (0..count)
        .map(|i| Note::new(40 + (i % 48) as u8, i as f64 * 0.125, i as f64 * 0.125 + 0.1))
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let input = notes(10_000);
    c.bench_function("encode 10k notes", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| encode_with(black_box(&input), &mut rng))
    });
}

fn bench_ticks(c: &mut Criterion) {
    let visual = encode_with(&notes(2_000), &mut StdRng::seed_from_u64(2));
    c.bench_function("tick through 2k notes at 50ms", |b| {
        b.iter(|| {
            let mut renderer = WindowedRenderer::new(visual.clone(), 32);
            let mut surface = DisplayList::new();
            let mut t = 0.0;
            while !renderer.is_exhausted() {
                renderer.tick(black_box(t), &mut surface);
                t += 0.05;
            }
            surface.clear_count()
        })
    });
}

criterion_group!(benches, bench_encode, bench_ticks);
criterion_main!(benches);
