//! Benchmark keystream throughput per refill strategy.
//!
//! Draws 4096 words from a 16-lane engine for the scalar strategy and each
//! batched lane width, for every transform.

use core::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ks_rs::{
    BlockTransform, Engine, EngineConfig, LaneWidth, Strategy, WordOf,
    cipher::{Aes128, Magma, Speck128Full, Threefry4x64R20, Word, Xtea2},
};

const WORDS: usize = 4096;
const LANES: usize = 16;

fn strategies() -> impl Iterator<Item = Strategy> {
    core::iter::once(Strategy::Scalar)
        .chain(LaneWidth::ALL.into_iter().map(Strategy::Batched))
}

fn bench_strategies_for<T: BlockTransform>(c: &mut Criterion, transform: &T) {
    let mut g = c.benchmark_group(format!("keystream/{}", T::NAME));
    g.throughput(Throughput::Bytes(
        (WORDS * <WordOf<T> as Word>::BITS as usize / 8) as u64,
    ));

    for strategy in strategies() {
        let config = EngineConfig::default()
            .with_lanes(LANES)
            .with_strategy(strategy);
        g.bench_function(BenchmarkId::new("fill_words", strategy), |b| {
            let mut engine = Engine::new(transform.clone(), config).unwrap();
            let mut out = vec![<WordOf<T> as Word>::ZERO; WORDS];
            b.iter(|| {
                engine.fill_words(black_box(&mut out));
            });
        });
    }

    g.finish();
}

fn lane_width_benches(c: &mut Criterion) {
    bench_strategies_for(c, &Aes128::new(&[0x2b; 16]));
    bench_strategies_for(c, &Speck128Full::new(&[1, 2]));
    bench_strategies_for(c, &Threefry4x64R20::new(&[1, 2, 3, 4]));
    bench_strategies_for(c, &Magma::new(&[7; 8]));
    bench_strategies_for(c, &Xtea2::new(&[5; 4]));
}

criterion_group!(benches, lane_width_benches);
criterion_main!(benches);
