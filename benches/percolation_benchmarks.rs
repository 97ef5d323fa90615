/// Performance benchmarks for the percolation model
///
/// Run with: cargo bench
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use percolation::simulation::run_until_percolation;
use percolation::{Percolation, UnionFind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Every site of an `n`-by-`n` grid in a fixed shuffled order
fn shuffled_sites(n: usize, seed: u64) -> Vec<(usize, usize)> {
    let mut sites: Vec<(usize, usize)> = (1..=n)
        .flat_map(|row| (1..=n).map(move |col| (row, col)))
        .collect();
    sites.shuffle(&mut StdRng::seed_from_u64(seed));
    sites
}

/// Benchmark: open sites in random order until the grid percolates
fn bench_run_until_percolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_until_percolation");

    for size in [25, 50, 100].iter() {
        group.throughput(Throughput::Elements((*size * *size) as u64));
        group.sample_size(10);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut rng = StdRng::seed_from_u64(17);
            b.iter(|| run_until_percolation(black_box(size), &mut rng).unwrap());
        });
    }

    group.finish();
}

/// Benchmark: open every site, including the full-site rescans
fn bench_open_all_sites(c: &mut Criterion) {
    let mut group = c.benchmark_group("open_all_sites");

    for size in [25, 50, 100].iter() {
        let sites = shuffled_sites(*size, 3);
        group.throughput(Throughput::Elements(sites.len() as u64));
        group.sample_size(10);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut perc = Percolation::new(size).unwrap();
                for &(row, col) in &sites {
                    perc.open(row, col).unwrap();
                }
                black_box(perc.percolates())
            });
        });
    }

    group.finish();
}

/// Benchmark: union-by-size on random pairs
fn bench_union_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("union_find");

    for count in [1_000, 10_000, 100_000].iter() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut pairs: Vec<(usize, usize)> = (0..*count).map(|i| (i, (i * 7919) % count)).collect();
        pairs.shuffle(&mut rng);
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let mut uf = UnionFind::new(count).unwrap();
                for &(p, q) in &pairs {
                    uf.union(p, q).unwrap();
                }
                black_box(uf.set_count())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_run_until_percolation,
    bench_open_all_sites,
    bench_union_find
);
criterion_main!(benches);
