use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use math::modulus::WordOps;
use math::poly::Poly;
use math::ring::Ring;

fn ntt(c: &mut Criterion) {
    fn runner<'a, const INPLACE: bool>(ring: &'a Ring<u64>) -> Box<dyn FnMut() + 'a> {
        let mut a: Poly<u64> = ring.new_poly();
        for i in 0..a.n() {
            a.0[i] = i as u64;
        }
        if INPLACE {
            Box::new(move || ring.ntt_inplace(&mut a))
        } else {
            let mut b: Poly<u64> = ring.new_poly();
            Box::new(move || ring.ntt(&a, &mut b))
        }
    }

    let q: u64 = 0x1fffffffffe00001u64;

    let mut b: criterion::BenchmarkGroup<'_, criterion::measurement::WallTime> = c.benchmark_group("ntt");

    for log_n in 10..15 {
        let ring: Ring<u64> = Ring::new(1 << log_n, q);

        let runners: [(String, Box<dyn FnMut()>); 2] = [
            (format!("inplace=true/q={}", q.log2()), { runner::<true>(&ring) }),
            (format!("inplace=false/q={}", q.log2()), { runner::<false>(&ring) }),
        ];

        for (name, mut runner) in runners {
            let id: BenchmarkId = BenchmarkId::new(name, format!("n={}", 1 << log_n));
            b.bench_with_input(id, &(), |b: &mut criterion::Bencher<'_>, _| b.iter(&mut runner));
        }
    }
}

fn intt(c: &mut Criterion) {
    fn runner<'a, const INPLACE: bool>(ring: &'a Ring<u64>) -> Box<dyn FnMut() + 'a> {
        let mut a: Poly<u64> = ring.new_poly();
        for i in 0..a.n() {
            a.0[i] = i as u64;
        }
        if INPLACE {
            Box::new(move || ring.intt_inplace(&mut a))
        } else {
            let mut b: Poly<u64> = ring.new_poly();
            Box::new(move || ring.intt(&a, &mut b))
        }
    }

    let q: u64 = 0x1fffffffffe00001u64;

    let mut b: criterion::BenchmarkGroup<'_, criterion::measurement::WallTime> = c.benchmark_group("intt");

    for log_n in 10..15 {
        let ring: Ring<u64> = Ring::new(1 << log_n, q);

        let runners: [(String, Box<dyn FnMut()>); 2] = [
            (format!("inplace=true/q={}", q.log2()), { runner::<true>(&ring) }),
            (format!("inplace=false/q={}", q.log2()), { runner::<false>(&ring) }),
        ];

        for (name, mut runner) in runners {
            let id: BenchmarkId = BenchmarkId::new(name, format!("n={}", 1 << log_n));
            b.bench_with_input(id, &(), |b: &mut criterion::Bencher<'_>, _| b.iter(&mut runner));
        }
    }
}

criterion_group!(benches, ntt, intt);
criterion_main!(benches);
