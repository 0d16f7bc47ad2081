use itertools::izip;
use math::automorphism::{galois_element, AutoPerm};
use math::poly::{Poly, PolyRNS};
use math::ring::{Ring, RingRNS};

#[test]
fn automorphism_u64() {
    let n: usize = 1 << 4;
    let ring: Ring<u64> = Ring::new(n, 65537);

    sub_test("test_automorphism_inverse", || test_automorphism_inverse(&ring));
    sub_test("test_automorphism_from_perm", || test_automorphism_from_perm(&ring));
    sub_test("test_automorphism_composition", || test_automorphism_composition(&ring));
    sub_test("test_automorphism_rns", || test_automorphism_rns(n));
}

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

// X^i -> X^-i = -X^(n-i)
fn test_automorphism_inverse(ring: &Ring<u64>) {
    let n: usize = ring.n();
    let q: u64 = ring.modulus.q;

    let mut p0: Poly<u64> = ring.new_poly();
    let mut p1: Poly<u64> = ring.new_poly();

    for i in 0..p0.n() {
        p0.0[i] = i as u64
    }

    ring.automorphism(&p0, 2 * n - 1, &mut p1);

    p0.0[0] = 0;
    for i in 1..p0.n() {
        p0.0[i] = q - (n - i) as u64
    }

    izip!(p0.0, p1.0).for_each(|(a, b)| assert_eq!(a, b));
}

fn test_automorphism_from_perm(ring: &Ring<u64>) {
    let n: usize = ring.n();
    let mut p0: Poly<u64> = ring.new_poly();
    for i in 0..p0.n() {
        p0.0[i] = (i * i + 1) as u64
    }

    for exponent in 1..n / 2 {
        let gal_el: usize = galois_element(3, exponent, n);
        let perm: AutoPerm = AutoPerm::new(n, gal_el);
        let mut direct: Poly<u64> = ring.new_poly();
        let mut permuted: Poly<u64> = ring.new_poly();
        ring.automorphism(&p0, gal_el, &mut direct);
        ring.automorphism_from_perm(&p0, &perm, &mut permuted);
        assert_eq!(direct, permuted, "gal_el={}", gal_el);
    }
}

fn test_automorphism_composition(ring: &Ring<u64>) {
    let n: usize = ring.n();
    let mut p0: Poly<u64> = ring.new_poly();
    for i in 0..p0.n() {
        p0.0[i] = (7 * i + 3) as u64
    }

    let g1: usize = galois_element(3, 1, n);
    let g2: usize = galois_element(3, 2, n);
    assert_eq!(galois_element(3, 3, n), (g1 * g2) % (2 * n));

    let mut tmp: Poly<u64> = ring.new_poly();
    let mut composed: Poly<u64> = ring.new_poly();
    let mut direct: Poly<u64> = ring.new_poly();
    ring.automorphism(&p0, g1, &mut tmp);
    ring.automorphism(&tmp, g2, &mut composed);
    ring.automorphism(&p0, galois_element(3, 3, n), &mut direct);
    assert_eq!(composed, direct);

    // 3 has order n/2 modulo 2n
    assert_eq!(galois_element(3, n / 2, n), 1);
}

fn test_automorphism_rns(n: usize) {
    let ring: RingRNS<u64> = RingRNS::new(n, &[40961, 65537]);
    let values: Vec<i64> = (0..n as i64).map(|i| 5 - i).collect();
    let mut a: PolyRNS<u64> = ring.new_polyrns();
    ring.from_i64(&values, &mut a);

    let gal_el: usize = galois_element(3, 1, n);
    let mut b: PolyRNS<u64> = ring.new_polyrns();
    ring.automorphism(&a, gal_el, &mut b);

    for i in 0..ring.level() + 1 {
        let mut expected: Poly<u64> = ring.new_poly();
        ring.0[i].automorphism(a.at(i), gal_el, &mut expected);
        assert_eq!(b.at(i), &expected);
        let x0: Vec<i64> = b.at(i).0.iter().map(|x| ring.0[i].center(*x)).collect();
        let x1: Vec<i64> = b.at(0).0.iter().map(|x| ring.0[0].center(*x)).collect();
        assert_eq!(x0, x1);
    }
}
