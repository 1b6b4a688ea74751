//! This file implements functionality from FIPS 204 section 8.5 `NTT` and `invNTT`

use crate::helpers::{mod_sub, montgomery_transform, pow_mod_q, reduce_montgomery, reduce_once, NTT_ROOTS_MONTGOMERY};
use crate::types::Scalar;
use crate::Q;

/// `256^-1 mod Q` carrying a double Montgomery factor, so that the final
/// reduction of the inverse transform both removes the `2^8` scaling and
/// restores the Montgomery factor consumed by the butterfly reductions.
const INVERSE_DEGREE_MONTGOMERY: u32 =
    montgomery_transform(montgomery_transform(pow_mod_q(256, Q - 2)));

/// # Algorithm 41 `NTT(w)` on page 43.
/// In-place forward transform, Cooley-Tukey order.
///
/// The composition `scalar_inverse_ntt(scalar_ntt(p))` yields `p` scaled by
/// `2^32 mod Q`; every caller interposes exactly one Montgomery pointwise
/// multiplication between the two transforms, so pipeline outputs land back
/// in standard form.
pub(crate) fn scalar_ntt(s: &mut Scalar) {
    // Step: 1, 2, 4, ..., 128
    // Offset: 128, 64, 32, ..., 1
    let mut offset = 256;
    let mut step = 1;
    while step < 256 {
        offset >>= 1;
        let mut k = 0;
        for i in 0..step {
            let root = NTT_ROOTS_MONTGOMERY[step + i];
            for j in k..k + offset {
                let even = s.c[j];
                // root < Q as static data and s.c[..] < Q by the Scalar
                // invariant, so the product stays below Q * 2^32.
                let odd = reduce_montgomery(u64::from(root) * u64::from(s.c[j + offset]));
                s.c[j] = reduce_once(even + odd);
                s.c[j + offset] = mod_sub(even, odd);
            }
            k += 2 * offset;
        }
        step <<= 1;
    }
}

/// # Algorithm 42 `NTT^-1(w_hat)` on page 44.
/// In-place inverse transform, Gentleman-Sande order, sweeping the root
/// table in reverse with negated roots.
pub(crate) fn scalar_inverse_ntt(s: &mut Scalar) {
    // Step: 128, 64, 32, ..., 1
    // Offset: 1, 2, 4, ..., 128
    let mut step = 256;
    let mut offset = 1;
    while offset < 256 {
        step >>= 1;
        let mut k = 0;
        for i in 0..step {
            let root = Q - NTT_ROOTS_MONTGOMERY[step + (step - 1 - i)];
            for j in k..k + offset {
                let even = s.c[j];
                let odd = s.c[j + offset];
                s.c[j] = reduce_once(even + odd);
                // Q + even - odd < 2*Q, so the product stays below Q * 2^32.
                s.c[j + offset] =
                    reduce_montgomery(u64::from(root) * u64::from(Q + even - odd));
            }
            k += 2 * offset;
        }
        offset <<= 1;
    }
    for c in &mut s.c {
        *c = reduce_montgomery(u64::from(*c) * u64::from(INVERSE_DEGREE_MONTGOMERY));
    }
}

pub(crate) fn vector_ntt<const X: usize>(a: &mut [Scalar; X]) {
    for s in a.iter_mut() {
        scalar_ntt(s);
    }
}

pub(crate) fn vector_inverse_ntt<const X: usize>(a: &mut [Scalar; X]) {
    for s in a.iter_mut() {
        scalar_inverse_ntt(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::scalar_mult;
    use rand::{Rng, SeedableRng};

    fn to_montgomery(s: &Scalar) -> Scalar {
        let r2 = montgomery_transform(montgomery_transform(1));
        let mut out = Scalar::ZERO;
        for (o, &c) in out.c.iter_mut().zip(s.c.iter()) {
            *o = reduce_montgomery(u64::from(c) * u64::from(r2));
        }
        out
    }

    fn random_scalar(rng: &mut impl Rng) -> Scalar {
        let mut s = Scalar::ZERO;
        for c in &mut s.c {
            *c = rng.gen_range(0..Q);
        }
        s
    }

    #[test]
    fn inverse_degree_constant() {
        assert_eq!(INVERSE_DEGREE_MONTGOMERY, 41_978);
    }

    #[test]
    fn forward_then_inverse_is_montgomery_identity() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        for _ in 0..8 {
            let p = random_scalar(&mut rng);
            let mut t = p;
            scalar_ntt(&mut t);
            assert!(t.c.iter().all(|&c| c < Q));
            scalar_inverse_ntt(&mut t);
            assert_eq!(t, to_montgomery(&p));
        }
    }

    #[test]
    fn pointwise_product_matches_schoolbook() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
        let a = random_scalar(&mut rng);
        let b = random_scalar(&mut rng);

        // Negacyclic convolution in Z_q[X]/(X^256 + 1), the slow way.
        let mut expect = Scalar::ZERO;
        for i in 0..256 {
            for j in 0..256 {
                let v = (u64::from(a.c[i]) * u64::from(b.c[j]) % u64::from(Q)) as u32;
                let idx = (i + j) % 256;
                if i + j >= 256 {
                    expect.c[idx] = mod_sub(expect.c[idx], v);
                } else {
                    expect.c[idx] = reduce_once(expect.c[idx] + v);
                }
            }
        }

        let (mut a_hat, mut b_hat) = (a, b);
        scalar_ntt(&mut a_hat);
        scalar_ntt(&mut b_hat);
        let mut got = scalar_mult(&a_hat, &b_hat);
        scalar_inverse_ntt(&mut got);
        assert_eq!(got, expect);
    }
}
