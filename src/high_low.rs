//! This file implements functionality from FIPS 204 section 8.4 High Order / Low Order Bits and Hints

use crate::helpers::{mod_sub, reduce_once};
use crate::types::Scalar;
use crate::{D, GAMMA2, HALF_PRIME, Q};
use subtle::{ConditionallySelectable, ConstantTimeLess};

/// # Algorithm 35: `Power2Round(r)` on page 40.
/// Decomposes `r` into `(r1, r0)` such that `r ≡ r1*2^d + r0 mod q` with
/// `r0` in `(-2^(d-1), 2^(d-1)]` represented as an element of `Z_q`.
/// Constant time; `r` is secret during key generation.
pub(crate) fn power2_round(r: u32) -> (u32, u32) {
    debug_assert!(r < Q, "power2_round: input out of range");
    let r1 = r >> D;
    let r0 = r - (r1 << D);

    // Adjust iff r0 > 2^(d-1).
    let adjust = (1u32 << (D - 1)).ct_lt(&r0);
    let r0 = u32::conditional_select(&r0, &mod_sub(r0, 1 << D), adjust);
    let r1 = u32::conditional_select(&r1, &(r1 + 1), adjust);
    (r1, r0)
}

/// Scales a previously rounded `r1` back up. Precondition: `r1 < 2^10`.
pub(crate) fn scale_power2_round(r1: u32) -> u32 {
    debug_assert!(r1 < (1 << 10), "scale_power2_round: input out of range");
    r1 << D
}

/// # Algorithm 37: `HighBits(r)` on page 40.
/// With `gamma2 = (q-1)/32` this returns a value in `[0, 15]`, computed as
/// `((ceil(x / 2^7) * (2^10 + 1) + 2^21) / 2^22) mod 2^4` per the reference
/// arithmetic. Constant time.
pub(crate) fn high_bits(x: u32) -> u32 {
    debug_assert!(x < Q, "high_bits: input out of range");
    let r1 = (x + 127) >> 7;
    let r1 = (r1 * 1025 + (1 << 21)) >> 22;
    r1 & 15
}

/// # Algorithm 36: `Decompose(r)` on page 40.
/// Splits `r` into `(r1, r0)` with `r ≡ r1*2*gamma2 + r0 mod q` and `r0`
/// centered, `|r0| <= gamma2`. Returns `r0` as a signed value. Constant time.
pub(crate) fn decompose(r: u32) -> (u32, i32) {
    let r1 = high_bits(r);
    let mut r0 = r as i32;
    r0 -= (r1 * 2 * GAMMA2) as i32;
    // Recenter into (-q/2, q/2] with a sign-mask subtract.
    r0 -= ((HALF_PRIME as i32 - r0) >> 31) & (Q as i32);
    (r1, r0)
}

/// # Algorithm 38: `LowBits(r)` on page 41.
pub(crate) fn low_bits(x: u32) -> i32 {
    let (_r1, r0) = decompose(x);
    r0
}

/// # Algorithm 39: `MakeHint(z, r)` on page 41.
/// In the standard this is called with `z = -ct0` and `r = w - cs2 + ct0`,
/// so `r + z` is just `w - cs2`; taking the three addends directly saves an
/// addition. Returns 1 iff the hint bit must be set.
pub(crate) fn make_hint(ct0: u32, cs2: u32, w: u32) -> u32 {
    let r_plus_z = mod_sub(w, cs2);
    let r = reduce_once(r_plus_z + ct0);
    u32::from(high_bits(r) != high_bits(r_plus_z))
}

/// # Algorithm 40: `UseHint(h, r)` on page 41.
/// Returns the high bits of `r` adjusted according to hint `h`. Runs only on
/// the verifier's public data, so variable time is fine.
pub(crate) fn use_hint_vartime(h: u32, r: u32) -> u32 {
    let (r1, r0) = decompose(r);
    if h != 0 {
        // m = 16, so |mod m| in the standard becomes |& 15|.
        if r0 > 0 {
            return (r1 + 1) & 15;
        }
        return r1.wrapping_sub(1) & 15;
    }
    r1
}

pub(crate) fn scalar_power2_round(s: &Scalar) -> (Scalar, Scalar) {
    let (mut s1, mut s0) = (Scalar::ZERO, Scalar::ZERO);
    for i in 0..256 {
        (s1.c[i], s0.c[i]) = power2_round(s.c[i]);
    }
    (s1, s0)
}

pub(crate) fn vector_power2_round<const X: usize>(t: &[Scalar; X]) -> ([Scalar; X], [Scalar; X]) {
    let (mut t1, mut t0) = ([Scalar::ZERO; X], [Scalar::ZERO; X]);
    for i in 0..X {
        (t1[i], t0[i]) = scalar_power2_round(&t[i]);
    }
    (t1, t0)
}

pub(crate) fn vector_scale_power2_round<const X: usize>(t1: &[Scalar; X]) -> [Scalar; X] {
    let mut out = [Scalar::ZERO; X];
    for (o, s) in out.iter_mut().zip(t1.iter()) {
        for (oc, &c) in o.c.iter_mut().zip(s.c.iter()) {
            *oc = scale_power2_round(c);
        }
    }
    out
}

pub(crate) fn vector_high_bits<const X: usize>(a: &[Scalar; X]) -> [Scalar; X] {
    let mut out = [Scalar::ZERO; X];
    for (o, s) in out.iter_mut().zip(a.iter()) {
        for (oc, &c) in o.c.iter_mut().zip(s.c.iter()) {
            *oc = high_bits(c);
        }
    }
    out
}

/// Low bits of every coefficient, stored in two's-complement form; pair with
/// `vector_max_signed`.
pub(crate) fn vector_low_bits<const X: usize>(a: &[Scalar; X]) -> [Scalar; X] {
    let mut out = [Scalar::ZERO; X];
    for (o, s) in out.iter_mut().zip(a.iter()) {
        for (oc, &c) in o.c.iter_mut().zip(s.c.iter()) {
            *oc = low_bits(c) as u32;
        }
    }
    out
}

pub(crate) fn vector_make_hint<const X: usize>(
    ct0: &[Scalar; X], cs2: &[Scalar; X], w: &[Scalar; X],
) -> [Scalar; X] {
    let mut out = [Scalar::ZERO; X];
    for i in 0..X {
        for j in 0..256 {
            out[i].c[j] = make_hint(ct0[i].c[j], cs2[i].c[j], w[i].c[j]);
        }
    }
    out
}

pub(crate) fn vector_use_hint_vartime<const X: usize>(
    h: &[Scalar; X], r: &[Scalar; X],
) -> [Scalar; X] {
    let mut out = [Scalar::ZERO; X];
    for i in 0..X {
        for j in 0..256 {
            out[i].c[j] = use_hint_vartime(h[i].c[j], r[i].c[j]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn power2_round_reassembles() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(5);
        for _ in 0..10_000 {
            let r = rng.gen_range(0..Q);
            let (r1, r0) = power2_round(r);
            assert!(r1 < (1 << 10));
            let back = reduce_once(scale_power2_round(r1) + r0) % Q;
            assert_eq!(back, r % Q);
            // r0 encodes a value in (-2^12, 2^12]
            let centered = if r0 > HALF_PRIME { r0 as i64 - i64::from(Q) } else { i64::from(r0) };
            assert!(centered > -(1 << 12) && centered <= (1 << 12));
        }
    }

    #[test]
    fn decompose_reassembles_and_centers() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(6);
        for _ in 0..10_000 {
            let r = rng.gen_range(0..Q);
            let (r1, r0) = decompose(r);
            assert!(r1 < 16);
            assert!(r0.unsigned_abs() <= GAMMA2);
            let back = (i64::from(r1) * 2 * i64::from(GAMMA2) + i64::from(r0))
                .rem_euclid(i64::from(Q));
            assert_eq!(back as u32, r);
        }
    }

    #[test]
    fn use_hint_stays_in_range() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(8);
        for _ in 0..10_000 {
            let r = rng.gen_range(0..Q);
            assert!(use_hint_vartime(0, r) < 16);
            assert!(use_hint_vartime(1, r) < 16);
        }
    }

    #[test]
    fn make_hint_flags_high_bit_changes() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(9);
        for _ in 0..10_000 {
            let w = rng.gen_range(0..Q);
            let cs2 = rng.gen_range(0..Q);
            let ct0 = rng.gen_range(0..Q);
            let r_plus_z = mod_sub(w, cs2);
            let r = reduce_once(r_plus_z + ct0);
            let expect = u32::from(high_bits(r) != high_bits(r_plus_z));
            assert_eq!(make_hint(ct0, cs2, w), expect);
        }
    }
}
