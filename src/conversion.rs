//! This file implements functionality from FIPS 204 section 7.1 Conversion Between Data Types
//!
//! The pack and unpack algorithms are specialized per bit width; every width
//! used by ML-DSA-65 lands each polynomial on a byte boundary, so no packing
//! state crosses a scalar.

use crate::helpers::{ensure, mod_sub};
use crate::types::Scalar;
use crate::{ETA, K, OMEGA};

/// # Algorithm 16: `SimpleBitPack(w, b)` on page 30, specialized to 4 bits.
/// Used for the decomposed-domain commitment `w1`; inputs are below 16.
pub(crate) fn scalar_encode_4(s: &Scalar, out: &mut [u8]) {
    debug_assert_eq!(out.len(), 128, "encode_4: bad output size");
    for (byte, pair) in out.iter_mut().zip(s.c.chunks_exact(2)) {
        debug_assert!(pair[0] < 16 && pair[1] < 16, "encode_4: coefficient out of range");
        *byte = (pair[0] | (pair[1] << 4)) as u8;
    }
}

/// # Algorithm 16: `SimpleBitPack(w, b)` on page 30, specialized to 10 bits.
/// Used for `t1`; inputs are below 2^10.
pub(crate) fn scalar_encode_10(s: &Scalar, out: &mut [u8]) {
    debug_assert_eq!(out.len(), 320, "encode_10: bad output size");
    for (out5, c4) in out.chunks_exact_mut(5).zip(s.c.chunks_exact(4)) {
        let (a, b, c, d) = (c4[0], c4[1], c4[2], c4[3]);
        debug_assert!(a < 1024 && b < 1024 && c < 1024 && d < 1024, "encode_10: out of range");
        out5[0] = a as u8;
        out5[1] = ((a >> 8) | (b << 2)) as u8;
        out5[2] = ((b >> 6) | (c << 4)) as u8;
        out5[3] = ((c >> 4) | (d << 6)) as u8;
        out5[4] = (d >> 2) as u8;
    }
}

/// # Algorithm 18: `SimpleBitUnpack(v, b)` on page 31, specialized to 10 bits.
/// Cannot fail: every 10-bit pattern is a valid `t1` coefficient.
pub(crate) fn scalar_decode_10(v: &[u8]) -> Scalar {
    debug_assert_eq!(v.len(), 320, "decode_10: bad input size");
    let mut s = Scalar::ZERO;
    for (c4, in5) in s.c.chunks_exact_mut(4).zip(v.chunks_exact(5)) {
        let b: [u32; 5] = core::array::from_fn(|i| u32::from(in5[i]));
        c4[0] = b[0] | ((b[1] & 0x03) << 8);
        c4[1] = (b[1] >> 2) | ((b[2] & 0x0f) << 6);
        c4[2] = (b[2] >> 4) | ((b[3] & 0x3f) << 4);
        c4[3] = (b[3] >> 6) | (b[4] << 2);
    }
    s
}

/// # Algorithm 17: `BitPack(w, a, b)` on page 30, specialized to 4 bits with
/// offset `b = eta = 4`. Coefficients are `Z_q` encodings of `[-eta, eta]`.
pub(crate) fn scalar_encode_signed_4_4(s: &Scalar, out: &mut [u8]) {
    debug_assert_eq!(out.len(), 128, "encode_signed_4_4: bad output size");
    for (byte, pair) in out.iter_mut().zip(s.c.chunks_exact(2)) {
        let a = mod_sub(ETA, pair[0]);
        let b = mod_sub(ETA, pair[1]);
        debug_assert!(a < 16 && b < 16, "encode_signed_4_4: coefficient out of range");
        *byte = (a | (b << 4)) as u8;
    }
}

/// # Algorithm 19: `BitUnpack(v, a, b)` on page 31, specialized to 4 bits
/// with offset `b = eta = 4`.
///
/// The only bit-width decoder that can fail: nibbles of 9 or more do not
/// encode an `[-eta, eta]` value. The input comes from a parsed (public) key,
/// so the range check may short-circuit.
///
/// # Errors
/// Returns an error on any nibble of 9 or more.
pub(crate) fn scalar_decode_signed_4_4(v: &[u8]) -> Result<Scalar, &'static str> {
    debug_assert_eq!(v.len(), 128, "decode_signed_4_4: bad input size");
    let mut s = Scalar::ZERO;
    for (pair, &byte) in s.c.chunks_exact_mut(2).zip(v.iter()) {
        let lo = u32::from(byte & 0x0f);
        let hi = u32::from(byte >> 4);
        ensure!((lo <= 2 * ETA) & (hi <= 2 * ETA), "eta nibble out of range");
        pair[0] = mod_sub(ETA, lo);
        pair[1] = mod_sub(ETA, hi);
    }
    Ok(s)
}

/// # Algorithm 17: `BitPack(w, a, b)` on page 30, specialized to 13 bits with
/// offset `b = 2^12`. Used for `t0`.
pub(crate) fn scalar_encode_signed_13_12(s: &Scalar, out: &mut [u8]) {
    debug_assert_eq!(out.len(), 416, "encode_signed_13_12: bad output size");
    for (out13, c8) in out.chunks_exact_mut(13).zip(s.c.chunks_exact(8)) {
        let mut acc = 0u32;
        let mut acc_bits = 0usize;
        let mut idx = 0usize;
        for &c in c8 {
            acc |= mod_sub(1 << 12, c) << acc_bits;
            acc_bits += 13;
            while acc_bits >= 8 {
                out13[idx] = acc as u8;
                idx += 1;
                acc >>= 8;
                acc_bits -= 8;
            }
        }
        debug_assert_eq!(acc_bits, 0, "encode_signed_13_12: leftover bits");
    }
}

/// # Algorithm 19: `BitUnpack(v, a, b)` on page 31, specialized to 13 bits
/// with offset `b = 2^12`. Cannot fail: every 13-bit pattern encodes a value
/// in `(-2^12, 2^12]`.
pub(crate) fn scalar_decode_signed_13_12(v: &[u8]) -> Scalar {
    debug_assert_eq!(v.len(), 416, "decode_signed_13_12: bad input size");
    let mut s = Scalar::ZERO;
    let mut acc = 0u32;
    let mut acc_bits = 0usize;
    let mut idx = 0usize;
    for &byte in v {
        acc |= u32::from(byte) << acc_bits;
        acc_bits += 8;
        while acc_bits >= 13 {
            s.c[idx] = mod_sub(1 << 12, acc & 0x1fff);
            idx += 1;
            acc >>= 13;
            acc_bits -= 13;
        }
    }
    debug_assert_eq!(idx, 256, "decode_signed_13_12: wrong coefficient count");
    s
}

/// # Algorithm 17: `BitPack(w, a, b)` on page 30, specialized to 20 bits with
/// offset `b = 2^19 = gamma1`. Used for `z` and the expanded mask `y`.
pub(crate) fn scalar_encode_signed_20_19(s: &Scalar, out: &mut [u8]) {
    debug_assert_eq!(out.len(), 640, "encode_signed_20_19: bad output size");
    for (out10, c4) in out.chunks_exact_mut(10).zip(s.c.chunks_exact(4)) {
        let mut acc = 0u32;
        let mut acc_bits = 0usize;
        let mut idx = 0usize;
        for &c in c4 {
            acc |= mod_sub(1 << 19, c) << acc_bits;
            acc_bits += 20;
            while acc_bits >= 8 {
                out10[idx] = acc as u8;
                idx += 1;
                acc >>= 8;
                acc_bits -= 8;
            }
        }
        debug_assert_eq!(acc_bits, 0, "encode_signed_20_19: leftover bits");
    }
}

/// # Algorithm 19: `BitUnpack(v, a, b)` on page 31, specialized to 20 bits
/// with offset `b = 2^19`. Cannot fail: every 20-bit pattern encodes a value
/// in `(-2^19, 2^19]`.
pub(crate) fn scalar_decode_signed_20_19(v: &[u8]) -> Scalar {
    debug_assert_eq!(v.len(), 640, "decode_signed_20_19: bad input size");
    let mut s = Scalar::ZERO;
    let mut acc = 0u32;
    let mut acc_bits = 0usize;
    let mut idx = 0usize;
    for &byte in v {
        acc |= u32::from(byte) << acc_bits;
        acc_bits += 8;
        while acc_bits >= 20 {
            s.c[idx] = mod_sub(1 << 19, acc & 0xf_ffff);
            idx += 1;
            acc >>= 20;
            acc_bits -= 20;
        }
    }
    debug_assert_eq!(idx, 256, "decode_signed_20_19: wrong coefficient count");
    s
}

/// # Algorithm 20: `HintBitPack(h)` on page 32.
/// Sparse encoding of a 0/1 vector: the column indices of the ones, row by
/// row in ascending order, padded to `omega` bytes, followed by the running
/// one-count after each row. The signer guarantees at most `omega` ones
/// before calling; more is a programming error upstream.
pub(crate) fn hint_bit_pack(h: &[Scalar; K], out: &mut [u8]) {
    debug_assert_eq!(out.len(), OMEGA + K, "hint_bit_pack: bad output size");
    debug_assert!(
        h.iter().flat_map(|s| s.c.iter()).all(|&c| c <= 1),
        "hint_bit_pack: hint not 0/1"
    );
    out.fill(0);
    let mut index = 0;
    for (i, poly) in h.iter().enumerate() {
        for (j, &bit) in poly.c.iter().enumerate() {
            if bit != 0 {
                out[index] = j as u8;
                index += 1;
            }
        }
        out[OMEGA + i] = index as u8;
    }
}

/// # Algorithm 21: `HintBitUnpack(y)` on page 32.
/// Reverses `hint_bit_pack`, rejecting every non-canonical encoding: the
/// cumulative counts must be non-decreasing and at most `omega`, column
/// indices within a row strictly increasing, and all index bytes past the
/// final count zero.
///
/// # Errors
/// Returns an error on any malformed encoding.
pub(crate) fn hint_bit_unpack(v: &[u8]) -> Result<[Scalar; K], &'static str> {
    debug_assert_eq!(v.len(), OMEGA + K, "hint_bit_unpack: bad input size");
    let mut h = [Scalar::ZERO; K];
    let mut index = 0usize;
    for i in 0..K {
        let limit = usize::from(v[OMEGA + i]);
        ensure!((limit >= index) & (limit <= OMEGA), "hint counts malformed");
        let mut last: Option<u8> = None;
        while index < limit {
            let byte = v[index];
            if let Some(last) = last {
                ensure!(byte > last, "hint indices not ascending");
            }
            last = Some(byte);
            h[i].c[usize::from(byte)] = 1;
            index += 1;
        }
    }
    for &byte in &v[index..OMEGA] {
        ensure!(byte == 0, "hint padding not zero");
    }
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Q;
    use rand::{Rng, SeedableRng};

    fn rng() -> rand_chacha::ChaCha8Rng {
        rand_chacha::ChaCha8Rng::seed_from_u64(42)
    }

    fn random_bounded(rng: &mut impl Rng, bound: u32) -> Scalar {
        let mut s = Scalar::ZERO;
        for c in &mut s.c {
            *c = rng.gen_range(0..bound);
        }
        s
    }

    /// A scalar whose coefficients encode values of [-bound, bound] in Z_q.
    fn random_signed(rng: &mut impl Rng, bound: u32) -> Scalar {
        let mut s = Scalar::ZERO;
        for c in &mut s.c {
            let v = rng.gen_range(0..=2 * bound);
            *c = mod_sub(bound, v); // bound - v in [-bound, bound]
        }
        s
    }

    #[test]
    fn encode_4_layout() {
        let mut s = Scalar::ZERO;
        s.c[0] = 0x3;
        s.c[1] = 0xa;
        let mut out = [0u8; 128];
        scalar_encode_4(&s, &mut out);
        assert_eq!(out[0], 0xa3);
    }

    #[test]
    fn roundtrip_10() {
        let mut rng = rng();
        let s = random_bounded(&mut rng, 1 << 10);
        let mut bytes = [0u8; 320];
        scalar_encode_10(&s, &mut bytes);
        assert_eq!(scalar_decode_10(&bytes), s);
    }

    #[test]
    fn roundtrip_signed_4() {
        let mut rng = rng();
        let s = random_signed(&mut rng, 4);
        let mut bytes = [0u8; 128];
        scalar_encode_signed_4_4(&s, &mut bytes);
        assert_eq!(scalar_decode_signed_4_4(&bytes).unwrap(), s);
    }

    #[test]
    fn signed_4_rejects_bad_nibble() {
        let mut bytes = [0u8; 128];
        for nibble in 9u8..16 {
            bytes[17] = nibble;
            assert!(scalar_decode_signed_4_4(&bytes).is_err());
            bytes[17] = nibble << 4;
            assert!(scalar_decode_signed_4_4(&bytes).is_err());
        }
        bytes[17] = 0x88;
        assert!(scalar_decode_signed_4_4(&bytes).is_ok());
    }

    #[test]
    fn roundtrip_signed_13() {
        let mut rng = rng();
        // Encodings of (-2^12, 2^12]
        let mut s = Scalar::ZERO;
        for c in &mut s.c {
            let v = rng.gen_range(0..(1u32 << 13));
            *c = mod_sub(1 << 12, v);
        }
        let mut bytes = [0u8; 416];
        scalar_encode_signed_13_12(&s, &mut bytes);
        assert_eq!(scalar_decode_signed_13_12(&bytes), s);
    }

    #[test]
    fn roundtrip_signed_20() {
        let mut rng = rng();
        let mut s = Scalar::ZERO;
        for c in &mut s.c {
            let v = rng.gen_range(0..(1u32 << 20));
            *c = mod_sub(1 << 19, v);
        }
        let mut bytes = [0u8; 640];
        scalar_encode_signed_20_19(&s, &mut bytes);
        assert_eq!(scalar_decode_signed_20_19(&bytes), s);
    }

    #[test]
    fn decode_13_bytes_roundtrip() {
        // Any byte pattern is a valid 13-bit encoding; decode then encode
        // must reproduce it exactly.
        let mut rng = rng();
        let mut bytes = [0u8; 416];
        rng.fill(&mut bytes[..]);
        let s = scalar_decode_signed_13_12(&bytes);
        assert!(s.c.iter().all(|&c| c < Q));
        let mut back = [0u8; 416];
        scalar_encode_signed_13_12(&s, &mut back);
        assert_eq!(bytes, back);
    }

    fn sparse_hint(rng: &mut impl Rng, ones: usize) -> [Scalar; K] {
        let mut h = [Scalar::ZERO; K];
        let mut placed = 0;
        while placed < ones {
            let (i, j) = (rng.gen_range(0..K), rng.gen_range(0..256));
            if h[i].c[j] == 0 {
                h[i].c[j] = 1;
                placed += 1;
            }
        }
        h
    }

    #[test]
    fn hint_roundtrip() {
        let mut rng = rng();
        for ones in [0usize, 1, 17, OMEGA] {
            let h = sparse_hint(&mut rng, ones);
            let mut bytes = [0u8; OMEGA + K];
            hint_bit_pack(&h, &mut bytes);
            assert_eq!(hint_bit_unpack(&bytes).unwrap(), h);
        }
    }

    #[test]
    fn hint_unpack_rejects_malformed() {
        let mut rng = rng();
        let h = sparse_hint(&mut rng, 20);
        let mut good = [0u8; OMEGA + K];
        hint_bit_pack(&h, &mut good);

        // Cumulative count above omega.
        let mut bad = good;
        bad[OMEGA + K - 1] = OMEGA as u8 + 1;
        assert!(hint_bit_unpack(&bad).is_err());

        // Non-monotone cumulative counts.
        let mut bad = good;
        bad[OMEGA] = good[OMEGA + 1].saturating_add(1).min(OMEGA as u8);
        if bad[OMEGA] > good[OMEGA + 1] {
            assert!(hint_bit_unpack(&bad).is_err());
        }

        // Non-zero trailing index byte.
        let mut bad = good;
        let total = usize::from(good[OMEGA + K - 1]);
        if total < OMEGA {
            bad[OMEGA - 1] = 1;
            assert!(hint_bit_unpack(&bad).is_err());
        }

        // Descending indices within a row: craft directly.
        let mut bad = [0u8; OMEGA + K];
        bad[0] = 5;
        bad[1] = 5;
        for i in 0..K {
            bad[OMEGA + i] = 2;
        }
        assert!(hint_bit_unpack(&bad).is_err());
    }
}
