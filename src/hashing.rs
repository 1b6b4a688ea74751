//! This file implements functionality from FIPS 204 section 8.3 Hashing and Pseudorandom Sampling
//!
//! Every expansion runs a domain-separated SHAKE stream. The matrix and
//! challenge samplers are variable-time over public inputs only; the short
//! vector sampler leaks nothing beyond per-nibble acceptance, which is
//! independent of the seed by the SHAKE output model.

use crate::conversion::scalar_decode_signed_20_19;
use crate::helpers::mod_sub;
use crate::types::{Mat, Scalar};
use crate::{ETA, K, L, Q, TAU};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Shake128, Shake256};
use zeroize::Zeroize;

/// # Function H(v, d) of (8.1) on page 29.
/// Absorbs a list of byte-slice references into SHAKE-256 and returns a
/// reader for extracting extendable output.
pub(crate) fn h_xof(v: &[&[u8]]) -> impl XofReader {
    let mut hasher = Shake256::default();
    v.iter().for_each(|b| hasher.update(b));
    hasher.finalize_xof()
}

/// # Function H128(v, d) of (8.2) on page 29.
/// As `h_xof`, but SHAKE-128; used only for matrix expansion.
pub(crate) fn h128_xof(v: &[&[u8]]) -> impl XofReader {
    let mut hasher = Shake128::default();
    v.iter().for_each(|b| hasher.update(b));
    hasher.finalize_xof()
}

/// # Algorithm 30: `RejNTTPoly(rho)` on page 37.
/// Rejection-samples a uniform scalar from a SHAKE-128 stream: each 3-byte
/// group is a 23-bit little-endian candidate (top bit masked off), accepted
/// iff below `Q`. Variable time over public data.
fn scalar_from_xof_vartime(xof: &mut impl XofReader) -> Scalar {
    let mut s = Scalar::ZERO;
    let mut group = [0u8; 3];
    let mut done = 0;
    while done < 256 {
        xof.read(&mut group);
        // FIPS 204, Algorithm 14 (`CoeffFromThreeBytes`).
        let value = u32::from(group[0])
            | (u32::from(group[1]) << 8)
            | ((u32::from(group[2]) & 0x7f) << 16);
        if value < Q {
            s.c[done] = value;
            done += 1;
        }
    }
    s
}

/// # Algorithm 32: `ExpandA(rho)` on page 38.
/// Expands the public matrix A from `rho`, entry (i, j) from the seed
/// `rho || j || i`. The output is used directly in the NTT domain.
pub(crate) fn matrix_expand(a: &mut Mat, rho: &[u8; 32]) {
    for (i, row) in a.iter_mut().enumerate() {
        for (j, entry) in row.iter_mut().enumerate() {
            let mut xof = h128_xof(&[rho, &[j as u8, i as u8]]);
            *entry = scalar_from_xof_vartime(&mut xof);
        }
    }
}

/// # Algorithm 31: `RejBoundedPoly(rho)` on page 37.
/// Samples one short scalar with coefficients in `[-eta, eta]` from a
/// SHAKE-256 stream, two nibble candidates per byte, accepting nibbles below
/// nine. Rejected nibbles may be observed; accepted values may not.
fn short_scalar(sigma: &[u8; 64], index: u8) -> Scalar {
    let mut s = Scalar::ZERO;
    let mut xof = h_xof(&[sigma, &[index, 0]]);
    let mut byte = [0u8];
    let mut done = 0;
    while done < 256 {
        xof.read(&mut byte);
        // FIPS 204, Algorithm 15 (`CoeffFromHalfByte`).
        let lo = u32::from(byte[0] & 0x0f);
        let hi = u32::from(byte[0] >> 4);
        if lo < 2 * ETA + 1 {
            s.c[done] = mod_sub(ETA, lo);
            done += 1;
        }
        if done < 256 && hi < 2 * ETA + 1 {
            s.c[done] = mod_sub(ETA, hi);
            done += 1;
        }
    }
    s
}

/// # Algorithm 33: `ExpandS(rho)` on page 38.
/// Expands `s1` and `s2` from `sigma`, the per-scalar seed being `sigma`
/// followed by a 16-bit counter that runs across both vectors.
pub(crate) fn vector_expand_short(s1: &mut [Scalar; L], s2: &mut [Scalar; K], sigma: &[u8; 64]) {
    let mut index = 0u8;
    for s in s1.iter_mut() {
        *s = short_scalar(sigma, index);
        index += 1;
    }
    for s in s2.iter_mut() {
        *s = short_scalar(sigma, index);
        index += 1;
    }
}

/// # Algorithm 34: `ExpandMask(rho', kappa)` on page 38.
/// Expands the mask vector `y`: entry i is the 20-bit signed decoding of 640
/// bytes of `SHAKE-256(rho' || kappa + i)`.
pub(crate) fn vector_expand_mask(y: &mut [Scalar; L], rho_prime: &[u8; 64], kappa: usize) {
    debug_assert!(kappa + L <= 1 << 16, "expand_mask: kappa overflow");
    let mut buf = [0u8; 640];
    for (i, s) in y.iter_mut().enumerate() {
        let index = (kappa + i) as u16;
        let mut xof = h_xof(&[rho_prime, &index.to_le_bytes()]);
        xof.read(&mut buf);
        *s = scalar_decode_signed_20_19(&buf);
    }
    buf.zeroize();
}

/// # Algorithm 29: `SampleInBall(rho)` on page 36.
/// Samples the challenge: a polynomial with exactly `tau` coefficients in
/// `{-1, 1}` placed by a Fisher-Yates shuffle driven by a SHAKE-256 stream
/// over the commitment hash. The byte-rejection stream and access pattern
/// are public by design rationale, so variable time is fine.
pub(crate) fn scalar_sample_in_ball_vartime(seed: &[u8]) -> Scalar {
    let mut xof = h_xof(&[seed]);
    let mut sign_bytes = [0u8; 8];
    xof.read(&mut sign_bytes);
    let mut signs = u64::from_le_bytes(sign_bytes);

    let mut c = Scalar::ZERO;
    let mut byte = [0u8];
    for i in (256 - TAU)..256 {
        let j = loop {
            xof.read(&mut byte);
            if usize::from(byte[0]) <= i {
                break usize::from(byte[0]);
            }
        };
        c.c[i] = c.c[j];
        c.c[j] = mod_sub(1, 2 * (signs as u32 & 1));
        signs >>= 1;
    }
    c
}
