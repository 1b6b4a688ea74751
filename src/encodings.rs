//! This file implements functionality from FIPS 204 section 8.2 Encodings of ML-DSA Keys and Signatures

use crate::conversion::{
    hint_bit_pack, hint_bit_unpack, scalar_decode_10, scalar_decode_signed_13_12,
    scalar_decode_signed_20_19, scalar_decode_signed_4_4, scalar_encode_10, scalar_encode_4,
    scalar_encode_signed_13_12, scalar_encode_signed_20_19, scalar_encode_signed_4_4,
};
use crate::types::{PrivateKey, Scalar};
use crate::{CTILDE_LEN, K, L, PK_LEN, SIG_LEN, SK_LEN, W1_LEN};

// Public key: rho || pack(t1, 10)
const PK_T1_OFFSET: usize = 32;
// Private key: rho || k || tr || pack_signed(s1, 4) || pack_signed(s2, 4) || pack_signed(t0, 13)
const SK_S1_OFFSET: usize = 128;
const SK_S2_OFFSET: usize = SK_S1_OFFSET + L * 128;
const SK_T0_OFFSET: usize = SK_S2_OFFSET + K * 128;
// Signature: c_tilde || pack_signed(z, 20) || hint
const SIG_Z_OFFSET: usize = CTILDE_LEN;
const SIG_HINT_OFFSET: usize = SIG_Z_OFFSET + L * 640;

/// # Algorithm 22: `pkEncode(rho, t1)` on page 33.
pub(crate) fn pk_encode(rho: &[u8; 32], t1: &[Scalar; K]) -> [u8; PK_LEN] {
    let mut pk = [0u8; PK_LEN];
    pk[..32].copy_from_slice(rho);
    for (i, s) in t1.iter().enumerate() {
        scalar_encode_10(s, &mut pk[PK_T1_OFFSET + i * 320..PK_T1_OFFSET + (i + 1) * 320]);
    }
    pk
}

/// # Algorithm 23: `pkDecode(pk)` on page 33.
/// Cannot fail beyond the length fixed by the type: every 10-bit pattern is
/// a valid `t1` coefficient.
pub(crate) fn pk_decode(pk: &[u8; PK_LEN]) -> ([u8; 32], [Scalar; K]) {
    let mut rho = [0u8; 32];
    rho.copy_from_slice(&pk[..32]);
    let t1 = core::array::from_fn(|i| {
        scalar_decode_10(&pk[PK_T1_OFFSET + i * 320..PK_T1_OFFSET + (i + 1) * 320])
    });
    (rho, t1)
}

/// # Algorithm 24: `skEncode(rho, K, tr, s1, s2, t0)` on page 34.
pub(crate) fn sk_encode(sk: &PrivateKey) -> [u8; SK_LEN] {
    let mut out = [0u8; SK_LEN];
    out[..32].copy_from_slice(&sk.rho);
    out[32..64].copy_from_slice(&sk.k);
    out[64..128].copy_from_slice(&sk.tr);
    for (i, s) in sk.s1.iter().enumerate() {
        scalar_encode_signed_4_4(s, &mut out[SK_S1_OFFSET + i * 128..SK_S1_OFFSET + (i + 1) * 128]);
    }
    for (i, s) in sk.s2.iter().enumerate() {
        scalar_encode_signed_4_4(s, &mut out[SK_S2_OFFSET + i * 128..SK_S2_OFFSET + (i + 1) * 128]);
    }
    for (i, s) in sk.t0.iter().enumerate() {
        scalar_encode_signed_13_12(
            s,
            &mut out[SK_T0_OFFSET + i * 416..SK_T0_OFFSET + (i + 1) * 416],
        );
    }
    out
}

/// # Algorithm 25: `skDecode(sk)` on page 34.
/// Parses untrusted input; the eta decodings of `s1` and `s2` are the only
/// fallible fields.
///
/// # Errors
/// Returns an error on any out-of-range eta nibble.
pub(crate) fn sk_decode(bytes: &[u8; SK_LEN]) -> Result<PrivateKey, &'static str> {
    let mut sk = PrivateKey {
        rho: [0u8; 32],
        k: [0u8; 32],
        tr: [0u8; 64],
        s1: [Scalar::ZERO; L],
        s2: [Scalar::ZERO; K],
        t0: [Scalar::ZERO; K],
    };
    sk.rho.copy_from_slice(&bytes[..32]);
    sk.k.copy_from_slice(&bytes[32..64]);
    sk.tr.copy_from_slice(&bytes[64..128]);
    for (i, s) in sk.s1.iter_mut().enumerate() {
        *s = scalar_decode_signed_4_4(
            &bytes[SK_S1_OFFSET + i * 128..SK_S1_OFFSET + (i + 1) * 128],
        )?;
    }
    for (i, s) in sk.s2.iter_mut().enumerate() {
        *s = scalar_decode_signed_4_4(
            &bytes[SK_S2_OFFSET + i * 128..SK_S2_OFFSET + (i + 1) * 128],
        )?;
    }
    for (i, s) in sk.t0.iter_mut().enumerate() {
        *s = scalar_decode_signed_13_12(
            &bytes[SK_T0_OFFSET + i * 416..SK_T0_OFFSET + (i + 1) * 416],
        );
    }
    Ok(sk)
}

/// # Algorithm 26: `sigEncode(c_tilde, z, h)` on page 35.
/// Only called by the signer on values that already passed the bound checks.
pub(crate) fn sig_encode(
    c_tilde: &[u8; CTILDE_LEN], z: &[Scalar; L], h: &[Scalar; K],
) -> [u8; SIG_LEN] {
    let mut sigma = [0u8; SIG_LEN];
    sigma[..CTILDE_LEN].copy_from_slice(c_tilde);
    for (i, s) in z.iter().enumerate() {
        scalar_encode_signed_20_19(
            s,
            &mut sigma[SIG_Z_OFFSET + i * 640..SIG_Z_OFFSET + (i + 1) * 640],
        );
    }
    hint_bit_pack(h, &mut sigma[SIG_HINT_OFFSET..]);
    sigma
}

/// # Algorithm 27: `sigDecode(sigma)` on page 35.
/// Parses untrusted input; only the hint encoding can be malformed.
///
/// # Errors
/// Returns an error on a malformed hint.
#[allow(clippy::type_complexity)]
pub(crate) fn sig_decode(
    sigma: &[u8; SIG_LEN],
) -> Result<([u8; CTILDE_LEN], [Scalar; L], [Scalar; K]), &'static str> {
    let mut c_tilde = [0u8; CTILDE_LEN];
    c_tilde.copy_from_slice(&sigma[..CTILDE_LEN]);
    let z = core::array::from_fn(|i| {
        scalar_decode_signed_20_19(&sigma[SIG_Z_OFFSET + i * 640..SIG_Z_OFFSET + (i + 1) * 640])
    });
    let h = hint_bit_unpack(&sigma[SIG_HINT_OFFSET..])?;
    Ok((c_tilde, z, h))
}

/// # Algorithm 28: `w1Encode(w1)` on page 35.
pub(crate) fn w1_encode(w1: &[Scalar; K], out: &mut [u8; W1_LEN]) {
    for (i, s) in w1.iter().enumerate() {
        scalar_encode_4(s, &mut out[i * 128..(i + 1) * 128]);
    }
}
