//! This file implements the internal protocol functions of FIPS 204:
//! Algorithm 6 `ML-DSA.KeyGen_internal`, Algorithm 7 `ML-DSA.Sign_internal`
//! and Algorithm 8 `ML-DSA.Verify_internal`.
//!
//! Each entry point gathers its large intermediates (the matrix A plus
//! several K- and L-vectors, on the order of 50 KB) into one heap-allocated
//! working struct so stack use stays bounded on constrained targets. The
//! secret-bearing structs are zeroized on drop.

use crate::encodings::{pk_encode, sig_decode, sig_encode, w1_encode};
use crate::hashing::{
    h_xof, matrix_expand, scalar_sample_in_ball_vartime, vector_expand_mask, vector_expand_short,
};
use crate::helpers::{
    matrix_mult, vector_add, vector_count_ones, vector_max, vector_max_signed,
    vector_mult_scalar, vector_sub,
};
use crate::high_low::{
    vector_high_bits, vector_low_bits, vector_make_hint, vector_power2_round,
    vector_scale_power2_round, vector_use_hint_vartime,
};
use crate::ntt::{scalar_ntt, vector_inverse_ntt, vector_ntt};
use crate::types::{Mat, PrivateKey, PublicKey, Scalar};
use crate::{BETA, CTILDE_LEN, GAMMA1, GAMMA2, K, L, OMEGA, SIG_LEN, W1_LEN};
use alloc::boxed::Box;
use sha3::digest::XofReader;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Zeroize, ZeroizeOnDrop)]
struct KeyGenScratch {
    a_ntt: Mat,
    s1_ntt: [Scalar; L],
    t: [Scalar; K],
}

impl KeyGenScratch {
    fn new() -> Box<Self> {
        Box::new(Self {
            a_ntt: [[Scalar::ZERO; L]; K],
            s1_ntt: [Scalar::ZERO; L],
            t: [Scalar::ZERO; K],
        })
    }
}

/// # Algorithm 6: `ML-DSA.KeyGen_internal(xi)` on page 23.
/// Deterministically derives a key pair from the 32-byte seed. The seed is
/// augmented with the parameter-set bytes {K, L} before expansion, which is
/// protocol-observable and required for interoperability.
pub(crate) fn key_gen_internal(xi: &[u8; 32]) -> (PublicKey, PrivateKey) {
    let mut augmented = [0u8; 34];
    augmented[..32].copy_from_slice(xi);
    augmented[32] = K as u8;
    augmented[33] = L as u8;

    // (rho, sigma, k) <- H(xi || K || L, 128)
    let mut expanded = [0u8; 128];
    h_xof(&[&augmented]).read(&mut expanded);
    augmented.zeroize();
    let mut rho = [0u8; 32];
    rho.copy_from_slice(&expanded[..32]); // rho is public
    let mut sigma = [0u8; 64];
    sigma.copy_from_slice(&expanded[32..96]);

    let mut sk = PrivateKey {
        rho,
        k: [0u8; 32],
        tr: [0u8; 64],
        s1: [Scalar::ZERO; L],
        s2: [Scalar::ZERO; K],
        t0: [Scalar::ZERO; K],
    };
    sk.k.copy_from_slice(&expanded[96..]);
    expanded.zeroize();

    let mut scratch = KeyGenScratch::new();
    matrix_expand(&mut scratch.a_ntt, &rho);
    vector_expand_short(&mut sk.s1, &mut sk.s2, &sigma);
    sigma.zeroize();

    // t = NTT^-1(A_hat o NTT(s1)) + s2
    scratch.s1_ntt = sk.s1;
    vector_ntt(&mut scratch.s1_ntt);
    scratch.t = matrix_mult(&scratch.a_ntt, &scratch.s1_ntt);
    vector_inverse_ntt(&mut scratch.t);
    scratch.t = vector_add(&scratch.t, &sk.s2);

    let (t1, t0) = vector_power2_round(&scratch.t);
    sk.t0 = t0;

    // t1 is public; hash the encoded public key into the cached tr.
    let mut pk = PublicKey { rho, t1, tr: [0u8; 64] };
    let pk_bytes = pk_encode(&pk.rho, &pk.t1);
    h_xof(&[&pk_bytes]).read(&mut pk.tr);
    sk.tr = pk.tr;

    (pk, sk)
}

/// Reconstructs the public key from a private key by recomputing
/// `t = A*s1 + s2` and dropping the low bits.
pub(crate) fn public_from_private(sk: &PrivateKey) -> PublicKey {
    let mut scratch = KeyGenScratch::new();
    matrix_expand(&mut scratch.a_ntt, &sk.rho);
    scratch.s1_ntt = sk.s1;
    vector_ntt(&mut scratch.s1_ntt);
    scratch.t = matrix_mult(&scratch.a_ntt, &scratch.s1_ntt);
    vector_inverse_ntt(&mut scratch.t);
    scratch.t = vector_add(&scratch.t, &sk.s2);
    let (t1, _t0) = vector_power2_round(&scratch.t);
    PublicKey { rho: sk.rho, t1, tr: sk.tr }
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct SignScratch {
    a_ntt: Mat,
    s1_ntt: [Scalar; L],
    s2_ntt: [Scalar; K],
    t0_ntt: [Scalar; K],
    y: [Scalar; L],
    w: [Scalar; K],
    // Also holds r0 and then ct0 after the commitment hash is taken.
    w1: [Scalar; K],
    cs1: [Scalar; L],
    cs2: [Scalar; K],
    z: [Scalar; L],
    h: [Scalar; K],
}

impl SignScratch {
    fn new() -> Box<Self> {
        Box::new(Self {
            a_ntt: [[Scalar::ZERO; L]; K],
            s1_ntt: [Scalar::ZERO; L],
            s2_ntt: [Scalar::ZERO; K],
            t0_ntt: [Scalar::ZERO; K],
            y: [Scalar::ZERO; L],
            w: [Scalar::ZERO; K],
            w1: [Scalar::ZERO; K],
            cs1: [Scalar::ZERO; L],
            cs2: [Scalar::ZERO; K],
            z: [Scalar::ZERO; L],
            h: [Scalar::ZERO; K],
        })
    }
}

/// # Algorithm 7: `ML-DSA.Sign_internal(sk, M', rnd)` on page 25.
/// The rejection-sampling loop. Each rejection leaks only the fact of the
/// rejection (and which pair of bound checks fired), which FIPS 204 accepts;
/// the rejected values themselves are never disclosed.
///
/// # Errors
/// Returns an error if the rejection counter exhausts its 16-bit domain,
/// which has negligible probability with an honest seed.
pub(crate) fn sign_internal(
    sk: &PrivateKey, message: &[u8], ctx: &[u8], rnd: &[u8; 32],
) -> Result<[u8; SIG_LEN], &'static str> {
    debug_assert!(ctx.len() < 256, "sign_internal: ctx too long");
    let ctx_prefix = [0u8, ctx.len() as u8];

    // mu <- H(tr || M', 64) with M' = prefix || ctx || message
    let mut mu = [0u8; 64];
    h_xof(&[&sk.tr, &ctx_prefix, ctx, message]).read(&mut mu);

    // rho' <- H(K || rnd || mu, 64), the per-signature mask seed
    let mut rho_prime = [0u8; 64];
    h_xof(&[&sk.k, rnd, &mu]).read(&mut rho_prime);

    let mut scratch = SignScratch::new();
    scratch.s1_ntt = sk.s1;
    vector_ntt(&mut scratch.s1_ntt);
    scratch.s2_ntt = sk.s2;
    vector_ntt(&mut scratch.s2_ntt);
    scratch.t0_ntt = sk.t0;
    vector_ntt(&mut scratch.t0_ntt);
    matrix_expand(&mut scratch.a_ntt, &sk.rho);

    let mut kappa = 0usize;
    loop {
        // kappa must not exceed 2^16 / L iterations; the probability of
        // getting anywhere near is vanishingly small.
        if kappa + L > 1 << 16 {
            rho_prime.zeroize();
            return Err("signing rejection limit exceeded");
        }

        vector_expand_mask(&mut scratch.y, &rho_prime, kappa);
        kappa += L;

        // w = NTT^-1(A_hat o NTT(y)); y_ntt borrows the cs1 slot.
        scratch.cs1 = scratch.y;
        vector_ntt(&mut scratch.cs1);
        scratch.w = matrix_mult(&scratch.a_ntt, &scratch.cs1);
        vector_inverse_ntt(&mut scratch.w);

        // Commitment hash over the encoded high bits.
        scratch.w1 = vector_high_bits(&scratch.w);
        let mut w1_encoded = [0u8; W1_LEN];
        w1_encode(&scratch.w1, &mut w1_encoded);
        let mut c_tilde = [0u8; CTILDE_LEN];
        h_xof(&[&mu, &w1_encoded]).read(&mut c_tilde);

        let mut c_ntt = scalar_sample_in_ball_vartime(&c_tilde);
        scalar_ntt(&mut c_ntt);

        scratch.cs1 = vector_mult_scalar(&scratch.s1_ntt, &c_ntt);
        vector_inverse_ntt(&mut scratch.cs1);
        scratch.cs2 = vector_mult_scalar(&scratch.s2_ntt, &c_ntt);
        vector_inverse_ntt(&mut scratch.cs2);

        scratch.z = vector_add(&scratch.y, &scratch.cs1);

        // r0 = LowBits(w - cs2), reusing the w1 slot.
        scratch.w1 = vector_low_bits(&vector_sub(&scratch.w, &scratch.cs2));

        let z_max = vector_max(&scratch.z);
        let r0_max = vector_max_signed(&scratch.w1);
        if (z_max >= GAMMA1 - BETA) | (r0_max >= GAMMA2 - BETA) {
            continue;
        }

        // ct0 = NTT^-1(t0_hat o c_hat), reusing the w1 slot again.
        scratch.w1 = vector_mult_scalar(&scratch.t0_ntt, &c_ntt);
        vector_inverse_ntt(&mut scratch.w1);
        scratch.h = vector_make_hint(&scratch.w1, &scratch.cs2, &scratch.w);

        let ct0_max = vector_max(&scratch.w1);
        let ones = vector_count_ones(&scratch.h);
        if (ct0_max >= GAMMA2) | (ones > OMEGA) {
            continue;
        }

        // Although derived from the private key, the signature is public.
        rho_prime.zeroize();
        return Ok(sig_encode(&c_tilde, &scratch.z, &scratch.h));
    }
}

struct VerifyScratch {
    a_ntt: Mat,
    z_ntt: [Scalar; L],
    // Becomes w1' after the hint is applied.
    az_ntt: [Scalar; K],
    ct1_ntt: [Scalar; K],
}

impl VerifyScratch {
    fn new() -> Box<Self> {
        Box::new(Self {
            a_ntt: [[Scalar::ZERO; L]; K],
            z_ntt: [Scalar::ZERO; L],
            az_ntt: [Scalar::ZERO; K],
            ct1_ntt: [Scalar::ZERO; K],
        })
    }
}

/// # Algorithm 8: `ML-DSA.Verify_internal(pk, M', sigma)` on page 27.
/// All inputs are public, so variable time throughout is fine. Any parse
/// failure of the signature rejects.
pub(crate) fn verify_internal(
    pk: &PublicKey, message: &[u8], sig: &[u8; SIG_LEN], ctx: &[u8],
) -> bool {
    debug_assert!(ctx.len() < 256, "verify_internal: ctx too long");
    let Ok((c_tilde, z, h)) = sig_decode(sig) else {
        return false;
    };

    let mut scratch = VerifyScratch::new();
    matrix_expand(&mut scratch.a_ntt, &pk.rho);

    let ctx_prefix = [0u8, ctx.len() as u8];
    let mut mu = [0u8; 64];
    h_xof(&[&pk.tr, &ctx_prefix, ctx, message]).read(&mut mu);

    let mut c_ntt = scalar_sample_in_ball_vartime(&c_tilde);
    scalar_ntt(&mut c_ntt);

    // w' = NTT^-1(A_hat o NTT(z) - c_hat o NTT(t1 * 2^d))
    scratch.z_ntt = z;
    vector_ntt(&mut scratch.z_ntt);
    scratch.az_ntt = matrix_mult(&scratch.a_ntt, &scratch.z_ntt);
    scratch.ct1_ntt = vector_scale_power2_round(&pk.t1);
    vector_ntt(&mut scratch.ct1_ntt);
    scratch.ct1_ntt = vector_mult_scalar(&scratch.ct1_ntt, &c_ntt);
    scratch.az_ntt = vector_sub(&scratch.az_ntt, &scratch.ct1_ntt);
    vector_inverse_ntt(&mut scratch.az_ntt);

    // w1' = UseHint(h, w'), then recompute the commitment hash.
    scratch.az_ntt = vector_use_hint_vartime(&h, &scratch.az_ntt);
    let mut w1_encoded = [0u8; W1_LEN];
    w1_encode(&scratch.az_ntt, &mut w1_encoded);
    let mut c_tilde_computed = [0u8; CTILDE_LEN];
    h_xof(&[&mu, &w1_encoded]).read(&mut c_tilde_computed);

    let z_max = vector_max(&z);
    (z_max < GAMMA1 - BETA) && (c_tilde_computed == c_tilde)
}
