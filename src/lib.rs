#![no_std]
#![deny(unsafe_code, missing_docs)]
#![doc = include_str!("../README.md")]

// Implements the ML-DSA-65 parameter set of FIPS 204, the Module-Lattice-Based
// Digital Signature Standard.
// See <https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.204.pdf>

// Functionality map per FIPS 204
//
// Algorithm 1 ML-DSA.KeyGen() on page 17                   --> lib.rs
// Algorithm 2 ML-DSA.Sign(sk,M,ctx) on page 18             --> lib.rs
// Algorithm 3 ML-DSA.Verify(pk,M,s,ctx) on page 18         --> lib.rs
// Algorithm 6 ML-DSA.KeyGen_internal(x) on page 23         --> ml_dsa.rs
// Algorithm 7 ML-DSA.Sign_internal(sk,M',rnd) on page 25   --> ml_dsa.rs
// Algorithm 8 ML-DSA.Verify_internal(pk,M',s) on page 27   --> ml_dsa.rs
// Algorithm 14 CoefFromThreeBytes(b0,b1,b2) on page 29     --> hashing.rs (inlined)
// Algorithm 15 CoefFromHalfByte(b) on page 30              --> hashing.rs (inlined)
// Algorithms 16-19 Simple/BitPack/Unpack on pages 30-31    --> conversion.rs, per bit width
// Algorithm 20 HintBitPack(h) on page 32                   --> conversion.rs
// Algorithm 21 HintBitUnpack(y) on page 32                 --> conversion.rs
// Algorithm 22 pkEncode(rho,t1) on page 33                 --> encodings.rs
// Algorithm 23 pkDecode(pk) on page 33                     --> encodings.rs
// Algorithm 24 skEncode(rho,K,tr,s1,s2,t0) on page 34      --> encodings.rs
// Algorithm 25 skDecode(sk) on page 34                     --> encodings.rs
// Algorithm 26 sigEncode(c~,z,h) on page 35                --> encodings.rs
// Algorithm 27 sigDecode(sigma) on page 35                 --> encodings.rs
// Algorithm 28 w1Encode(w1) on page 35                     --> encodings.rs
// Algorithm 29 SampleInBall(rho) on page 36                --> hashing.rs
// Algorithm 30 RejNTTPoly(rho) on page 37                  --> hashing.rs
// Algorithm 31 RejBoundedPoly(rho) on page 37              --> hashing.rs
// Algorithm 32 ExpandA(rho) on page 38                     --> hashing.rs
// Algorithm 33 ExpandS(rho) on page 38                     --> hashing.rs
// Algorithm 34 ExpandMask(rho,mu) on page 38               --> hashing.rs
// Algorithm 35 Power2Round(r) on page 40                   --> high_low.rs
// Algorithm 36 Decompose(r) on page 40                     --> high_low.rs
// Algorithm 37 HighBits(r) on page 40                      --> high_low.rs
// Algorithm 38 LowBits(r) on page 41                       --> high_low.rs
// Algorithm 39 MakeHint(z,r) on page 41                    --> high_low.rs
// Algorithm 40 UseHint(h,r) on page 41                     --> high_low.rs
// Algorithm 41 NTT(w) on page 43                           --> ntt.rs
// Algorithm 42 NTT-1(w^) on page 44                        --> ntt.rs
// Algorithm 43 BitRev8(m) on page 44                       --> helpers.rs root table
// Algorithms 44-48 NTT-domain arithmetic on pages 45-46    --> helpers.rs
// Algorithm 49 MontgomeryReduce(a) on page 50              --> helpers.rs

// Note that debug_assert! statements enforce correct program construction
// and are never part of the operational dataflow. The ensure! statements
// implement conservative dataflow validation and do not panic.

extern crate alloc;

/// The `rand_core` types are re-exported so that users of this crate do not
/// have to worry about using the exact correct version of `rand_core`.
pub use rand_core::{CryptoRng, Error as RngError, RngCore};

mod conversion;
mod encodings;
mod hashing;
mod helpers;
mod high_low;
mod ml_dsa;
mod ntt;
mod types;

/// All functionality is covered by traits, such that consumers can utilize trait objects as desired.
pub mod traits;
pub use crate::types::{PrivateKey, PublicKey};

use crate::traits::{KeyGen, SerDes, Signer, Verifier};
use rand_core::CryptoRngCore;
use sha3::digest::XofReader;
use zeroize::Zeroize;

// The ML-DSA-65 signing prime and friends; see FIPS 204 page 15 table 1.
const Q: u32 = 8_380_417; // 2^23 - 2^13 + 1
const HALF_PRIME: u32 = (Q - 1) / 2;
const ZETA: u32 = 1753;
const D: u32 = 13;

// The remaining parameters fix the ML-DSA-65 (security category 3) set;
// see FIPS 204 page 16 table 2.
const K: usize = 6;
const L: usize = 5;
const ETA: u32 = 4;
const TAU: usize = 49;
const LAMBDA: usize = 192;
const GAMMA1: u32 = 1 << 19;
const GAMMA2: u32 = (Q - 1) / 32;
const BETA: u32 = TAU as u32 * ETA;
const OMEGA: usize = 55;
const CTILDE_LEN: usize = 2 * LAMBDA / 8;
const W1_LEN: usize = 32 * K * 4;

/// Seed length in bytes for deterministic key generation.
pub const SEED_LEN: usize = 32;
/// Public key length in bytes.
pub const PK_LEN: usize = 1952;
/// Private (secret) key length in bytes.
pub const SK_LEN: usize = 4032;
/// Signature length in bytes.
pub const SIG_LEN: usize = 3309;

/// Empty struct to enable [`traits::KeyGen`] trait objects.
pub struct KG;

/// # Algorithm 1: `ML-DSA.KeyGen()` on page 17.
/// Generates a public and private key pair using the default OS random
/// number generator. See [`traits::KeyGen::try_keygen`].
///
/// # Errors
/// Returns an error if the random number generator fails.
///
/// # Examples
/// ```rust
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// # #[cfg(feature = "default-rng")] {
/// use mldsa65::traits::{SerDes, Signer, Verifier};
///
/// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
///
/// let (pk, sk) = mldsa65::try_keygen()?;
/// let sig = sk.try_sign(&message, &[0])?;
/// assert!(pk.verify(&message, &sig, &[0]));
/// # }
/// # Ok(())}
/// ```
#[cfg(feature = "default-rng")]
pub fn try_keygen() -> Result<(PublicKey, PrivateKey), &'static str> {
    KG::try_keygen()
}

/// # Algorithm 1: `ML-DSA.KeyGen()` on page 17.
/// Generates a public and private key pair using the provided random number
/// generator. See [`traits::KeyGen::try_keygen_with_rng`].
///
/// # Errors
/// Returns an error if the random number generator fails.
pub fn try_keygen_with_rng(
    rng: &mut impl CryptoRngCore,
) -> Result<(PublicKey, PrivateKey), &'static str> {
    KG::try_keygen_with_rng(rng)
}

/// # Algorithm 6: `ML-DSA.KeyGen_internal(xi)` on page 23.
/// Deterministically derives a key pair from a 32-byte seed; the same seed
/// always yields the same encoded keys. See [`traits::KeyGen::keygen_from_seed`].
#[must_use]
pub fn keygen_from_seed(xi: &[u8; SEED_LEN]) -> (PublicKey, PrivateKey) {
    KG::keygen_from_seed(xi)
}

impl KeyGen for KG {
    type PrivateKey = PrivateKey;
    type PublicKey = PublicKey;

    fn try_keygen_with_rng(
        rng: &mut impl CryptoRngCore,
    ) -> Result<(PublicKey, PrivateKey), &'static str> {
        let mut xi = [0u8; SEED_LEN];
        rng.try_fill_bytes(&mut xi).map_err(|_| "KeyGen: random number generator failed")?;
        let (pk, sk) = ml_dsa::key_gen_internal(&xi);
        xi.zeroize();
        Ok((pk, sk))
    }

    fn keygen_from_seed(xi: &[u8; 32]) -> (PublicKey, PrivateKey) {
        ml_dsa::key_gen_internal(xi)
    }
}

impl Signer for PrivateKey {
    type PublicKey = PublicKey;
    type Signature = [u8; SIG_LEN];

    /// # Algorithm 2: `ML-DSA.Sign(sk, M, ctx)` on page 18.
    /// The 2-byte domain prefix `{0, |ctx|}` is prepended to the context
    /// inside `sign_internal`; the randomizer is drawn from the RNG.
    fn try_sign_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8],
    ) -> Result<Self::Signature, &'static str> {
        helpers::ensure!(ctx.len() < 256, "ML-DSA.Sign: ctx too long");
        let mut rnd = [0u8; 32];
        rng.try_fill_bytes(&mut rnd).map_err(|_| "ML-DSA.Sign: random number generator failed")?;
        let sig = ml_dsa::sign_internal(self, message, ctx, &rnd);
        rnd.zeroize();
        sig
    }

    fn get_public_key(&self) -> PublicKey {
        ml_dsa::public_from_private(self)
    }
}

impl Verifier for PublicKey {
    type Signature = [u8; SIG_LEN];

    /// # Algorithm 3: `ML-DSA.Verify(pk, M, sigma, ctx)` on page 18.
    fn verify(&self, message: &[u8], signature: &Self::Signature, ctx: &[u8]) -> bool {
        if ctx.len() > 255 {
            return false;
        }
        ml_dsa::verify_internal(self, message, signature, ctx)
    }
}

impl SerDes for PublicKey {
    type ByteArray = [u8; PK_LEN];

    fn try_from_bytes(pk: Self::ByteArray) -> Result<Self, &'static str> {
        let (rho, t1) = encodings::pk_decode(&pk);
        // Cache tr over the encoded key for verification.
        let mut tr = [0u8; 64];
        hashing::h_xof(&[&pk]).read(&mut tr);
        Ok(PublicKey { rho, t1, tr })
    }

    fn into_bytes(self) -> Self::ByteArray {
        encodings::pk_encode(&self.rho, &self.t1)
    }
}

impl SerDes for PrivateKey {
    type ByteArray = [u8; SK_LEN];

    fn try_from_bytes(sk: Self::ByteArray) -> Result<Self, &'static str> {
        encodings::sk_decode(&sk)
    }

    fn into_bytes(self) -> Self::ByteArray {
        encodings::sk_encode(&self)
    }
}
