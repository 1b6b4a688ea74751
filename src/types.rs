use crate::{K, L};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A dense degree-255 polynomial over `Z_q`.
///
/// Invariant: every coefficient is strictly less than `Q`. Whether the
/// coefficients carry standard or Montgomery form is a convention of the
/// surrounding pipeline and is documented at each function boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub(crate) struct Scalar {
    pub(crate) c: [u32; 256],
}

impl Scalar {
    pub(crate) const ZERO: Self = Self { c: [0u32; 256] };
}

/// The public matrix A in NTT representation, expanded from `rho`.
pub(crate) type Mat = [[Scalar; L]; K];

/// Public key containing `rho`, `t1`, and the precomputed hash `tr` of the
/// encoded public key which accelerates repeated verification.
///
/// Implements the [`crate::traits::Verifier`] and [`crate::traits::SerDes`] traits.
#[derive(Clone)]
pub struct PublicKey {
    pub(crate) rho: [u8; 32],
    pub(crate) t1: [Scalar; K],
    pub(crate) tr: [u8; 64],
}

/// Private key containing `rho`, the signing key `k`, the precomputed public
/// key hash `tr`, and the secret vectors `s1`, `s2` and `t0`.
///
/// Implements the [`crate::traits::Signer`] and [`crate::traits::SerDes`]
/// traits. All secret material is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    pub(crate) rho: [u8; 32],
    pub(crate) k: [u8; 32],
    pub(crate) tr: [u8; 64],
    pub(crate) s1: [Scalar; L],
    pub(crate) s2: [Scalar; K],
    pub(crate) t0: [Scalar; K],
}
