//! The traits covering all of the crate's functionality, such that consumers
//! can utilize trait objects as desired.

use rand_core::CryptoRngCore;
#[cfg(feature = "default-rng")]
use rand_core::OsRng;

/// The `KeyGen` trait is defined to allow trait objects.
pub trait KeyGen {
    /// The public key produced by this parameter set.
    type PublicKey;
    /// The private (secret) key produced by this parameter set.
    type PrivateKey;

    /// Generates a public and private key pair using the **default OS**
    /// random number generator. Operates in constant time with respect to
    /// secret data, which specifically excludes the RNG internals, the `rho`
    /// value stored in the public key, and the rejection sampling performed
    /// on hash-derived values.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails.
    ///
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(feature = "default-rng")] {
    /// use mldsa65::traits::{KeyGen, Signer, Verifier};
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    ///
    /// let (pk, sk) = mldsa65::KG::try_keygen()?;
    /// let sig = sk.try_sign(&message, &[])?;
    /// assert!(pk.verify(&message, &sig, &[]));
    /// # }
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_keygen() -> Result<(Self::PublicKey, Self::PrivateKey), &'static str> {
        Self::try_keygen_with_rng(&mut OsRng)
    }

    /// Generates a public and private key pair using the **provided** random
    /// number generator; otherwise identical to [`KeyGen::try_keygen`].
    ///
    /// # Errors
    /// Returns an error when the random number generator fails.
    fn try_keygen_with_rng(
        rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::PublicKey, Self::PrivateKey), &'static str>;

    /// Deterministically derives a key pair from a 32-byte seed; the path
    /// exercised by known-answer tests. The caller is responsible for the
    /// quality and secrecy of the seed.
    fn keygen_from_seed(xi: &[u8; 32]) -> (Self::PublicKey, Self::PrivateKey);
}

/// The `Signer` trait is implemented for the private key struct.
pub trait Signer {
    /// The signature byte array produced by this parameter set.
    type Signature;
    /// The public key that verifies signatures from this private key.
    type PublicKey;

    /// Signs a message with a context string of at most 255 bytes, drawing
    /// the 32-byte signing randomizer from the **default OS** random number
    /// generator ("hedged" signing per FIPS 204).
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or the
    /// context is too long.
    #[cfg(feature = "default-rng")]
    fn try_sign(&self, message: &[u8], ctx: &[u8]) -> Result<Self::Signature, &'static str> {
        self.try_sign_with_rng(&mut OsRng, message, ctx)
    }

    /// Signs a message, drawing the randomizer from the **provided** random
    /// number generator; otherwise identical to [`Signer::try_sign`].
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or the
    /// context is too long.
    ///
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mldsa65::traits::{KeyGen, Signer, Verifier};
    /// use rand_chacha::rand_core::SeedableRng;
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    ///
    /// let (pk, sk) = mldsa65::KG::try_keygen_with_rng(&mut rng)?;
    /// let sig = sk.try_sign_with_rng(&mut rng, &message, &[])?;
    /// assert!(pk.verify(&message, &sig, &[]));
    /// # Ok(())}
    /// ```
    fn try_sign_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8],
    ) -> Result<Self::Signature, &'static str>;

    /// Reconstructs the corresponding public key from the private key.
    fn get_public_key(&self) -> Self::PublicKey;
}

/// The `Verifier` trait is implemented for the public key struct.
pub trait Verifier {
    /// The signature byte array accepted by this parameter set.
    type Signature;

    /// Verifies a signature over a message and context string. Runs in
    /// variable time; all inputs are public.
    fn verify(&self, message: &[u8], signature: &Self::Signature, ctx: &[u8]) -> bool;
}

/// The `SerDes` trait provides validated serialization and deserialization of
/// fixed-size elements. FIPS 204 currently requires no public-key validity
/// checks beyond exact lengths, but deserialization still returns a `Result`
/// to preserve the ability to add future checks.
pub trait SerDes {
    /// The fixed-size byte array to be serialized or deserialized.
    type ByteArray;

    /// Produces the fixed-size byte encoding of the struct.
    fn into_bytes(self) -> Self::ByteArray;

    /// Consumes a fixed-size byte encoding and performs validation.
    ///
    /// # Errors
    /// Returns an error on malformed input.
    fn try_from_bytes(ba: Self::ByteArray) -> Result<Self, &'static str>
    where
        Self: Sized;
}
