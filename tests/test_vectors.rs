// Applies official ML-DSA-65 vectors when they are present in
// `tests/test_vectors/`. The vector files are not redistributed with the
// crate; each test is a no-op when its file is missing. Expected file
// contents are hex fields in the form used below, extracted from the NIST
// ACVP vector sets for the external (context-carrying) interface.

use hex::decode;
use mldsa65::traits::{KeyGen, SerDes, Signer, Verifier};
use mldsa65::KG;
use rand_core::{CryptoRng, RngCore};
use regex::Regex;
use std::fs;

// ----- CUSTOM RNG TO REPLAY VALUES -----

struct MyRng {
    data: Vec<Vec<u8>>,
}

impl RngCore for MyRng {
    fn next_u32(&mut self) -> u32 {
        unimplemented!()
    }

    fn next_u64(&mut self) -> u64 {
        unimplemented!()
    }

    fn fill_bytes(&mut self, out: &mut [u8]) {
        let x = self.data.pop().expect("test rng problem");
        out.copy_from_slice(&x)
    }

    fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(out);
        Ok(())
    }
}

impl CryptoRng for MyRng {}

impl MyRng {
    fn new() -> Self {
        MyRng { data: Vec::new() }
    }

    fn push(&mut self, new_data: &[u8]) {
        self.data.push(new_data.to_vec());
    }
}

// ----- EXTRACT I/O VALUES FROM OFFICIAL VECTORS -----

fn get_field(data: &str, name: &str) -> Vec<u8> {
    let re = Regex::new(&format!(r"{name}: ([0-9a-fA-F]*)")).unwrap();
    decode(re.captures(data).unwrap().get(1).unwrap().as_str()).unwrap()
}

// ----- TEST KEYGEN, SIGN AND VERIFY -----

#[test]
fn test_keygen_vector() {
    let Ok(data) = fs::read_to_string("./tests/test_vectors/Key Generation -- ML-DSA-65.txt")
    else {
        return;
    };
    let seed = get_field(&data, "seed");
    let pk_exp = get_field(&data, "pk");
    let sk_exp = get_field(&data, "sk");

    let (pk_act, sk_act) = KG::keygen_from_seed(&seed.try_into().unwrap());
    assert_eq!(pk_exp, pk_act.into_bytes());
    assert_eq!(sk_exp, sk_act.into_bytes());
}

#[test]
fn test_sign_vector() {
    let Ok(data) = fs::read_to_string("./tests/test_vectors/Signature Generation -- ML-DSA-65.txt")
    else {
        return;
    };
    let msg = get_field(&data, "message");
    let ctx = get_field(&data, "context");
    let sk = get_field(&data, "sk");
    let rnd = get_field(&data, "rnd");
    let sig_exp = get_field(&data, "signature");

    let sk = mldsa65::PrivateKey::try_from_bytes(sk.try_into().unwrap()).unwrap();
    let mut rng = MyRng::new();
    rng.push(&rnd);
    let sig_act = sk.try_sign_with_rng(&mut rng, &msg, &ctx).unwrap();
    assert_eq!(sig_exp, sig_act);
}

#[test]
fn test_verify_vector() {
    let Ok(data) =
        fs::read_to_string("./tests/test_vectors/Signature Verification -- ML-DSA-65.txt")
    else {
        return;
    };
    let msg = get_field(&data, "message");
    let ctx = get_field(&data, "context");
    let pk = get_field(&data, "pk");
    let sig = get_field(&data, "signature");

    let pk = mldsa65::PublicKey::try_from_bytes(pk.try_into().unwrap()).unwrap();
    assert!(pk.verify(&msg, &sig.try_into().unwrap(), &ctx));
}
