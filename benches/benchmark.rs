use criterion::{criterion_group, criterion_main, Criterion};
use mldsa65::traits::{KeyGen, Signer, Verifier};
use mldsa65::KG;
use rand_chacha::rand_core::SeedableRng;

pub fn criterion_benchmark(c: &mut Criterion) {
    let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);

    let (pk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
    let sig = sk.try_sign_with_rng(&mut rng, &message, &[]).unwrap();

    c.bench_function("ml_dsa_65 keygen", |b| {
        b.iter(|| KG::try_keygen_with_rng(&mut rng))
    });
    c.bench_function("ml_dsa_65 sign", |b| {
        b.iter(|| sk.try_sign_with_rng(&mut rng, &message, &[]))
    });
    c.bench_function("ml_dsa_65 verify", |b| b.iter(|| pk.verify(&message, &sig, &[])));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
