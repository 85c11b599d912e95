use claw_types::Hash32;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn secp256k1_sign_bench(c: &mut Criterion) {
    let kp = claw_crypto::keypair_from_seed(&[42u8; 32]).unwrap();
    let digest = Hash32::new([7u8; 32]);

    c.bench_function("secp256k1_sign_digest", |b| {
        b.iter(|| claw_crypto::sign_digest(black_box(&digest), &kp).unwrap())
    });
}

fn secp256k1_recover_bench(c: &mut Criterion) {
    let kp = claw_crypto::keypair_from_seed(&[42u8; 32]).unwrap();
    let digest = Hash32::new([7u8; 32]);
    let sig = claw_crypto::sign_digest(&digest, &kp).unwrap();

    c.bench_function("secp256k1_recover_signer", |b| {
        b.iter(|| claw_crypto::recover_signer(black_box(&digest), &sig).unwrap())
    });
}

fn blake2b_256_bench(c: &mut Criterion) {
    let data = [0xABu8; 256];

    c.bench_function("blake2b_256_256B", |b| {
        b.iter(|| claw_crypto::blake2b_256(black_box(&data)))
    });
}

fn blake2b_multi_bench(c: &mut Criterion) {
    let parts: Vec<&[u8]> = vec![&[1u8; 32], &[2u8; 20], &[3u8; 8]];

    c.bench_function("blake2b_256_multi_3parts", |b| {
        b.iter(|| claw_crypto::blake2b_256_multi(black_box(&parts)))
    });
}

criterion_group!(
    benches,
    secp256k1_sign_bench,
    secp256k1_recover_bench,
    blake2b_256_bench,
    blake2b_multi_bench,
);
criterion_main!(benches);
