// Signing & encoding benchmarks for the wallet core.
//
// Covers account generation, address derivation, message signing and
// verification, operation serialization, and end-to-end operation signing
// for batches of various sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use massa_wallet::crypto::signatures::SigningEngine;
use massa_wallet::identity::account::Account;
use massa_wallet::identity::address::{decode_address, derive_address};
use massa_wallet::transaction::codec::{deserialize, serialize};
use massa_wallet::transaction::signing::sign_operation;
use massa_wallet::transaction::types::{Operation, OperationKind};

const MESSAGE: &[u8] = b"transfer 100 from base to receiver; expire=835";

fn transfer(recipient: &Account) -> Operation {
    let recipient = decode_address(&recipient.address).unwrap();
    Operation::new(1, 835, OperationKind::Transaction {
        recipient,
        amount: 100,
    })
}

fn bench_account_generation(c: &mut Criterion) {
    c.bench_function("account/generate", |b| {
        b.iter(Account::generate);
    });
}

fn bench_address_derivation(c: &mut Criterion) {
    let keypair = Account::generate().keypair().unwrap();

    c.bench_function("address/derive", |b| {
        b.iter(|| derive_address(keypair.public()).to_string());
    });

    let text = derive_address(keypair.public()).to_string();
    c.bench_function("address/decode", |b| {
        b.iter(|| decode_address(&text).unwrap());
    });
}

fn bench_sign_message(c: &mut Criterion) {
    let engine = SigningEngine::new();
    let account = Account::generate();

    c.bench_function("ed25519/sign_message", |b| {
        b.iter(|| engine.sign(MESSAGE, &account).unwrap());
    });
}

fn bench_verify_message(c: &mut Criterion) {
    let engine = SigningEngine::new();
    let account = Account::generate();
    let signature = engine.sign(MESSAGE, &account).unwrap().to_string();
    let public_key = account.public_key.clone().unwrap();

    c.bench_function("ed25519/verify_message", |b| {
        b.iter(|| engine.verify(MESSAGE, &signature, &public_key).unwrap());
    });
}

fn bench_codec(c: &mut Criterion) {
    let operation = transfer(&Account::generate());
    let bytes = serialize(&operation);

    c.bench_function("codec/serialize_transfer", |b| {
        b.iter(|| serialize(&operation));
    });
    c.bench_function("codec/deserialize_transfer", |b| {
        b.iter(|| deserialize(&bytes).unwrap());
    });
}

fn bench_sign_operation_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("operation/sign_batch");
    let engine = SigningEngine::new();
    let signer = Account::generate();
    let recipient = Account::generate();

    for size in [1usize, 10, 100] {
        let operations: Vec<Operation> = (0..size).map(|_| transfer(&recipient)).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &operations, |b, ops| {
            b.iter(|| {
                ops.iter()
                    .map(|op| sign_operation(&engine, op, &signer).unwrap())
                    .collect::<Vec<_>>()
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_account_generation,
    bench_address_derivation,
    bench_sign_message,
    bench_verify_message,
    bench_codec,
    bench_sign_operation_batch,
);
criterion_main!(benches);
