//! Property-based tests for the wire codec and textual formats.
//!
//! Fixed vectors live next to each module. These check that the encoders and
//! the strict decoders agree for arbitrary inputs, and that the decoders never
//! accept a damaged payload silently.

use massa_wallet::crypto::keys::SecretKey;
use massa_wallet::crypto::signatures::SigningEngine;
use massa_wallet::identity::account::Account;
use massa_wallet::identity::address::{decode_address, Address, AddressKind};
use massa_wallet::transaction::codec::{deserialize, serialize};
use massa_wallet::transaction::types::{Datastore, Operation, OperationKind};
use massa_wallet::varint;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn address_strategy() -> impl Strategy<Value = Address> {
    (any::<bool>(), prop::array::uniform32(any::<u8>())).prop_map(|(user, digest)| {
        let kind = if user {
            AddressKind::User
        } else {
            AddressKind::SmartContract
        };
        Address::new(kind, 0, digest)
    })
}

fn datastore_strategy() -> impl Strategy<Value = Datastore> {
    prop::collection::btree_map(
        prop::collection::vec(any::<u8>(), 0..16),
        prop::collection::vec(any::<u8>(), 0..32),
        0..4,
    )
}

fn kind_strategy() -> impl Strategy<Value = OperationKind> {
    prop_oneof![
        (address_strategy(), any::<u64>())
            .prop_map(|(recipient, amount)| OperationKind::Transaction { recipient, amount }),
        any::<u64>().prop_map(|roll_count| OperationKind::RollBuy { roll_count }),
        any::<u64>().prop_map(|roll_count| OperationKind::RollSell { roll_count }),
        (
            any::<u64>(),
            any::<u64>(),
            prop::collection::vec(any::<u8>(), 0..64),
            datastore_strategy(),
        )
            .prop_map(|(max_gas, max_coins, bytecode, datastore)| {
                OperationKind::ExecuteSC {
                    max_gas,
                    max_coins,
                    bytecode,
                    datastore,
                }
            }),
        (
            address_strategy(),
            "[a-zA-Z_][a-zA-Z0-9_]{0,24}",
            prop::collection::vec(any::<u8>(), 0..64),
            any::<u64>(),
            any::<u64>(),
        )
            .prop_map(|(target, function, parameter, max_gas, coins)| {
                OperationKind::CallSC {
                    target,
                    function,
                    parameter,
                    max_gas,
                    coins,
                }
            }),
    ]
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    (any::<u64>(), any::<u64>(), kind_strategy())
        .prop_map(|(fee, expire_period, kind)| Operation::new(fee, expire_period, kind))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Decoding what was encoded yields the same operation, consuming every
    /// byte.
    #[test]
    fn prop_operation_roundtrip(operation in operation_strategy()) {
        let bytes = serialize(&operation);
        prop_assert_eq!(deserialize(&bytes).unwrap(), operation);
    }

    /// Any strict prefix of a valid payload is rejected.
    #[test]
    fn prop_truncated_payload_rejected(
        operation in operation_strategy(),
        cut in any::<prop::sample::Index>(),
    ) {
        let bytes = serialize(&operation);
        let len = cut.index(bytes.len());
        prop_assert!(deserialize(&bytes[..len]).is_err());
    }

    /// Trailing garbage after a valid payload is rejected.
    #[test]
    fn prop_trailing_bytes_rejected(
        operation in operation_strategy(),
        extra in prop::collection::vec(any::<u8>(), 1..8),
    ) {
        let mut bytes = serialize(&operation);
        bytes.extend_from_slice(&extra);
        prop_assert!(deserialize(&bytes).is_err());
    }

    #[test]
    fn prop_varint_roundtrip(value in any::<u64>()) {
        let bytes = varint::encode(value);
        prop_assert!(bytes.len() <= varint::MAX_VARINT_LEN);
        prop_assert_eq!(varint::decode(&bytes).unwrap(), (value, bytes.len()));
    }

    /// Address text decodes to the same kind and digest.
    #[test]
    fn prop_address_text_roundtrip(address in address_strategy()) {
        let text = address.to_string();
        let expected_prefix = match address.kind() {
            AddressKind::User => "AU",
            AddressKind::SmartContract => "AS",
        };
        prop_assert!(text.starts_with(expected_prefix));
        prop_assert_eq!(decode_address(&text).unwrap(), address);
    }

    /// Accounts derived from any seed validate and sign verifiably.
    #[test]
    fn prop_seeded_account_signs(
        seed in prop::array::uniform32(any::<u8>()),
        message in prop::collection::vec(any::<u8>(), 0..128),
    ) {
        let secret = SecretKey::from_bytes(&seed);
        let account = Account::from_secret_key(&secret.to_text()).unwrap();
        account.validate_signer().unwrap();
        prop_assert!(account.created_in_thread < 32);

        let engine = SigningEngine::new();
        let signature = engine.sign(&message, &account).unwrap();
        let public_key = account.public_key.clone().unwrap();
        prop_assert!(engine.verify(&message, &signature.to_string(), &public_key).unwrap());
    }
}
