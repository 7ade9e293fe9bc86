//! Core type definitions for operations.
//!
//! An [`Operation`] is what an account asks the network to do. Every variant
//! of [`OperationKind`] carries only its own fields; the codec matches on it
//! exhaustively, so a new kind cannot be added without giving it a wire
//! layout.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::address::Address;

/// Key/value pairs handed to a contract deployment. Ordered by key so the
/// serialized form is canonical.
pub type Datastore = BTreeMap<Vec<u8>, Vec<u8>>;

/// Serde form of a [`Datastore`]: a list of hex `[key, value]` pairs, since
/// byte keys cannot be JSON object keys.
mod datastore_hex {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Datastore;

    pub fn serialize<S: Serializer>(store: &Datastore, serializer: S) -> Result<S::Ok, S::Error> {
        let entries: Vec<(String, String)> = store
            .iter()
            .map(|(key, value)| (hex::encode(key), hex::encode(value)))
            .collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Datastore, D::Error> {
        let entries = Vec::<(String, String)>::deserialize(deserializer)?;
        let mut store = Datastore::new();
        for (key, value) in entries {
            let key = hex::decode(&key).map_err(D::Error::custom)?;
            let value = hex::decode(&value).map_err(D::Error::custom)?;
            if store.insert(key, value).is_some() {
                return Err(D::Error::custom("duplicate datastore key"));
            }
        }
        Ok(store)
    }
}

// ---------------------------------------------------------------------------
// OperationType
// ---------------------------------------------------------------------------

/// Wire discriminant of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    Transaction,
    RollBuy,
    RollSell,
    ExecuteSC,
    CallSC,
}

impl OperationType {
    /// Varint id written after the header fields.
    pub fn id(self) -> u64 {
        match self {
            Self::Transaction => 0,
            Self::RollBuy => 1,
            Self::RollSell => 2,
            Self::ExecuteSC => 3,
            Self::CallSC => 4,
        }
    }

    pub fn from_id(id: u64) -> Option<Self> {
        match id {
            0 => Some(Self::Transaction),
            1 => Some(Self::RollBuy),
            2 => Some(Self::RollSell),
            3 => Some(Self::ExecuteSC),
            4 => Some(Self::CallSC),
            _ => None,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction => write!(f, "Transaction"),
            Self::RollBuy => write!(f, "RollBuy"),
            Self::RollSell => write!(f, "RollSell"),
            Self::ExecuteSC => write!(f, "ExecuteSC"),
            Self::CallSC => write!(f, "CallSC"),
        }
    }
}

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

/// Type-specific body of an operation. Amounts are in the smallest unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    /// Coin transfer.
    Transaction { recipient: Address, amount: u64 },

    /// Stake: buy `roll_count` rolls.
    RollBuy { roll_count: u64 },

    /// Unstake: sell `roll_count` rolls.
    RollSell { roll_count: u64 },

    /// Run (usually deploy) bytecode.
    ExecuteSC {
        max_gas: u64,
        max_coins: u64,
        bytecode: Vec<u8>,
        #[serde(with = "datastore_hex")]
        datastore: Datastore,
    },

    /// Call a function of a deployed contract.
    CallSC {
        target: Address,
        function: String,
        parameter: Vec<u8>,
        max_gas: u64,
        coins: u64,
    },
}

impl OperationKind {
    pub fn op_type(&self) -> OperationType {
        match self {
            Self::Transaction { .. } => OperationType::Transaction,
            Self::RollBuy { .. } => OperationType::RollBuy,
            Self::RollSell { .. } => OperationType::RollSell,
            Self::ExecuteSC { .. } => OperationType::ExecuteSC,
            Self::CallSC { .. } => OperationType::CallSC,
        }
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// A fully specified, unsigned operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Fee paid to the block producer.
    pub fee: u64,

    /// Last period in which the operation may be included. Must be the value
    /// that was signed; it is never recomputed after signing.
    pub expire_period: u64,

    pub kind: OperationKind,
}

impl Operation {
    pub fn new(fee: u64, expire_period: u64, kind: OperationKind) -> Self {
        Self {
            fee,
            expire_period,
            kind,
        }
    }

    pub fn op_type(&self) -> OperationType {
        self.kind.op_type()
    }

    /// Canonical wire bytes. See [`super::codec`].
    pub fn to_bytes(&self) -> Vec<u8> {
        super::codec::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, super::codec::CodecError> {
        super::codec::deserialize(bytes)
    }
}

/// What a caller asks for: everything except the expiry, which the builder
/// resolves against the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    pub fee: u64,
    pub kind: OperationKind,
}

impl OperationRequest {
    pub fn new(fee: u64, kind: OperationKind) -> Self {
        Self { fee, kind }
    }

    /// A coin transfer of `amount` to `recipient`.
    pub fn transfer(fee: u64, recipient: Address, amount: u64) -> Self {
        Self::new(fee, OperationKind::Transaction { recipient, amount })
    }

    pub fn roll_buy(fee: u64, roll_count: u64) -> Self {
        Self::new(fee, OperationKind::RollBuy { roll_count })
    }

    pub fn roll_sell(fee: u64, roll_count: u64) -> Self {
        Self::new(fee, OperationKind::RollSell { roll_count })
    }

    /// Fixes the expiry and yields the operation to serialize.
    pub fn into_operation(self, expire_period: u64) -> Operation {
        Operation::new(self.fee, expire_period, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ids_roundtrip() {
        for ty in [
            OperationType::Transaction,
            OperationType::RollBuy,
            OperationType::RollSell,
            OperationType::ExecuteSC,
            OperationType::CallSC,
        ] {
            assert_eq!(OperationType::from_id(ty.id()), Some(ty));
        }
        assert_eq!(OperationType::from_id(5), None);
    }

    #[test]
    fn test_kind_reports_type() {
        let kind = OperationKind::RollSell { roll_count: 2 };
        assert_eq!(kind.op_type(), OperationType::RollSell);
        assert_eq!(kind.op_type().to_string(), "RollSell");
    }

    #[test]
    fn test_request_into_operation_keeps_fields() {
        let op = OperationRequest::roll_buy(10, 3).into_operation(99);
        assert_eq!(op.fee, 10);
        assert_eq!(op.expire_period, 99);
        assert_eq!(op.kind, OperationKind::RollBuy { roll_count: 3 });
    }

    fn execute_with_datastore() -> Operation {
        let mut datastore = Datastore::new();
        datastore.insert(b"k".to_vec(), b"v".to_vec());
        datastore.insert(vec![0x00, 0xff], Vec::new());
        Operation::new(
            1,
            835,
            OperationKind::ExecuteSC {
                max_gas: 1_000_000,
                max_coins: 5,
                bytecode: vec![0, 97, 115, 109],
                datastore,
            },
        )
    }

    #[test]
    fn test_execute_with_datastore_json_roundtrip() {
        let op = execute_with_datastore();
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(
            json["kind"]["ExecuteSC"]["datastore"],
            serde_json::json!([["00ff", ""], ["6b", "76"]])
        );
        let back: Operation = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_datastore_json_rejects_duplicates_and_bad_hex() {
        let mut json = serde_json::to_value(execute_with_datastore()).unwrap();
        json["kind"]["ExecuteSC"]["datastore"] = serde_json::json!([["6b", "01"], ["6b", "02"]]);
        assert!(serde_json::from_value::<Operation>(json.clone()).is_err());

        json["kind"]["ExecuteSC"]["datastore"] = serde_json::json!([["zz", "01"]]);
        assert!(serde_json::from_value::<Operation>(json).is_err());
    }
}
