//! # Operation Codec
//!
//! The canonical binary form of an [`Operation`], byte-for-byte what the node
//! deserializes and what gets signed.
//!
//! ```text
//! varint(fee) ‖ varint(expire_period) ‖ varint(type_id) ‖ body
//!
//! Transaction   address(recipient) ‖ varint(amount)
//! RollBuy/Sell  varint(roll_count)
//! ExecuteSC     varint(max_gas) ‖ varint(max_coins) ‖ bytes(bytecode)
//!               ‖ varint(n) ‖ { bytes(key) ‖ bytes(value) } × n
//! CallSC        varint(max_gas) ‖ varint(coins) ‖ address(target)
//!               ‖ bytes(function) ‖ bytes(parameter)
//!
//! address(a)    varint(kind: 0 user, 1 contract) ‖ varint(version) ‖ digest[32]
//! bytes(b)      varint(len) ‖ b
//! ```
//!
//! Addresses go on the wire as raw digests, never as text.
//!
//! ## Decoding
//!
//! [`deserialize`] is the exact inverse of [`serialize`] and is strict: it
//! never reads past the end of its input, rejects any length prefix larger
//! than what remains, and rejects trailing bytes. Every failure carries the
//! byte offset where decoding stopped.

use thiserror::Error;

use super::types::{Datastore, Operation, OperationKind, OperationType};
use crate::config::HASH_LENGTH;
use crate::identity::address::{Address, AddressKind};
use crate::varint::{self, VarintError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a payload could not be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Malformation {
    #[error("unexpected end of input")]
    Truncated,

    #[error("varint overflows u64")]
    VarintOverflow,

    #[error("length prefix {declared} exceeds remaining {remaining} bytes")]
    LengthOverflow { declared: u64, remaining: usize },

    #[error("unknown operation type {0}")]
    UnknownOperationType(u64),

    #[error("unknown address kind {0}")]
    UnknownAddressKind(u64),

    #[error("function name is not valid UTF-8")]
    InvalidUtf8,

    #[error("{0} trailing bytes")]
    TrailingBytes(usize),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed payload at byte {offset}: {reason}")]
    MalformedPayload { offset: usize, reason: Malformation },
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

fn put_varint(out: &mut Vec<u8>, value: u64) {
    varint::encode_into(value, out);
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    put_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

fn put_address(out: &mut Vec<u8>, address: &Address) {
    let kind = match address.kind() {
        AddressKind::User => 0,
        AddressKind::SmartContract => 1,
    };
    put_varint(out, kind);
    put_varint(out, address.version());
    out.extend_from_slice(address.digest());
}

/// Serialize an operation to its canonical bytes. Infallible.
pub fn serialize(operation: &Operation) -> Vec<u8> {
    let mut out = Vec::with_capacity(64);
    put_varint(&mut out, operation.fee);
    put_varint(&mut out, operation.expire_period);
    put_varint(&mut out, operation.op_type().id());

    match &operation.kind {
        OperationKind::Transaction { recipient, amount } => {
            put_address(&mut out, recipient);
            put_varint(&mut out, *amount);
        }
        OperationKind::RollBuy { roll_count } | OperationKind::RollSell { roll_count } => {
            put_varint(&mut out, *roll_count);
        }
        OperationKind::ExecuteSC {
            max_gas,
            max_coins,
            bytecode,
            datastore,
        } => {
            put_varint(&mut out, *max_gas);
            put_varint(&mut out, *max_coins);
            put_bytes(&mut out, bytecode);
            put_varint(&mut out, datastore.len() as u64);
            for (key, value) in datastore {
                put_bytes(&mut out, key);
                put_bytes(&mut out, value);
            }
        }
        OperationKind::CallSC {
            target,
            function,
            parameter,
            max_gas,
            coins,
        } => {
            put_varint(&mut out, *max_gas);
            put_varint(&mut out, *coins);
            put_address(&mut out, target);
            put_bytes(&mut out, function.as_bytes());
            put_bytes(&mut out, parameter);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Deserialization
// ---------------------------------------------------------------------------

/// Bounds-checked cursor over the input.
struct Reader<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.input.len() - self.offset
    }

    fn fail<T>(&self, reason: Malformation) -> Result<T, CodecError> {
        Err(CodecError::MalformedPayload {
            offset: self.offset,
            reason,
        })
    }

    fn varint(&mut self) -> Result<u64, CodecError> {
        match varint::decode(&self.input[self.offset..]) {
            Ok((value, consumed)) => {
                self.offset += consumed;
                Ok(value)
            }
            Err(VarintError::Truncated) => self.fail(Malformation::Truncated),
            Err(VarintError::Overflow) => self.fail(Malformation::VarintOverflow),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if len > self.remaining() {
            return self.fail(Malformation::Truncated);
        }
        let slice = &self.input[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let start = self.offset;
        let declared = self.varint()?;
        let remaining = self.remaining();
        match usize::try_from(declared) {
            Ok(len) if len <= remaining => Ok(self.take(len)?.to_vec()),
            _ => Err(CodecError::MalformedPayload {
                offset: start,
                reason: Malformation::LengthOverflow {
                    declared,
                    remaining,
                },
            }),
        }
    }

    fn address(&mut self) -> Result<Address, CodecError> {
        let start = self.offset;
        let kind = match self.varint()? {
            0 => AddressKind::User,
            1 => AddressKind::SmartContract,
            other => {
                return Err(CodecError::MalformedPayload {
                    offset: start,
                    reason: Malformation::UnknownAddressKind(other),
                })
            }
        };
        let version = self.varint()?;
        let mut digest = [0u8; HASH_LENGTH];
        digest.copy_from_slice(self.take(HASH_LENGTH)?);
        Ok(Address::new(kind, version, digest))
    }

    fn string(&mut self) -> Result<String, CodecError> {
        let start = self.offset;
        let raw = self.bytes()?;
        String::from_utf8(raw).map_err(|_| CodecError::MalformedPayload {
            offset: start,
            reason: Malformation::InvalidUtf8,
        })
    }

    fn finish(self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => self.fail(Malformation::TrailingBytes(n)),
        }
    }
}

/// Decode canonical bytes back into an [`Operation`].
pub fn deserialize(bytes: &[u8]) -> Result<Operation, CodecError> {
    let mut reader = Reader::new(bytes);
    let fee = reader.varint()?;
    let expire_period = reader.varint()?;

    let type_offset = reader.offset;
    let type_id = reader.varint()?;
    let op_type = OperationType::from_id(type_id).ok_or(CodecError::MalformedPayload {
        offset: type_offset,
        reason: Malformation::UnknownOperationType(type_id),
    })?;

    let kind = match op_type {
        OperationType::Transaction => {
            let recipient = reader.address()?;
            let amount = reader.varint()?;
            OperationKind::Transaction { recipient, amount }
        }
        OperationType::RollBuy => OperationKind::RollBuy {
            roll_count: reader.varint()?,
        },
        OperationType::RollSell => OperationKind::RollSell {
            roll_count: reader.varint()?,
        },
        OperationType::ExecuteSC => {
            let max_gas = reader.varint()?;
            let max_coins = reader.varint()?;
            let bytecode = reader.bytes()?;
            let entries = reader.varint()?;
            let mut datastore = Datastore::new();
            // Each entry takes at least two bytes, so a bogus count runs out
            // of input long before it runs out of memory.
            for _ in 0..entries {
                let key = reader.bytes()?;
                let value = reader.bytes()?;
                datastore.insert(key, value);
            }
            OperationKind::ExecuteSC {
                max_gas,
                max_coins,
                bytecode,
                datastore,
            }
        }
        OperationType::CallSC => {
            let max_gas = reader.varint()?;
            let coins = reader.varint()?;
            let target = reader.address()?;
            let function = reader.string()?;
            let parameter = reader.bytes()?;
            OperationKind::CallSC {
                target,
                function,
                parameter,
                max_gas,
                coins,
            }
        }
    };

    reader.finish()?;
    Ok(Operation::new(fee, expire_period, kind))
}
