//! # Transaction Module
//!
//! Construction, encoding, signing and submission of operations.
//!
//! ## Architecture
//!
//! ```text
//! types.rs   : Operation, OperationKind, OperationRequest
//! codec.rs   : canonical varint wire format, strict decoder
//! signing.rs : SignedOperation: creator key ‖ payload, signed
//! builder.rs : BUILD → SIGN → SUBMIT pipeline against a NodeClient
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Request**: the caller describes what to do ([`OperationRequest`]).
//! 2. **Build**: the builder fixes the expiry from the node's period.
//! 3. **Sign**: [`sign_operation`] binds the creator key into the signature.
//! 4. **Submit**: the node returns one id per operation.
//!
//! Amounts, fees and gas are `u64` in the smallest unit. No floating point.

pub mod builder;
pub mod codec;
pub mod signing;
pub mod types;

pub use builder::{Stage, TransactionBuilder, TransactionError};
pub use codec::{CodecError, Malformation};
pub use signing::{sign_operation, SignedOperation};
pub use types::{Datastore, Operation, OperationKind, OperationRequest, OperationType};
