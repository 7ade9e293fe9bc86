//! # Identity Module
//!
//! Who is who on the network. A participant is an Ed25519 keypair; the rest
//! of the world knows them by the address derived from its public key.
//!
//! 1. **Address**: `AU…`/`AS…` strings, their decoded form, and the
//!    case-folding used for lookups.
//! 2. **Account**: the record a wallet stores: address, public key,
//!    optional secret key, thread. Self-consistency is checked, never assumed.

pub mod account;
pub mod address;

pub use account::{Account, AccountError};
pub use address::{decode_address, derive_address, normalize, Address, AddressError, AddressKind};
