//! # Vault Module
//!
//! Where key material lives while a client is running. The store is owned
//! by the client that created it; there is no process-wide wallet.
//!
//! ```text
//! keystore.rs: capacity-bounded account set with a single base account
//! ```

pub mod keystore;

pub use keystore::{KeyStore, KeyStoreError};
