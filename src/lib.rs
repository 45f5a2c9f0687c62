//! Legacy and EIP-2930 transactions for wallets: signing payloads, broadcast
//! encoding, intrinsic gas and a JSON form for persistence.
//!
//! Hashing and ECDSA are left to the caller. A typical flow:
//!
//! 1. collect fields in a [`TransactionBuilder`] and [`build`] it,
//! 2. hash [`Transaction::message_to_sign`] and sign the digest,
//! 3. hand the 64-byte signature and recovery id to
//!    [`Transaction::process_signature`],
//! 4. broadcast [`Transaction::signed_transaction`].
//!
//! [`build`]: TransactionBuilder::build

pub mod codec;
mod enveloped;
mod error;
pub mod gas;
mod transaction;
pub mod util;

pub use ethereum_types::{Address, H256, U256};

pub use enveloped::{EnvelopedDecodable, EnvelopedEncodable};
pub use error::{Error, Result};
pub use transaction::{
	AccessList, AccessListItem, AccessedStorageKey, EIP2930Transaction,
	EIP2930TransactionMessage, LegacyTransaction, LegacyTransactionMessage, Transaction,
	TransactionAction, TransactionBuilder, TransactionSignature, TransactionType, TxData,
	EIP2930_TYPE_ID,
};

pub type Bytes = Vec<u8>;
