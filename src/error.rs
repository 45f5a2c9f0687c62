use rlp::DecoderError;
use thiserror::Error;

/// Errors produced while building, signing, encoding or importing transactions.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
	/// Binary input violates the length-prefix rules, has trailing bytes, or
	/// carries an unknown type byte.
	#[error("malformed encoding: {0}")]
	MalformedEncoding(#[from] DecoderError),
	/// A structured value is missing a field, has the wrong shape, or holds an
	/// unparsable scalar.
	#[error("invalid format: {0}")]
	InvalidFormat(String),
	#[error("signature must be 64 bytes, got {0}")]
	InvalidSignatureLength(usize),
	#[error("recovery id must be 0 or 1, got {0}")]
	InvalidRecoveryId(u8),
	#[error("transaction is already signed")]
	AlreadySigned,
	#[error("chain id too large for replay-protected signature")]
	InvalidChainId,
}

impl Error {
	pub(crate) fn invalid_format(msg: impl Into<String>) -> Self {
		Self::InvalidFormat(msg.into())
	}
}

pub type Result<T> = core::result::Result<T, Error>;
