use bytes::BytesMut;
use rlp::DecoderError;

use crate::error::{Error, Result};

/// Typed transaction envelope: an optional type byte followed by the rlp
/// payload.
pub trait EnvelopedEncodable {
	/// Type byte followed by the payload.
	fn encode(&self) -> BytesMut {
		let mut out = BytesMut::new();
		if let Some(type_id) = self.type_id() {
			debug_assert!(type_id <= 0x7f);
			out.extend_from_slice(&[type_id]);
		}

		out.extend_from_slice(&self.encode_payload()[..]);
		out
	}

	/// Type byte, `None` for untyped (legacy) payloads.
	fn type_id(&self) -> Option<u8>;

	/// Encode inner payload.
	fn encode_payload(&self) -> BytesMut;
}

/// Decodable typed transactions.
pub trait EnvelopedDecodable: Sized {
	/// Decode raw bytes to a Self type.
	fn decode(bytes: &[u8]) -> Result<Self>;
}

/// Strips the expected type byte from `bytes`.
pub(crate) fn strip_type_id(bytes: &[u8], type_id: u8) -> Result<&[u8]> {
	match bytes.split_first() {
		Some((first, rest)) if *first == type_id => Ok(rest),
		Some(_) => Err(Error::MalformedEncoding(DecoderError::Custom(
			"unexpected transaction type",
		))),
		None => Err(Error::MalformedEncoding(DecoderError::RlpIsTooShort)),
	}
}
