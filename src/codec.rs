//! Recursive length-prefix primitives.
//!
//! Thin helpers over `rlp` for callers that build payloads item by item
//! instead of going through an `Encodable` impl. Every decoder here rejects
//! input that does not end exactly at the end of the outermost item.

use ethereum_types::U256;
use rlp::{DecoderError, Rlp, RlpStream};

use crate::error::Result;

/// Minimal big-endian encoding. Zero is the empty string (`0x80`).
pub fn encode_uint(value: &U256) -> Vec<u8> {
	rlp::encode(value).to_vec()
}

/// Byte string encoding. A single byte below `0x80` is its own encoding.
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
	let mut s = RlpStream::new();
	s.encoder().encode_value(bytes);
	s.out().to_vec()
}

/// Wraps already-encoded items in a list header.
pub fn encode_list<I, T>(items: I) -> Vec<u8>
where
	I: IntoIterator<Item = T>,
	T: AsRef<[u8]>,
{
	let items = items.into_iter().collect::<Vec<_>>();
	let mut s = RlpStream::new_list(items.len());
	for item in &items {
		s.append_raw(item.as_ref(), 1);
	}
	s.out().to_vec()
}

pub fn decode_uint(bytes: &[u8]) -> Result<U256> {
	Ok(exact(bytes)?.as_val()?)
}

pub fn decode_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
	let rlp = exact(bytes)?;
	if !rlp.is_data() {
		return Err(DecoderError::RlpExpectedToBeData.into());
	}
	Ok(rlp.data()?.to_vec())
}

/// Splits a list into the raw encodings of its items.
pub fn decode_list(bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
	let rlp = exact(bytes)?;
	if !rlp.is_list() {
		return Err(DecoderError::RlpExpectedToBeList.into());
	}
	check_items(&rlp)?;
	Ok(rlp.iter().map(|item| item.as_raw().to_vec()).collect())
}

/// Walks every nested list under `rlp` and requires its items to tile the
/// list payload exactly. `Rlp::iter` and `Rlp::item_count` stop quietly at
/// the first item that overruns its parent.
pub(crate) fn check_items(rlp: &Rlp) -> core::result::Result<(), DecoderError> {
	if !rlp.is_list() {
		return Ok(());
	}
	let info = rlp.payload_info()?;
	let mut payload = rlp
		.as_raw()
		.get(info.header_len..info.header_len + info.value_len)
		.ok_or(DecoderError::RlpIsTooShort)?;
	while !payload.is_empty() {
		let total = Rlp::new(payload).payload_info()?.total();
		if total > payload.len() {
			return Err(DecoderError::RlpIsTooShort);
		}
		let (item, rest) = payload.split_at(total);
		check_items(&Rlp::new(item))?;
		payload = rest;
	}
	Ok(())
}

/// Opens `bytes` as a single item that must span the whole buffer.
pub(crate) fn exact(bytes: &[u8]) -> core::result::Result<Rlp<'_>, DecoderError> {
	let rlp = Rlp::new(bytes);
	let info = rlp.payload_info()?;
	match info.total().cmp(&bytes.len()) {
		core::cmp::Ordering::Equal => Ok(rlp),
		core::cmp::Ordering::Greater => Err(DecoderError::RlpIsTooShort),
		core::cmp::Ordering::Less => Err(DecoderError::RlpInconsistentLengthAndData),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;
	use hex_literal::hex;

	#[test]
	fn uint_is_minimal() {
		assert_eq!(encode_uint(&U256::zero()), vec![0x80]);
		assert_eq!(encode_uint(&U256::from(0x7f)), vec![0x7f]);
		assert_eq!(encode_uint(&U256::from(0x80)), vec![0x81, 0x80]);
		assert_eq!(encode_uint(&U256::from(0x0400)), vec![0x82, 0x04, 0x00]);
		assert_eq!(decode_uint(&hex!("820400")).unwrap(), U256::from(0x0400));
	}

	#[test]
	fn bytes_single_byte_shortcut() {
		assert_eq!(encode_bytes(&[0x01]), vec![0x01]);
		assert_eq!(encode_bytes(&[0x80]), vec![0x81, 0x80]);
		assert_eq!(encode_bytes(&[]), vec![0x80]);
		assert_eq!(encode_bytes(b"dog"), hex!("83646f67").to_vec());

		let long = [0xaa_u8; 56];
		let encoded = encode_bytes(&long);
		assert_eq!(&encoded[..2], &[0xb8, 56]);
		assert_eq!(decode_bytes(&encoded).unwrap(), long.to_vec());
	}

	#[test]
	fn list_of_encoded_items() {
		let encoded = encode_list(vec![encode_bytes(b"cat"), encode_bytes(b"dog")]);
		assert_eq!(encoded, hex!("c88363617483646f67").to_vec());
		assert_eq!(
			decode_list(&encoded).unwrap(),
			vec![hex!("83636174").to_vec(), hex!("83646f67").to_vec()]
		);
		assert_eq!(encode_list(Vec::<Vec<u8>>::new()), vec![0xc0]);
	}

	#[test]
	fn rejects_overrun_and_trailing_bytes() {
		assert!(matches!(
			decode_bytes(&hex!("8364")),
			Err(Error::MalformedEncoding(_))
		));
		assert!(matches!(
			decode_bytes(&hex!("83646f6700")),
			Err(Error::MalformedEncoding(_))
		));
		assert!(matches!(
			decode_list(&hex!("c883636174")),
			Err(Error::MalformedEncoding(_))
		));
		assert!(matches!(
			decode_list(&hex!("83646f67")),
			Err(Error::MalformedEncoding(_))
		));
		assert!(matches!(decode_uint(&[]), Err(Error::MalformedEncoding(_))));
	}

	#[test]
	fn rejects_item_overrunning_its_list() {
		// Outer header claims 3 bytes, the inner string claims 3 more than that.
		assert_eq!(
			decode_list(&hex!("c3836162")),
			Err(Error::MalformedEncoding(DecoderError::RlpIsTooShort))
		);
		// Same overrun one level down.
		assert_eq!(
			decode_list(&hex!("c5c483616263")).map(|items| items.len()),
			Ok(1)
		);
		assert_eq!(
			decode_list(&hex!("c4c3836162")),
			Err(Error::MalformedEncoding(DecoderError::RlpIsTooShort))
		);
	}
}
