use bytes::BytesMut;
use ethereum_types::{H256, U256};
use rlp::{DecoderError, RlpStream};
use serde_json::{Map, Value};
use tracing::debug;

use super::{open_list, TransactionSignature, TransactionValue, TxData};
use crate::{
	enveloped::{EnvelopedDecodable, EnvelopedEncodable},
	error::{Error, Result},
	util::{keccak256, u256_to_hex},
};

/// Pre-EIP-2718 transaction. A non-zero chain id turns on EIP-155 replay
/// protection for both the signing payload and `v`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTransaction {
	data: TxData,
	chain_id: U256,
	signature: TransactionSignature,
}

impl LegacyTransaction {
	pub fn new(data: TxData, chain_id: U256) -> Self {
		Self {
			data,
			chain_id,
			signature: TransactionSignature::default(),
		}
	}

	pub fn data(&self) -> &TxData {
		&self.data
	}

	pub fn chain_id(&self) -> U256 {
		self.chain_id
	}

	pub fn signature(&self) -> &TransactionSignature {
		&self.signature
	}

	pub fn to_message(&self) -> LegacyTransactionMessage {
		LegacyTransactionMessage {
			data: self.data.clone(),
			chain_id: self.chain_id,
		}
	}

	pub fn message_to_sign(&self) -> Vec<u8> {
		rlp::encode(&self.to_message()).to_vec()
	}

	/// Stores `r || s` and derives `v` as `27 + recovery_id`, or
	/// `chain_id * 2 + 35 + recovery_id` when a chain id is set.
	pub fn process_signature(&mut self, signature: &[u8], recovery_id: u8) -> Result<()> {
		if self.is_signed() {
			return Err(Error::AlreadySigned);
		}
		if recovery_id > 1 {
			return Err(Error::InvalidRecoveryId(recovery_id));
		}

		let v = if self.chain_id.is_zero() {
			U256::from(27 + u64::from(recovery_id))
		} else {
			self.chain_id
				.checked_mul(2.into())
				.and_then(|v| v.checked_add(U256::from(35 + u64::from(recovery_id))))
				.ok_or(Error::InvalidChainId)?
		};

		self.signature = TransactionSignature::from_compact(signature, v)?;
		debug!(v = %v, "legacy transaction signed");
		Ok(())
	}

	pub fn is_signed(&self) -> bool {
		self.signature.is_signed()
	}

	pub fn recovery_id(&self) -> Option<u8> {
		if !self.is_signed() {
			return None;
		}
		let base = if self.chain_id.is_zero() {
			Some(U256::from(27))
		} else {
			self.chain_id
				.checked_mul(2.into())
				.and_then(|v| v.checked_add(35.into()))
		}?;
		self.signature
			.v()
			.checked_sub(base)
			.filter(|id| *id <= U256::one())
			.map(|id| id.low_u32() as u8)
	}

	pub fn signed_transaction(&self) -> String {
		crate::util::to_hex(&self.encode())
	}

	pub fn hash(&self) -> H256 {
		keccak256(&self.encode())
	}

	pub fn base_fee(&self) -> U256 {
		self.data.base_fee()
	}

	pub fn to_value(&self) -> Value {
		let mut map = Map::new();
		map.insert("chainId".into(), u256_to_hex(&self.chain_id).into());
		self.data.insert_values(&mut map);
		self.signature.insert_values(&mut map);
		Value::Object(map)
	}

	pub fn from_value(value: &Value) -> Result<Self> {
		let value = TransactionValue::parse(value)?;
		if value.tx_type.is_some() || value.access_list.is_some() {
			return Err(Error::invalid_format("typed fields on a legacy transaction"));
		}

		Ok(Self {
			data: TxData::from_values(&value)?,
			chain_id: crate::util::u256_from_hex(&value.chain_id)?,
			signature: TransactionSignature::from_values(&value)?,
		})
	}
}

impl rlp::Encodable for LegacyTransaction {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(9);
		self.data.rlp_append_fields(s);
		self.signature.rlp_append(s);
	}
}

impl EnvelopedEncodable for LegacyTransaction {
	fn type_id(&self) -> Option<u8> {
		None
	}

	fn encode_payload(&self) -> BytesMut {
		rlp::encode(self)
	}
}

impl EnvelopedDecodable for LegacyTransaction {
	/// Recovers the chain id from `v`: 27/28 carry none, 37 and above carry
	/// `(v - 35) / 2`. An all-zero signature decodes as unsigned.
	fn decode(bytes: &[u8]) -> Result<Self> {
		let rlp = open_list(bytes, 9)?;
		let data = TxData::rlp_decode_fields(&rlp, 0)?;
		let signature = TransactionSignature::rlp_decode(&rlp, 6)?;

		let v = signature.v();
		let chain_id = if v.is_zero() && !signature.is_signed() {
			U256::zero()
		} else if v == U256::from(27) || v == U256::from(28) {
			U256::zero()
		} else if v >= U256::from(37) {
			(v - 35) / 2
		} else {
			return Err(DecoderError::Custom("invalid legacy v").into());
		};

		Ok(Self {
			data,
			chain_id,
			signature,
		})
	}
}

/// Signing payload of a [`LegacyTransaction`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTransactionMessage {
	pub data: TxData,
	pub chain_id: U256,
}

impl LegacyTransactionMessage {
	pub fn hash(&self) -> H256 {
		keccak256(&rlp::encode(self))
	}
}

impl rlp::Encodable for LegacyTransactionMessage {
	fn rlp_append(&self, s: &mut RlpStream) {
		if self.chain_id.is_zero() {
			s.begin_list(6);
			self.data.rlp_append_fields(s);
		} else {
			s.begin_list(9);
			self.data.rlp_append_fields(s);
			s.append(&self.chain_id);
			s.append(&0_u8);
			s.append(&0_u8);
		}
	}
}
