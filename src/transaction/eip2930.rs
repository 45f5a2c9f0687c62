use bytes::BytesMut;
use ethereum_types::{H256, U256};
use rlp::{DecoderError, RlpStream};
use serde_json::{Map, Value};
use tracing::debug;

use super::{open_list, AccessList, TransactionSignature, TransactionValue, TxData};
use crate::{
	enveloped::{strip_type_id, EnvelopedDecodable, EnvelopedEncodable},
	error::{Error, Result},
	util::{keccak256, to_hex, u256_from_hex, u256_to_hex},
};

/// Envelope type byte of access-list transactions.
pub const EIP2930_TYPE_ID: u8 = 0x01;

/// EIP-2930 access-list transaction. `v` is the bare recovery id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EIP2930Transaction {
	chain_id: U256,
	data: TxData,
	access_list: AccessList,
	signature: TransactionSignature,
}

impl EIP2930Transaction {
	pub fn new(data: TxData, chain_id: U256, access_list: AccessList) -> Self {
		Self {
			chain_id,
			data,
			access_list,
			signature: TransactionSignature::default(),
		}
	}

	pub fn data(&self) -> &TxData {
		&self.data
	}

	pub fn chain_id(&self) -> U256 {
		self.chain_id
	}

	pub fn access_list(&self) -> &AccessList {
		&self.access_list
	}

	pub fn signature(&self) -> &TransactionSignature {
		&self.signature
	}

	pub fn to_message(&self) -> EIP2930TransactionMessage {
		EIP2930TransactionMessage {
			chain_id: self.chain_id,
			data: self.data.clone(),
			access_list: self.access_list.clone(),
		}
	}

	/// Type byte followed by the rlp of the unsigned fields.
	pub fn message_to_sign(&self) -> Vec<u8> {
		self.to_message().encode().to_vec()
	}

	pub fn process_signature(&mut self, signature: &[u8], recovery_id: u8) -> Result<()> {
		if self.is_signed() {
			return Err(Error::AlreadySigned);
		}
		if recovery_id > 1 {
			return Err(Error::InvalidRecoveryId(recovery_id));
		}

		self.signature = TransactionSignature::from_compact(signature, U256::from(recovery_id))?;
		debug!(recovery_id, "access list transaction signed");
		Ok(())
	}

	pub fn is_signed(&self) -> bool {
		self.signature.is_signed()
	}

	pub fn recovery_id(&self) -> Option<u8> {
		let v = self.signature.v();
		if self.is_signed() && v <= U256::one() {
			Some(v.low_u32() as u8)
		} else {
			None
		}
	}

	pub fn signed_transaction(&self) -> String {
		to_hex(&self.encode())
	}

	pub fn hash(&self) -> H256 {
		keccak256(&self.encode())
	}

	/// Legacy intrinsic gas plus the access list surcharge.
	pub fn base_fee(&self) -> U256 {
		self.data.base_fee() + self.access_list.gas_cost()
	}

	pub fn to_value(&self) -> Value {
		let mut map = Map::new();
		map.insert("type".into(), u256_to_hex(&EIP2930_TYPE_ID.into()).into());
		map.insert("chainId".into(), u256_to_hex(&self.chain_id).into());
		self.data.insert_values(&mut map);
		map.insert("accessList".into(), self.access_list.to_value());
		self.signature.insert_values(&mut map);
		Value::Object(map)
	}

	pub fn from_value(value: &Value) -> Result<Self> {
		let value = TransactionValue::parse(value)?;
		let tx_type = value
			.tx_type
			.as_deref()
			.ok_or_else(|| Error::invalid_format("missing type"))?;
		if u256_from_hex(tx_type)? != U256::from(EIP2930_TYPE_ID) {
			return Err(Error::invalid_format(format!(
				"expected type {:#04x}, got {}",
				EIP2930_TYPE_ID, tx_type
			)));
		}
		let access_list = value
			.access_list
			.as_ref()
			.ok_or_else(|| Error::invalid_format("missing accessList"))?;

		Ok(Self {
			chain_id: u256_from_hex(&value.chain_id)?,
			data: TxData::from_values(&value)?,
			access_list: AccessList::from_value(access_list)?,
			signature: TransactionSignature::from_values(&value)?,
		})
	}
}

impl rlp::Encodable for EIP2930Transaction {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(11);
		s.append(&self.chain_id);
		self.data.rlp_append_fields(s);
		s.append(&self.access_list);
		self.signature.rlp_append(s);
	}
}

impl EnvelopedEncodable for EIP2930Transaction {
	fn type_id(&self) -> Option<u8> {
		Some(EIP2930_TYPE_ID)
	}

	fn encode_payload(&self) -> BytesMut {
		rlp::encode(self)
	}
}

impl EnvelopedDecodable for EIP2930Transaction {
	fn decode(bytes: &[u8]) -> Result<Self> {
		let rlp = open_list(strip_type_id(bytes, EIP2930_TYPE_ID)?, 11)?;
		let signature = TransactionSignature::rlp_decode(&rlp, 8)?;
		if signature.v() > U256::one() {
			return Err(DecoderError::Custom("invalid y parity").into());
		}

		Ok(Self {
			chain_id: rlp.val_at(0)?,
			data: TxData::rlp_decode_fields(&rlp, 1)?,
			access_list: rlp.val_at(7)?,
			signature,
		})
	}
}

/// Signing payload of an [`EIP2930Transaction`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EIP2930TransactionMessage {
	pub chain_id: U256,
	pub data: TxData,
	pub access_list: AccessList,
}

impl EIP2930TransactionMessage {
	pub fn hash(&self) -> H256 {
		keccak256(&self.encode())
	}
}

impl rlp::Encodable for EIP2930TransactionMessage {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(8);
		s.append(&self.chain_id);
		self.data.rlp_append_fields(s);
		let items = self.access_list.to_encodable();
		s.begin_list(items.len());
		for item in &items {
			s.append_raw(item, 1);
		}
	}
}

impl EnvelopedEncodable for EIP2930TransactionMessage {
	fn type_id(&self) -> Option<u8> {
		Some(EIP2930_TYPE_ID)
	}

	fn encode_payload(&self) -> BytesMut {
		rlp::encode(self)
	}
}
