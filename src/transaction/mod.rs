mod access_list;
mod builder;
mod eip2930;
mod legacy;

use ethereum_types::{Address, H160, H256, U256};
use rlp::{DecoderError, Rlp, RlpStream};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

pub use self::{
	access_list::{AccessList, AccessListItem, AccessedStorageKey},
	builder::TransactionBuilder,
	eip2930::{EIP2930Transaction, EIP2930TransactionMessage, EIP2930_TYPE_ID},
	legacy::{LegacyTransaction, LegacyTransactionMessage},
};
use crate::{
	codec,
	enveloped::{EnvelopedDecodable, EnvelopedEncodable},
	error::{Error, Result},
	gas::{data_gas, TX_CREATE_GAS, TX_GAS},
	util::{from_hex, from_hex_fixed, keccak256, to_hex, u256_from_hex, u256_to_hex},
	Bytes,
};

/// Recipient of a transaction. `Create` deploys the payload as a contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionAction {
	Call(H160),
	Create,
}

impl TransactionAction {
	pub fn to(&self) -> Option<Address> {
		match self {
			Self::Call(address) => Some(*address),
			Self::Create => None,
		}
	}
}

impl From<Option<Address>> for TransactionAction {
	fn from(to: Option<Address>) -> Self {
		to.map_or(Self::Create, Self::Call)
	}
}

impl rlp::Encodable for TransactionAction {
	fn rlp_append(&self, s: &mut RlpStream) {
		match self {
			Self::Call(address) => {
				s.encoder().encode_value(&address[..]);
			}
			Self::Create => s.encoder().encode_value(&[]),
		}
	}
}

impl rlp::Decodable for TransactionAction {
	fn decode(rlp: &Rlp) -> core::result::Result<Self, DecoderError> {
		if rlp.is_empty() {
			if rlp.is_data() {
				Ok(TransactionAction::Create)
			} else {
				Err(DecoderError::RlpExpectedToBeData)
			}
		} else {
			Ok(TransactionAction::Call(rlp.as_val()?))
		}
	}
}

/// Fields shared by every transaction type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxData {
	pub nonce: U256,
	pub gas_price: U256,
	pub gas_limit: U256,
	pub action: TransactionAction,
	pub value: U256,
	pub input: Bytes,
}

impl TxData {
	pub fn new(
		nonce: U256,
		gas_price: U256,
		gas_limit: U256,
		to: Option<Address>,
		value: U256,
		input: Bytes,
	) -> Self {
		Self {
			nonce,
			gas_price,
			gas_limit,
			action: to.into(),
			value,
			input,
		}
	}

	/// Intrinsic gas: the flat transaction cost, calldata, and contract
	/// creation when there is no recipient.
	pub fn base_fee(&self) -> U256 {
		let mut fee = U256::from(TX_GAS) + data_gas(&self.input);
		if self.action == TransactionAction::Create {
			fee += U256::from(TX_CREATE_GAS);
		}
		fee
	}

	/// Maximum amount the sender can be charged: `gas_limit * gas_price + value`.
	pub fn upfront_cost(&self) -> U256 {
		self.gas_limit
			.saturating_mul(self.gas_price)
			.saturating_add(self.value)
	}

	/// Appends nonce, gas price, gas limit, recipient, value and input.
	pub(crate) fn rlp_append_fields(&self, s: &mut RlpStream) {
		s.append(&self.nonce);
		s.append(&self.gas_price);
		s.append(&self.gas_limit);
		s.append(&self.action);
		s.append(&self.value);
		s.append(&self.input);
	}

	/// Reads the six shared fields starting at `offset`.
	pub(crate) fn rlp_decode_fields(
		rlp: &Rlp,
		offset: usize,
	) -> core::result::Result<Self, DecoderError> {
		Ok(Self {
			nonce: rlp.val_at(offset)?,
			gas_price: rlp.val_at(offset + 1)?,
			gas_limit: rlp.val_at(offset + 2)?,
			action: rlp.val_at(offset + 3)?,
			value: rlp.val_at(offset + 4)?,
			input: rlp.val_at(offset + 5)?,
		})
	}

	fn insert_values(&self, map: &mut Map<String, Value>) {
		map.insert("nonce".into(), u256_to_hex(&self.nonce).into());
		map.insert("gasPrice".into(), u256_to_hex(&self.gas_price).into());
		map.insert("gasLimit".into(), u256_to_hex(&self.gas_limit).into());
		map.insert(
			"to".into(),
			self.action
				.to()
				.map_or(Value::Null, |to| to_hex(to.as_bytes()).into()),
		);
		map.insert("value".into(), u256_to_hex(&self.value).into());
		map.insert("data".into(), to_hex(&self.input).into());
	}

	fn from_values(value: &TransactionValue) -> Result<Self> {
		let to = match &value.to {
			Some(to) => Some(Address::from(from_hex_fixed::<20>(to)?)),
			None => None,
		};
		Ok(Self::new(
			u256_from_hex(&value.nonce)?,
			u256_from_hex(&value.gas_price)?,
			u256_from_hex(&value.gas_limit)?,
			to,
			u256_from_hex(&value.value)?,
			from_hex(&value.data)?,
		))
	}
}

/// `v`, `r` and `s` of a transaction. All zero until signed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionSignature {
	v: U256,
	r: H256,
	s: H256,
}

impl TransactionSignature {
	/// Splits a 64-byte compact signature into `r` and `s`.
	pub(crate) fn from_compact(signature: &[u8], v: U256) -> Result<Self> {
		if signature.len() != 64 {
			return Err(Error::InvalidSignatureLength(signature.len()));
		}
		Ok(Self {
			v,
			r: H256::from_slice(&signature[..32]),
			s: H256::from_slice(&signature[32..]),
		})
	}

	#[must_use]
	pub fn v(&self) -> U256 {
		self.v
	}

	#[must_use]
	pub fn r(&self) -> &H256 {
		&self.r
	}

	#[must_use]
	pub fn s(&self) -> &H256 {
		&self.s
	}

	/// Both `r` and `s` are non-zero.
	#[must_use]
	pub fn is_signed(&self) -> bool {
		!self.r.is_zero() && !self.s.is_zero()
	}

	/// Appends `v`, then `r` and `s` as minimal integers.
	pub(crate) fn rlp_append(&self, s: &mut RlpStream) {
		s.append(&self.v);
		s.append(&U256::from_big_endian(&self.r[..]));
		s.append(&U256::from_big_endian(&self.s[..]));
	}

	pub(crate) fn rlp_decode(rlp: &Rlp, offset: usize) -> core::result::Result<Self, DecoderError> {
		Ok(Self {
			v: rlp.val_at(offset)?,
			r: crate::util::u256_to_h256(rlp.val_at(offset + 1)?),
			s: crate::util::u256_to_h256(rlp.val_at(offset + 2)?),
		})
	}

	fn insert_values(&self, map: &mut Map<String, Value>) {
		map.insert("v".into(), u256_to_hex(&self.v).into());
		map.insert("r".into(), to_hex(self.r.as_bytes()).into());
		map.insert("s".into(), to_hex(self.s.as_bytes()).into());
	}

	fn from_values(value: &TransactionValue) -> Result<Self> {
		Ok(Self {
			v: u256_from_hex(&value.v)?,
			r: H256::from(from_hex_fixed::<32>(&value.r)?),
			s: H256::from(from_hex_fixed::<32>(&value.s)?),
		})
	}
}

/// Structured form shared by every transaction type.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionValue {
	#[serde(rename = "type", default)]
	pub tx_type: Option<String>,
	pub chain_id: String,
	pub nonce: String,
	pub gas_price: String,
	pub gas_limit: String,
	pub to: Option<String>,
	pub value: String,
	pub data: String,
	pub v: String,
	pub r: String,
	pub s: String,
	#[serde(default)]
	pub access_list: Option<Value>,
}

impl TransactionValue {
	/// `to` may be `null` for contract creation but the key itself is required.
	pub(crate) fn parse(value: &Value) -> Result<Self> {
		if value.is_object() && value.get("to").is_none() {
			trace!("rejected structured transaction without a recipient");
			return Err(Error::invalid_format("missing field `to`"));
		}
		Self::deserialize(value).map_err(|e| {
			trace!(error = %e, "rejected structured transaction");
			Error::invalid_format(e.to_string())
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionType {
	Legacy,
	EIP2930,
}

impl TransactionType {
	/// Envelope type byte, `None` for legacy.
	pub fn type_id(self) -> Option<u8> {
		match self {
			Self::Legacy => None,
			Self::EIP2930 => Some(EIP2930_TYPE_ID),
		}
	}
}

/// A legacy or access-list transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
	/// Legacy transaction type
	Legacy(LegacyTransaction),
	/// EIP-2930 transaction
	EIP2930(EIP2930Transaction),
}

impl Transaction {
	pub fn tx_type(&self) -> TransactionType {
		match self {
			Self::Legacy(_) => TransactionType::Legacy,
			Self::EIP2930(_) => TransactionType::EIP2930,
		}
	}

	pub fn data(&self) -> &TxData {
		match self {
			Self::Legacy(t) => t.data(),
			Self::EIP2930(t) => t.data(),
		}
	}

	pub fn chain_id(&self) -> U256 {
		match self {
			Self::Legacy(t) => t.chain_id(),
			Self::EIP2930(t) => t.chain_id(),
		}
	}

	pub fn signature(&self) -> &TransactionSignature {
		match self {
			Self::Legacy(t) => t.signature(),
			Self::EIP2930(t) => t.signature(),
		}
	}

	/// Access list entries, empty for legacy transactions.
	pub fn access_list(&self) -> &[AccessListItem] {
		match self {
			Self::Legacy(_) => &[],
			Self::EIP2930(t) => &t.access_list()[..],
		}
	}

	/// Preimage handed to the hasher before signing.
	pub fn message_to_sign(&self) -> Vec<u8> {
		match self {
			Self::Legacy(t) => t.message_to_sign(),
			Self::EIP2930(t) => t.message_to_sign(),
		}
	}

	/// Keccak-256 of [`Transaction::message_to_sign`].
	pub fn signing_hash(&self) -> H256 {
		keccak256(&self.message_to_sign())
	}

	pub fn process_signature(&mut self, signature: &[u8], recovery_id: u8) -> Result<()> {
		match self {
			Self::Legacy(t) => t.process_signature(signature, recovery_id),
			Self::EIP2930(t) => t.process_signature(signature, recovery_id),
		}
	}

	pub fn is_signed(&self) -> bool {
		self.signature().is_signed()
	}

	pub fn recovery_id(&self) -> Option<u8> {
		match self {
			Self::Legacy(t) => t.recovery_id(),
			Self::EIP2930(t) => t.recovery_id(),
		}
	}

	/// `0x`-prefixed broadcast payload.
	pub fn signed_transaction(&self) -> String {
		to_hex(&self.encode())
	}

	/// Hash of the broadcast payload.
	pub fn hash(&self) -> H256 {
		keccak256(&self.encode())
	}

	pub fn base_fee(&self) -> U256 {
		match self {
			Self::Legacy(t) => t.base_fee(),
			Self::EIP2930(t) => t.base_fee(),
		}
	}

	pub fn upfront_cost(&self) -> U256 {
		self.data().upfront_cost()
	}

	pub fn to_value(&self) -> Value {
		match self {
			Self::Legacy(t) => t.to_value(),
			Self::EIP2930(t) => t.to_value(),
		}
	}

	/// Picks the variant from the `type` field; absent means legacy.
	pub fn from_value(value: &Value) -> Result<Self> {
		if value.get("type").is_some() {
			EIP2930Transaction::from_value(value).map(Self::EIP2930)
		} else {
			LegacyTransaction::from_value(value).map(Self::Legacy)
		}
	}

	/// Parses a `0x`-prefixed broadcast payload.
	pub fn decode_hex(s: &str) -> Result<Self> {
		let bytes = from_hex(s)
			.map_err(|_| Error::MalformedEncoding(DecoderError::Custom("invalid hex payload")))?;
		<Self as EnvelopedDecodable>::decode(&bytes)
	}
}

impl EnvelopedEncodable for Transaction {
	fn type_id(&self) -> Option<u8> {
		self.tx_type().type_id()
	}

	fn encode_payload(&self) -> bytes::BytesMut {
		match self {
			Self::Legacy(t) => t.encode_payload(),
			Self::EIP2930(t) => t.encode_payload(),
		}
	}
}

impl EnvelopedDecodable for Transaction {
	fn decode(bytes: &[u8]) -> Result<Self> {
		let first = *bytes
			.first()
			.ok_or(Error::MalformedEncoding(DecoderError::RlpIsTooShort))?;

		if first >= 0xc0 {
			debug!("decoding legacy transaction");
			return Ok(Self::Legacy(<LegacyTransaction as EnvelopedDecodable>::decode(
				bytes,
			)?));
		}

		if first == EIP2930_TYPE_ID {
			debug!(type_id = first, "decoding typed transaction");
			return Ok(Self::EIP2930(<EIP2930Transaction as EnvelopedDecodable>::decode(
				bytes,
			)?));
		}

		Err(DecoderError::Custom("invalid tx type").into())
	}
}

impl From<LegacyTransaction> for Transaction {
	fn from(t: LegacyTransaction) -> Self {
		Transaction::Legacy(t)
	}
}

impl From<EIP2930Transaction> for Transaction {
	fn from(t: EIP2930Transaction) -> Self {
		Transaction::EIP2930(t)
	}
}

/// Opens the rlp list of a full payload and checks its arity.
pub(crate) fn open_list(bytes: &[u8], len: usize) -> Result<Rlp<'_>> {
	let rlp = codec::exact(bytes)?;
	if !rlp.is_list() {
		return Err(DecoderError::RlpExpectedToBeList.into());
	}
	codec::check_items(&rlp)?;
	if rlp.item_count()? != len {
		return Err(DecoderError::RlpIncorrectListLen.into());
	}
	Ok(rlp)
}

#[cfg(test)]
mod tests {
	use super::*;
	use hex_literal::hex;
	use serde_json::json;

	fn signature_bytes() -> Vec<u8> {
		[
			hex!("294ac94077b35057971e6b4b06dfdf55a6fbed819133a6c1d31e187f1bca938d"),
			hex!("0be950468ba1c25a5cb50e9f6d8aa13c8cd21f24ba909402775b262ac76d374d"),
		]
		.concat()
	}

	fn legacy() -> Transaction {
		TransactionBuilder::new(TxData::new(
			9.into(),
			20_000_000_000_u64.into(),
			21000.into(),
			Some(hex!("3535353535353535353535353535353535353535").into()),
			1_000_000_000_000_000_000_u64.into(),
			vec![],
		))
		.chain_id(1)
		.build()
	}

	fn typed() -> Transaction {
		let mut builder = TransactionBuilder::new(TxData::new(
			0.into(),
			0x3b9aca00_u64.into(),
			0x62d4.into(),
			Some(hex!("df0a88b2b68c673713a8ec826003676f272e3573").into()),
			1.into(),
			vec![],
		))
		.chain_id(0x796f6c6f763378_u64);
		builder.push_access_list_item(AccessListItem::new(
			hex!("0000000000000000000000000000000000001337").into(),
			vec![H256::zero()],
		));
		builder.build()
	}

	#[test]
	fn base_fee_of_legacy() {
		let mut data = TxData::new(
			0.into(),
			0.into(),
			0.into(),
			Some(Address::repeat_byte(0x35)),
			0.into(),
			hex!("010200").to_vec(),
		);
		assert_eq!(data.base_fee(), U256::from(21000 + 2 * 16 + 4));
		data.action = TransactionAction::Create;
		assert_eq!(data.base_fee(), U256::from(21000 + 2 * 16 + 4 + 32000));
	}

	#[test]
	fn upfront_cost_saturates() {
		let mut data = TxData::new(
			0.into(),
			2.into(),
			21000.into(),
			None,
			5.into(),
			vec![],
		);
		assert_eq!(data.upfront_cost(), U256::from(42005));
		data.gas_price = U256::max_value();
		assert_eq!(data.upfront_cost(), U256::max_value());
	}

	#[test]
	fn signed_transaction_prefix() {
		let mut legacy = legacy();
		legacy.process_signature(&signature_bytes(), 0).unwrap();
		let encoded = legacy.signed_transaction();
		assert!(encoded.starts_with("0x"));
		assert!(u8::from_str_radix(&encoded[2..4], 16).unwrap() >= 0xc0);

		let mut typed = typed();
		typed.process_signature(&signature_bytes(), 0).unwrap();
		assert!(typed.signed_transaction().starts_with("0x01"));
	}

	#[test]
	fn decode_broadcast_payload() {
		for mut tx in vec![legacy(), typed()] {
			tx.process_signature(&signature_bytes(), 1).unwrap();
			let decoded = Transaction::decode_hex(&tx.signed_transaction()).unwrap();
			assert_eq!(decoded, tx);
			assert_eq!(decoded.hash(), tx.hash());
			assert_eq!(decoded.recovery_id(), Some(1));
		}
	}

	#[test]
	fn decode_rejects_garbage() {
		assert!(matches!(
			<Transaction as EnvelopedDecodable>::decode(&[]),
			Err(Error::MalformedEncoding(_))
		));
		assert!(matches!(
			<Transaction as EnvelopedDecodable>::decode(&hex!("02c0")),
			Err(Error::MalformedEncoding(_))
		));
		assert!(matches!(
			Transaction::decode_hex("0xzz"),
			Err(Error::MalformedEncoding(_))
		));

		let mut tx = typed();
		tx.process_signature(&signature_bytes(), 0).unwrap();
		let mut bytes = tx.encode().to_vec();
		bytes.push(0x00);
		assert!(<Transaction as EnvelopedDecodable>::decode(&bytes).is_err());
		bytes.truncate(bytes.len() - 2);
		assert!(<Transaction as EnvelopedDecodable>::decode(&bytes).is_err());
	}

	#[test]
	fn value_dispatches_on_type() {
		for tx in vec![legacy(), typed()] {
			let value = tx.to_value();
			assert_eq!(Transaction::from_value(&value).unwrap(), tx);
		}
		assert!(legacy().to_value().get("type").is_none());
		assert_eq!(typed().to_value()["type"], json!("0x1"));
	}

	#[test]
	fn from_value_rejects_missing_fields() {
		let mut value = legacy().to_value();
		value.as_object_mut().unwrap().remove("gasLimit");
		assert!(matches!(
			Transaction::from_value(&value),
			Err(Error::InvalidFormat(_))
		));

		let mut value = legacy().to_value();
		value["nonce"] = json!(9);
		assert!(Transaction::from_value(&value).is_err());

		let mut value = legacy().to_value();
		value["to"] = json!("0x3535");
		assert!(Transaction::from_value(&value).is_err());

		assert!(Transaction::from_value(&json!("0x00")).is_err());
	}

	#[test]
	fn from_value_requires_recipient_key() {
		for tx in vec![legacy(), typed()] {
			let mut value = tx.to_value();
			value.as_object_mut().unwrap().remove("to");
			assert!(matches!(
				Transaction::from_value(&value),
				Err(Error::InvalidFormat(_))
			));
		}

		let mut value = legacy().to_value();
		value["to"] = Value::Null;
		let parsed = Transaction::from_value(&value).unwrap();
		assert_eq!(parsed.data().action, TransactionAction::Create);
	}
}
