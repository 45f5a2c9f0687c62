use core::{convert::TryFrom, iter::FromIterator, ops::Deref};

use ethereum_types::{Address, H256, U256};
use rlp::{DecoderError, Rlp, RlpStream};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
	codec::check_items,
	error::{Error, Result},
	gas::{ACCESS_LIST_ADDRESS_GAS, ACCESS_LIST_STORAGE_KEY_GAS},
	util::{from_hex_fixed, to_hex},
};

/// A 32-byte storage slot pre-declared by an access list.
pub type AccessedStorageKey = H256;

/// One address and the storage slots the transaction expects to touch there.
///
/// Equality is order sensitive and duplicate keys are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessListItem {
	pub address: Address,
	pub storage_keys: Vec<AccessedStorageKey>,
}

impl AccessListItem {
	pub fn new(address: Address, storage_keys: Vec<AccessedStorageKey>) -> Self {
		Self {
			address,
			storage_keys,
		}
	}

	pub fn gas_cost(&self) -> U256 {
		U256::from(ACCESS_LIST_ADDRESS_GAS)
			+ U256::from(ACCESS_LIST_STORAGE_KEY_GAS) * self.storage_keys.len() as u64
	}
}

impl rlp::Encodable for AccessListItem {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(2);
		s.append(&self.address);
		s.append_list(&self.storage_keys);
	}
}

impl rlp::Decodable for AccessListItem {
	fn decode(rlp: &Rlp) -> core::result::Result<Self, DecoderError> {
		check_items(rlp)?;
		if rlp.item_count()? != 2 {
			return Err(DecoderError::RlpIncorrectListLen);
		}

		Ok(Self {
			address: rlp.val_at(0)?,
			storage_keys: rlp.list_at(1)?,
		})
	}
}

/// Ordered list of [`AccessListItem`]s carried by a type-1 transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessList(Vec<AccessListItem>);

impl AccessList {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, item: AccessListItem) {
		self.0.push(item);
	}

	pub fn into_inner(self) -> Vec<AccessListItem> {
		self.0
	}

	/// The encoding of each item, in order, ready to be wrapped in a list.
	pub fn to_encodable(&self) -> Vec<Vec<u8>> {
		self.0.iter().map(|item| rlp::encode(item).to_vec()).collect()
	}

	/// Intrinsic gas charged for pre-declaring these entries. Duplicate items
	/// and duplicate keys are charged every time they appear.
	pub fn gas_cost(&self) -> U256 {
		self.0
			.iter()
			.fold(U256::zero(), |acc, item| acc + item.gas_cost())
	}

	pub fn to_value(&self) -> Value {
		Value::Array(
			self.0
				.iter()
				.map(|item| {
					json!({
						"address": to_hex(item.address.as_bytes()),
						"storageKeys": item
							.storage_keys
							.iter()
							.map(|key| to_hex(key.as_bytes()))
							.collect::<Vec<_>>(),
					})
				})
				.collect(),
		)
	}

	/// Parses the output of [`AccessList::to_value`]. Any malformed entry fails
	/// the whole list.
	pub fn from_value(value: &Value) -> Result<Self> {
		let items = Vec::<AccessListItemValue>::deserialize(value)
			.map_err(|e| Error::invalid_format(format!("access list: {}", e)))?;
		items
			.iter()
			.map(AccessListItem::try_from)
			.collect::<Result<Vec<_>>>()
			.map(Self)
	}
}

impl Deref for AccessList {
	type Target = [AccessListItem];

	fn deref(&self) -> &[AccessListItem] {
		&self.0
	}
}

impl From<Vec<AccessListItem>> for AccessList {
	fn from(items: Vec<AccessListItem>) -> Self {
		Self(items)
	}
}

impl FromIterator<AccessListItem> for AccessList {
	fn from_iter<I: IntoIterator<Item = AccessListItem>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl IntoIterator for AccessList {
	type Item = AccessListItem;
	type IntoIter = std::vec::IntoIter<AccessListItem>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl rlp::Encodable for AccessList {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.append_list(&self.0);
	}
}

impl rlp::Decodable for AccessList {
	fn decode(rlp: &Rlp) -> core::result::Result<Self, DecoderError> {
		check_items(rlp)?;
		Ok(Self(rlp.as_list()?))
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessListItemValue {
	address: String,
	storage_keys: Vec<String>,
}

impl TryFrom<&AccessListItemValue> for AccessListItem {
	type Error = Error;

	fn try_from(value: &AccessListItemValue) -> Result<Self> {
		Ok(Self {
			address: Address::from(from_hex_fixed::<20>(&value.address)?),
			storage_keys: value
				.storage_keys
				.iter()
				.map(|key| from_hex_fixed::<32>(key).map(H256::from))
				.collect::<Result<_>>()?,
		})
	}
}
