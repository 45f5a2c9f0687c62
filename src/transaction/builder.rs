use ethereum_types::U256;

use super::{AccessList, AccessListItem, EIP2930Transaction, LegacyTransaction, Transaction, TxData};

/// Mutable construction phase of a [`Transaction`].
///
/// Access list entries can only be appended here. Once [`build`] hands out
/// the transaction the only remaining mutation is signing it.
///
/// [`build`]: TransactionBuilder::build
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
	data: TxData,
	chain_id: U256,
	access_list: Option<AccessList>,
}

impl TransactionBuilder {
	pub fn new(data: TxData) -> Self {
		Self {
			data,
			chain_id: U256::zero(),
			access_list: None,
		}
	}

	pub fn chain_id(mut self, chain_id: impl Into<U256>) -> Self {
		self.chain_id = chain_id.into();
		self
	}

	/// Makes this an access-list transaction carrying `access_list`.
	pub fn access_list(mut self, access_list: AccessList) -> Self {
		self.access_list = Some(access_list);
		self
	}

	/// Appends an entry, turning the transaction into an access-list
	/// transaction if it was not one already.
	pub fn push_access_list_item(&mut self, item: AccessListItem) -> &mut Self {
		self.access_list.get_or_insert_with(AccessList::new).push(item);
		self
	}

	/// Legacy unless an access list was attached, even an empty one.
	pub fn build(self) -> Transaction {
		match self.access_list {
			None => LegacyTransaction::new(self.data, self.chain_id).into(),
			Some(access_list) => {
				EIP2930Transaction::new(self.data, self.chain_id, access_list).into()
			}
		}
	}
}
