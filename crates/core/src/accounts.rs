//! Accounts

use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Account marker type.
#[derive(Debug, Clone, Copy)]
pub struct Account;

/// Account UUID
pub type AccountUuid = TypedUuid<Account>;

/// Address UUID
pub type AddressUuid = TypedUuid<Address>;

/// A shipping destination from the account's address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Address identifier
    pub uuid: AddressUuid,

    /// Recipient name
    pub full_name: String,

    /// Recipient phone number
    pub phone: String,

    /// Free-text street address
    pub address: String,

    /// Whether this is the account's default address
    pub is_default: bool,
}

impl Address {
    /// Single-line rendering for summaries.
    pub fn one_line(&self) -> String {
        format!("{} ({}), {}", self.full_name, self.phone, self.address)
    }
}

/// Pick the address to preselect: the default one, else the first.
pub fn choose_default(addresses: &[Address]) -> Option<&Address> {
    addresses
        .iter()
        .find(|address| address.is_default)
        .or_else(|| addresses.first())
}

/// The authenticated shopper's profile, as supplied by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Account identifier
    pub account: AccountUuid,

    /// Name shown in greetings
    pub display_name: String,

    /// Address book
    pub addresses: Vec<Address>,
}

impl Profile {
    /// Look up an address by id.
    pub fn address(&self, uuid: AddressUuid) -> Option<&Address> {
        self.addresses.iter().find(|address| address.uuid == uuid)
    }
}
