//! Column converters for the structured contact attributes.
//!
//! The `name`, `address` and `phone` columns hold serialized JSON text
//! rather than normalized tables. The store invokes these at the
//! persistence boundary; nothing else touches the column encoding.

use serde_json::Error;

use super::contact::{Address, Name, Phone};

pub fn name_to_column(name: &Name) -> Result<String, Error> {
    serde_json::to_string(name)
}

pub fn name_from_column(raw: &str) -> Result<Name, Error> {
    serde_json::from_str(raw)
}

pub fn address_to_column(address: &Address) -> Result<String, Error> {
    serde_json::to_string(address)
}

pub fn address_from_column(raw: &str) -> Result<Address, Error> {
    serde_json::from_str(raw)
}

pub fn phones_to_column(phones: &[Phone]) -> Result<String, Error> {
    serde_json::to_string(phones)
}

pub fn phones_from_column(raw: &str) -> Result<Vec<Phone>, Error> {
    serde_json::from_str(raw)
}
