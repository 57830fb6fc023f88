//! Domain types: persons and the shared addresses they reference.
//!
//! Every stored type comes in two shapes. The `*Value` types carry only
//! domain fields and are what callers hand to the registry; the stored types
//! add the surrogate id assigned by the backend on insert.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Surrogate key of a stored address. Ids grow monotonically, so id order is
/// insertion order.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct AddressId(pub i64);

/// Surrogate key of a stored person.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl fmt::Display for AddressId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── Address ─────────────────────────────────────────────────────────────────

/// A postal address without identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressValue {
  pub street:        String,
  /// Kept as text: numbers such as "12b" are common.
  pub street_number: String,
  pub zip_code:      u32,
  pub city:          String,
  pub country:       String,
}

/// A stored address row. At most one row exists per distinct
/// [`AddressValue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub address_id: AddressId,
  #[serde(flatten)]
  pub value:      AddressValue,
}

// ─── Person ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Gender {
  Male,
  Female,
}

/// A person as supplied by callers: no id, and an address given by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonValue {
  pub first_name: String,
  pub last_name:  String,
  pub birthdate:  NaiveDate,
  pub gender:     Gender,
  pub address:    AddressValue,
}

/// A stored person together with the address row it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:  PersonId,
  pub first_name: String,
  pub last_name:  String,
  pub birthdate:  NaiveDate,
  pub gender:     Gender,
  pub address:    Address,
}

impl Person {
  /// Project the stored row back to its value, dropping both ids.
  pub fn value(&self) -> PersonValue {
    PersonValue {
      first_name: self.first_name.clone(),
      last_name:  self.last_name.clone(),
      birthdate:  self.birthdate,
      gender:     self.gender,
      address:    self.address.value.clone(),
    }
  }

  /// Build a stored person from a value and the already-resolved address.
  /// The value's own address is ignored in favour of `address`.
  pub fn from_value(
    person_id: PersonId,
    value: &PersonValue,
    address: Address,
  ) -> Self {
    Self {
      person_id,
      first_name: value.first_name.clone(),
      last_name: value.last_name.clone(),
      birthdate: value.birthdate,
      gender: value.gender,
      address,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn gender_text_form_is_uppercase() {
    assert_eq!(Gender::Female.to_string(), "FEMALE");
    assert_eq!(Gender::from_str("MALE").unwrap(), Gender::Male);
    assert!(Gender::from_str("male").is_err());
  }

  #[test]
  fn address_serializes_flat() {
    let address = Address {
      address_id: AddressId(7),
      value:      AddressValue {
        street:        "Main".into(),
        street_number: "1".into(),
        zip_code:      1000,
        city:          "X".into(),
        country:       "Y".into(),
      },
    };
    let json = serde_json::to_value(&address).unwrap();
    assert_eq!(json["address_id"], 7);
    assert_eq!(json["zip_code"], 1000);
    assert_eq!(json["street_number"], "1");
  }
}
