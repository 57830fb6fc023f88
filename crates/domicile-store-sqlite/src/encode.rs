//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` text and genders as their uppercase
//! names. Ids are plain integers.

use std::str::FromStr as _;

use chrono::NaiveDate;
use domicile_core::model::{
  Address, AddressId, AddressValue, Gender, Person, PersonId,
};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Gender ──────────────────────────────────────────────────────────────────

pub fn encode_gender(g: Gender) -> String { g.to_string() }

pub fn decode_gender(s: &str) -> Result<Gender> {
  Gender::from_str(s).map_err(|_| Error::UnknownGender(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawAddress::from_row`].
pub const ADDRESS_COLUMNS: &str =
  "address_id, street, street_number, zip_code, city, country";

/// Column list matching [`RawPerson::from_row`]; expects `persons p` joined
/// with `addresses a`.
pub const PERSON_COLUMNS: &str = "p.person_id, p.first_name, p.last_name, \
                                  p.birthdate, p.gender, a.address_id, \
                                  a.street, a.street_number, a.zip_code, \
                                  a.city, a.country";

/// Values read directly from an `addresses` row.
pub struct RawAddress {
  pub address_id:    i64,
  pub street:        String,
  pub street_number: String,
  pub zip_code:      u32,
  pub city:          String,
  pub country:       String,
}

impl RawAddress {
  /// Read the address columns starting at column `at`.
  pub fn from_row(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      address_id:    row.get(at)?,
      street:        row.get(at + 1)?,
      street_number: row.get(at + 2)?,
      zip_code:      row.get(at + 3)?,
      city:          row.get(at + 4)?,
      country:       row.get(at + 5)?,
    })
  }

  pub fn into_address(self) -> Address {
    Address {
      address_id: AddressId(self.address_id),
      value:      AddressValue {
        street:        self.street,
        street_number: self.street_number,
        zip_code:      self.zip_code,
        city:          self.city,
        country:       self.country,
      },
    }
  }
}

/// Values read directly from a `persons` row joined with its address.
pub struct RawPerson {
  pub person_id:  i64,
  pub first_name: String,
  pub last_name:  String,
  pub birthdate:  String,
  pub gender:     String,
  pub address:    RawAddress,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:  row.get(0)?,
      first_name: row.get(1)?,
      last_name:  row.get(2)?,
      birthdate:  row.get(3)?,
      gender:     row.get(4)?,
      address:    RawAddress::from_row(row, 5)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:  PersonId(self.person_id),
      first_name: self.first_name,
      last_name:  self.last_name,
      birthdate:  decode_date(&self.birthdate)?,
      gender:     decode_gender(&self.gender)?,
      address:    self.address.into_address(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_use_iso_calendar_form() {
    let d = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    assert_eq!(encode_date(d), "1990-01-01");
    assert_eq!(decode_date("1990-01-01").unwrap(), d);
    assert!(matches!(decode_date("01.01.1990"), Err(Error::DateParse(_))));
  }

  #[test]
  fn gender_names_are_uppercase() {
    assert_eq!(encode_gender(Gender::Male), "MALE");
    assert_eq!(decode_gender("FEMALE").unwrap(), Gender::Female);
    assert!(matches!(decode_gender("female"), Err(Error::UnknownGender(_))));
  }
}
