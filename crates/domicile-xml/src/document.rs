//! Serde mirror of the XML document layout.
//!
//! Element names are fixed by the exchange format and differ
//! from the domain field names (`firstname`, `streetnumber`, `zipcode`).

use chrono::NaiveDate;
use domicile_core::model::{AddressValue, Gender, PersonValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct PersonsDocument {
  #[serde(rename = "person", default)]
  persons: Vec<PersonElement>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersonElement {
  firstname: String,
  lastname:  String,
  birthdate: NaiveDate,
  gender:    Gender,
  address:   AddressElement,
}

#[derive(Debug, Serialize, Deserialize)]
struct AddressElement {
  street:       String,
  streetnumber: String,
  zipcode:      u32,
  city:         String,
  country:      String,
}

impl PersonsDocument {
  pub fn from_values(values: &[PersonValue]) -> Self {
    Self { persons: values.iter().map(PersonElement::from).collect() }
  }

  pub fn into_values(self) -> Vec<PersonValue> {
    self.persons.into_iter().map(PersonValue::from).collect()
  }
}

impl From<&PersonValue> for PersonElement {
  fn from(p: &PersonValue) -> Self {
    Self {
      firstname: p.first_name.clone(),
      lastname:  p.last_name.clone(),
      birthdate: p.birthdate,
      gender:    p.gender,
      address:   AddressElement {
        street:       p.address.street.clone(),
        streetnumber: p.address.street_number.clone(),
        zipcode:      p.address.zip_code,
        city:         p.address.city.clone(),
        country:      p.address.country.clone(),
      },
    }
  }
}

impl From<PersonElement> for PersonValue {
  fn from(e: PersonElement) -> Self {
    Self {
      first_name: e.firstname,
      last_name:  e.lastname,
      birthdate:  e.birthdate,
      gender:     e.gender,
      address:    AddressValue {
        street:        e.address.street,
        street_number: e.address.streetnumber,
        zip_code:      e.address.zipcode,
        city:          e.address.city,
        country:       e.address.country,
      },
    }
  }
}
