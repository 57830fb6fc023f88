//! XML codec for exchanging person lists.
//!
//! Converts between a `<persons>` document and [`domicile_core`] value
//! types. Pure and synchronous apart from the two file helpers; importing
//! into a store is left to the caller, which must go through the registry.
//!
//! # Quick start
//!
//! ```no_run
//! let xml = "<persons><person>…</person></persons>";
//! let persons = domicile_xml::from_str(xml).unwrap();
//! println!("{} persons", persons.len());
//! ```

mod document;
pub mod error;

use std::path::Path;

use domicile_core::model::PersonValue;
use serde::Serialize as _;

pub use error::{Error, Result};

use document::PersonsDocument;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const ROOT: &str = "persons";

// ─── Public API ──────────────────────────────────────────────────────────────

/// Render `persons` as an indented XML document, declaration included.
///
/// Fails with [`Error::Untrimmed`] if a text field starts or ends with
/// whitespace, since [`from_str`] would read it back trimmed.
pub fn to_string(persons: &[PersonValue]) -> Result<String> {
  persons.iter().try_for_each(ensure_trimmed)?;
  let document = PersonsDocument::from_values(persons);

  let mut body = String::new();
  let mut serializer =
    quick_xml::se::Serializer::with_root(&mut body, Some(ROOT))?;
  serializer.indent(' ', 2);
  document.serialize(serializer)?;

  Ok(format!("{XML_DECLARATION}{body}\n"))
}

/// Parse a `<persons>` document. An empty root yields an empty list.
pub fn from_str(xml: &str) -> Result<Vec<PersonValue>> {
  let document: PersonsDocument = quick_xml::de::from_str(xml)?;
  Ok(document.into_values())
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<PersonValue>> {
  let xml = std::fs::read_to_string(path)?;
  from_str(&xml)
}

pub fn write_file(path: impl AsRef<Path>, persons: &[PersonValue]) -> Result<()> {
  std::fs::write(path, to_string(persons)?)?;
  Ok(())
}

fn ensure_trimmed(person: &PersonValue) -> Result<()> {
  let address = &person.address;
  let fields = [
    ("firstname", &person.first_name),
    ("lastname", &person.last_name),
    ("street", &address.street),
    ("streetnumber", &address.street_number),
    ("city", &address.city),
    ("country", &address.country),
  ];
  match fields.into_iter().find(|(_, v)| v.trim() != v.as_str()) {
    Some((field, value)) => Err(Error::Untrimmed { field, value: value.clone() }),
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests;
