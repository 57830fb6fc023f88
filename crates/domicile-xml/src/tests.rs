use chrono::NaiveDate;
use domicile_core::model::{AddressValue, Gender, PersonValue};

use crate::{Error, from_str, read_file, to_string, write_file};

const TWO_PERSONS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<persons>
  <person>
    <firstname>Ann</firstname>
    <lastname>Lee</lastname>
    <birthdate>1990-01-01</birthdate>
    <gender>FEMALE</gender>
    <address>
      <street>Main</street>
      <streetnumber>1</streetnumber>
      <zipcode>1000</zipcode>
      <city>X</city>
      <country>Y</country>
    </address>
  </person>
  <person>
    <firstname>Bob</firstname>
    <lastname>Kim</lastname>
    <birthdate>1985-06-30</birthdate>
    <gender>MALE</gender>
    <address>
      <street>Main</street>
      <streetnumber>1</streetnumber>
      <zipcode>1000</zipcode>
      <city>X</city>
      <country>Y</country>
    </address>
  </person>
</persons>
"#;

fn ann() -> PersonValue {
  PersonValue {
    first_name: "Ann".into(),
    last_name:  "Lee".into(),
    birthdate:  NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
    gender:     Gender::Female,
    address:    AddressValue {
      street:        "Main".into(),
      street_number: "1".into(),
      zip_code:      1000,
      city:          "X".into(),
      country:       "Y".into(),
    },
  }
}

#[test]
fn parses_document() {
  let persons = from_str(TWO_PERSONS).unwrap();

  assert_eq!(persons.len(), 2);
  assert_eq!(persons[0], ann());
  assert_eq!(persons[1].first_name, "Bob");
  assert_eq!(persons[1].gender, Gender::Male);
  assert_eq!(
    persons[1].birthdate,
    NaiveDate::from_ymd_opt(1985, 6, 30).unwrap()
  );
  assert_eq!(persons[1].address, persons[0].address);
}

#[test]
fn empty_root_is_an_empty_list() {
  assert!(from_str("<persons/>").unwrap().is_empty());
  assert!(from_str("<persons></persons>").unwrap().is_empty());
}

#[test]
fn written_document_uses_exchange_element_names() {
  let xml = to_string(&[ann()]).unwrap();

  assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
  assert!(xml.contains("<persons>"));
  assert!(xml.contains("<firstname>Ann</firstname>"));
  assert!(xml.contains("<birthdate>1990-01-01</birthdate>"));
  assert!(xml.contains("<gender>FEMALE</gender>"));
  assert!(xml.contains("<streetnumber>1</streetnumber>"));
  assert!(xml.contains("<zipcode>1000</zipcode>"));

  assert_eq!(from_str(&xml).unwrap(), vec![ann()]);
}

#[test]
fn bad_zip_code_is_rejected() {
  let xml = TWO_PERSONS.replacen(
    "<zipcode>1000</zipcode>",
    "<zipcode>ten</zipcode>",
    1,
  );
  assert!(matches!(from_str(&xml), Err(Error::Deserialize(_))));
}

#[test]
fn unknown_gender_is_rejected() {
  let xml = TWO_PERSONS.replacen("FEMALE", "female", 1);
  assert!(matches!(from_str(&xml), Err(Error::Deserialize(_))));
}

#[test]
fn missing_field_is_rejected() {
  let xml = TWO_PERSONS.replacen("<lastname>Lee</lastname>", "", 1);
  assert!(matches!(from_str(&xml), Err(Error::Deserialize(_))));
}

#[test]
fn padded_text_is_refused_on_write() {
  let mut padded = ann();
  padded.address.city = " X ".into();
  let err = to_string(&[padded]).unwrap_err();
  assert!(matches!(
    err,
    Error::Untrimmed { field: "city", ref value } if value == " X "
  ));

  let mut padded = ann();
  padded.first_name = "Ann ".into();
  let path = std::env::temp_dir().join("domicile-never-written.xml");
  let err = write_file(&path, &[padded]).unwrap_err();
  assert!(!path.exists());
  assert!(matches!(err, Error::Untrimmed { field: "firstname", .. }));
}

#[test]
fn inner_spaces_survive_a_roundtrip() {
  let mut spaced = ann();
  spaced.first_name = "Ann Marie".into();
  spaced.address.city = "New York".into();
  spaced.address.street = "Rue de la Paix & Co".into();

  let back = from_str(&to_string(&[spaced.clone()]).unwrap()).unwrap();
  assert_eq!(back, vec![spaced]);
}

#[test]
fn file_helpers_roundtrip() {
  let path = std::env::temp_dir()
    .join(format!("domicile-xml-{}.xml", std::process::id()));

  write_file(&path, &[ann()]).unwrap();
  assert_eq!(read_file(&path).unwrap(), vec![ann()]);
  std::fs::remove_file(&path).ok();

  assert!(matches!(read_file(&path), Err(Error::Io(_))));
}
