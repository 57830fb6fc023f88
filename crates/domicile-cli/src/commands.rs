//! Subcommand implementations, generic over the backing store.

use std::path::Path;

use anyhow::{Context as _, bail};
use domicile_core::{
  Error, Registry,
  model::{AddressValue, Gender, Person, PersonId, PersonValue},
  store::PersonStore,
};

use crate::{Command, PersonArgs};

impl PersonArgs {
  fn into_value(self) -> PersonValue {
    PersonValue {
      first_name: self.first_name,
      last_name:  self.last_name,
      birthdate:  self.birthdate,
      gender:     self.gender,
      address:    AddressValue {
        street:        self.street,
        street_number: self.number,
        zip_code:      self.zip,
        city:          self.city,
        country:       self.country,
      },
    }
  }
}

pub async fn run<S: PersonStore>(
  registry: &Registry<S>,
  command: Command,
) -> anyhow::Result<()> {
  match command {
    Command::Add(args) => {
      let person = registry
        .save(args.into_value())
        .await
        .context("failed to save person")?;
      println!("{}", describe(&person));
    }
    Command::Update { id, person } => {
      let person = registry
        .update(PersonId(id), person.into_value())
        .await
        .with_context(|| format!("failed to update person {id}"))?;
      println!("{}", describe(&person));
    }
    Command::Delete { id } => {
      registry
        .delete(PersonId(id))
        .await
        .with_context(|| format!("failed to delete person {id}"))?;
      println!("deleted person {id}");
    }
    Command::Show { id } => {
      let Some(person) = registry.find_by_id(PersonId(id)).await.into_result()?
      else {
        bail!("no person with id {id}");
      };
      println!("{}", describe(&person));
    }
    Command::List { json } => {
      let outcome = registry.find_all().await;
      if let Some(error) = &outcome.error {
        eprintln!("warning: could not read persons: {error}");
      }
      if json {
        println!("{}", serde_json::to_string_pretty(&outcome.value)?);
      } else {
        for person in &outcome.value {
          println!("{}", describe(person));
        }
      }
    }
    Command::Addresses => {
      let outcome = registry.find_all_addresses().await;
      if let Some(error) = &outcome.error {
        eprintln!("warning: could not read addresses: {error}");
      }
      for address in &outcome.value {
        println!("{}\t{}", address.address_id, format_address(&address.value));
      }
    }
    Command::Import { file } => {
      let persons = domicile_xml::read_file(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;
      let report = import(registry, persons).await?;
      println!(
        "imported {} person(s), skipped {} duplicate(s)",
        report.saved, report.duplicates
      );
    }
    Command::Export { file } => {
      let count = export(registry, &file).await?;
      println!("exported {count} person(s) to {}", file.display());
    }
    Command::Purge => {
      registry.purge().await.context("failed to purge store")?;
      println!("removed all persons and addresses");
    }
  }
  Ok(())
}

// ─── Import / export ─────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
  pub saved:      usize,
  pub duplicates: usize,
}

/// Save each person in turn. Persons already stored are counted and skipped;
/// any other failure stops the import, keeping what was saved before it.
pub async fn import<S: PersonStore>(
  registry: &Registry<S>,
  persons: Vec<PersonValue>,
) -> anyhow::Result<ImportReport> {
  let mut report = ImportReport::default();
  for (index, value) in persons.into_iter().enumerate() {
    match registry.save(value).await {
      Ok(_) => report.saved += 1,
      Err(Error::DuplicatePerson(existing)) => {
        tracing::debug!(%existing, index, "skipping duplicate person");
        report.duplicates += 1;
      }
      Err(e) => {
        return Err(e)
          .with_context(|| format!("failed to import person #{}", index + 1));
      }
    }
  }
  Ok(report)
}

/// Write every stored person to `file`. A failed read is an error here, so
/// an empty document is never written in place of real data.
pub async fn export<S: PersonStore>(
  registry: &Registry<S>,
  file: &Path,
) -> anyhow::Result<usize> {
  let persons = registry
    .find_all()
    .await
    .into_result()
    .context("failed to read persons")?;
  let values: Vec<PersonValue> = persons.iter().map(Person::value).collect();
  domicile_xml::write_file(file, &values)
    .with_context(|| format!("failed to write {}", file.display()))?;
  Ok(values.len())
}

// ─── Display ─────────────────────────────────────────────────────────────────

fn describe(person: &Person) -> String {
  format!(
    "{}\t{} {}\t{}\t{}\t{}",
    person.person_id,
    person.first_name,
    person.last_name,
    person.birthdate,
    person.gender,
    format_address(&person.address.value),
  )
}

fn format_address(a: &AddressValue) -> String {
  format!(
    "{} {}, {} {}, {}",
    a.street, a.street_number, a.zip_code, a.city, a.country
  )
}

/// Parse a gender case-insensitively.
pub fn parse_gender(s: &str) -> Result<Gender, String> {
  s.trim()
    .to_ascii_uppercase()
    .parse()
    .map_err(|_| format!("expected MALE or FEMALE, got {s:?}"))
}

/// Accept non-empty text without leading or trailing whitespace. Matching is
/// exact and XML export drops the padding, so padded input is refused here.
pub fn trimmed_text(s: &str) -> Result<String, String> {
  if s.trim().is_empty() {
    return Err("must not be empty".to_owned());
  }
  if s.trim() != s {
    return Err(format!("{s:?} has leading or trailing whitespace"));
  }
  Ok(s.to_owned())
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use domicile_core::memory::MemoryStore;

  use super::*;

  fn value(first: &str, street: &str) -> PersonValue {
    PersonValue {
      first_name: first.into(),
      last_name:  "Lee".into(),
      birthdate:  NaiveDate::from_ymd_opt(1985, 6, 30).unwrap(),
      gender:     Gender::Male,
      address:    AddressValue {
        street:        street.into(),
        street_number: "4".into(),
        zip_code:      1200,
        city:          "Geneva".into(),
        country:       "CH".into(),
      },
    }
  }

  #[tokio::test]
  async fn import_skips_duplicates() {
    let registry = Registry::new(MemoryStore::new());
    registry.save(value("Ann", "Main")).await.unwrap();

    let report = import(&registry, vec![
      value("Ann", "Main"),
      value("Bob", "Main"),
      value("Bob", "Main"),
      value("Cat", "Elm"),
    ])
    .await
    .unwrap();

    assert_eq!(report, ImportReport { saved: 2, duplicates: 2 });
    let persons = registry.find_all().await.into_result().unwrap();
    assert_eq!(persons.len(), 3);
    let addresses = registry.find_all_addresses().await.into_result().unwrap();
    assert_eq!(addresses.len(), 2);
  }

  #[tokio::test]
  async fn export_then_import_restores_persons() {
    let source = Registry::new(MemoryStore::new());
    source.save(value("Ann", "Main")).await.unwrap();
    source.save(value("Bob", "Main")).await.unwrap();

    let file = std::env::temp_dir()
      .join(format!("domicile-export-{}.xml", std::process::id()));
    assert_eq!(export(&source, &file).await.unwrap(), 2);

    let target = Registry::new(MemoryStore::new());
    let persons = domicile_xml::read_file(&file).unwrap();
    std::fs::remove_file(&file).ok();
    let report = import(&target, persons).await.unwrap();

    assert_eq!(report.saved, 2);
    let restored = target.find_all().await.into_result().unwrap();
    assert_eq!(restored[1].address.address_id, restored[0].address.address_id);
  }

  #[test]
  fn gender_flag_ignores_case() {
    assert_eq!(parse_gender("female"), Ok(Gender::Female));
    assert_eq!(parse_gender(" Male "), Ok(Gender::Male));
    assert!(parse_gender("other").is_err());
  }

  #[test]
  fn text_flags_must_be_trimmed() {
    assert!(trimmed_text("  ").is_err());
    assert!(trimmed_text("X ").is_err());
    assert!(trimmed_text(" X").is_err());
    assert_eq!(trimmed_text("Ann"), Ok("Ann".to_owned()));
    assert_eq!(trimmed_text("New York"), Ok("New York".to_owned()));
  }

  #[tokio::test]
  async fn export_refuses_padded_values() {
    let registry = Registry::new(MemoryStore::new());
    let mut padded = value("Ann", "Main");
    padded.address.city = " Geneva".into();
    registry.save(padded).await.unwrap();

    let file = std::env::temp_dir()
      .join(format!("domicile-padded-{}.xml", std::process::id()));
    let err = export(&registry, &file).await.unwrap_err();
    assert!(matches!(
      err.downcast_ref::<domicile_xml::Error>(),
      Some(domicile_xml::Error::Untrimmed { field: "city", .. })
    ));
    assert!(!file.exists());
  }

  #[test]
  fn describe_puts_one_person_on_a_line() {
    let person = Person::from_value(
      PersonId(7),
      &value("Ann", "Main"),
      domicile_core::model::Address {
        address_id: domicile_core::model::AddressId(3),
        value:      value("Ann", "Main").address,
      },
    );
    assert_eq!(
      describe(&person),
      "7\tAnn Lee\t1985-06-30\tMALE\tMain 4, 1200 Geneva, CH"
    );
  }
}
