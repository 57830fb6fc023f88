//! In-memory storage backend.
//!
//! Tables live behind a single mutex. A unit of work takes the lock, runs
//! against a private copy of the tables and swaps the copy in only if the
//! work succeeded, which gives the same all-or-nothing behaviour as a
//! database transaction. Intended for embedding, tests, and as a reference
//! implementation of the repository traits.
//!
//! Test builds can arm one-shot failures per operation with
//! `MemoryStore::fail_on`; other builds compile the checks away.

use std::{
  collections::BTreeMap,
  sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
  Error, Result,
  matcher::{addresses_equal, persons_equal},
  model::{
    Address, AddressId, AddressValue, Gender, Person, PersonId, PersonValue,
  },
  store::{AddressRepository, PersonRepository, PersonStore},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A repository operation, used to aim injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum MemoryOp {
  Read,
  InsertAddress,
  UpdateAddress,
  DeleteAddress,
  InsertPerson,
  UpdatePerson,
  DeletePerson,
}

#[derive(Debug, Error)]
pub enum MemoryError {
  #[cfg(test)]
  #[error("injected failure in {0}")]
  Injected(String),

  #[error("address {0} does not exist")]
  DanglingAddress(AddressId),

  #[error("store lock poisoned")]
  Poisoned,
}

// ─── Tables ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct PersonRow {
  address_id: AddressId,
  first_name: String,
  last_name:  String,
  birthdate:  NaiveDate,
  gender:     Gender,
}

#[derive(Debug, Clone, Default)]
struct Tables {
  addresses:       BTreeMap<AddressId, AddressValue>,
  persons:         BTreeMap<PersonId, PersonRow>,
  last_address_id: i64,
  last_person_id:  i64,
}

#[derive(Debug, Default)]
struct Inner {
  tables: Tables,
  #[cfg(test)]
  faults: std::collections::HashSet<MemoryOp>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A store that keeps everything in process memory.
///
/// Cloning is cheap and clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Make the next call of `op` fail with [`MemoryError::Injected`]. Each
  /// injected failure fires once, whether or not its unit of work commits.
  #[cfg(test)]
  pub(crate) fn fail_on(&self, op: MemoryOp) -> Result<()> {
    self
      .inner
      .lock()
      .map_err(|_| Error::storage(MemoryError::Poisoned))?
      .faults
      .insert(op);
    Ok(())
  }
}

impl PersonStore for MemoryStore {
  type Error = MemoryError;

  async fn unit_of_work<T, F>(&self, work: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut dyn PersonRepository<Error = MemoryError>) -> Result<T>
      + Send
      + 'static,
  {
    let mut guard = self
      .inner
      .lock()
      .map_err(|_| Error::storage(MemoryError::Poisoned))?;
    let inner = &mut *guard;

    let mut working = inner.tables.clone();
    let outcome = {
      let mut tx = MemoryTx {
        tables: &mut working,
        #[cfg(test)]
        faults: &mut inner.faults,
      };
      work(&mut tx)
    };
    if outcome.is_ok() {
      inner.tables = working;
    }
    outcome
  }
}

// ─── Transaction ─────────────────────────────────────────────────────────────

struct MemoryTx<'a> {
  tables: &'a mut Tables,
  #[cfg(test)]
  faults: &'a mut std::collections::HashSet<MemoryOp>,
}

impl MemoryTx<'_> {
  #[cfg(test)]
  fn check(&mut self, op: MemoryOp) -> Result<(), MemoryError> {
    if self.faults.remove(&op) {
      return Err(MemoryError::Injected(format!("{op:?}")));
    }
    Ok(())
  }

  #[cfg(not(test))]
  fn check(&mut self, _op: MemoryOp) -> Result<(), MemoryError> { Ok(()) }

  fn address(&self, id: AddressId) -> Result<Address, MemoryError> {
    self
      .tables
      .addresses
      .get(&id)
      .map(|value| Address { address_id: id, value: value.clone() })
      .ok_or(MemoryError::DanglingAddress(id))
  }

  fn person(&self, id: PersonId, row: &PersonRow) -> Result<Person, MemoryError> {
    Ok(Person {
      person_id:  id,
      first_name: row.first_name.clone(),
      last_name:  row.last_name.clone(),
      birthdate:  row.birthdate,
      gender:     row.gender,
      address:    self.address(row.address_id)?,
    })
  }
}

fn person_row(value: &PersonValue, address_id: AddressId) -> PersonRow {
  PersonRow {
    address_id,
    first_name: value.first_name.clone(),
    last_name: value.last_name.clone(),
    birthdate: value.birthdate,
    gender: value.gender,
  }
}

impl AddressRepository for MemoryTx<'_> {
  type Error = MemoryError;

  fn find_address(&mut self, id: AddressId) -> Result<Option<Address>, MemoryError> {
    self.check(MemoryOp::Read)?;
    Ok(self.address(id).ok())
  }

  fn find_address_by_value(
    &mut self,
    value: &AddressValue,
  ) -> Result<Option<Address>, MemoryError> {
    self.check(MemoryOp::Read)?;
    Ok(
      self
        .tables
        .addresses
        .iter()
        .find(|(_, stored)| addresses_equal(stored, value))
        .map(|(id, stored)| Address { address_id: *id, value: stored.clone() }),
    )
  }

  fn list_addresses(&mut self) -> Result<Vec<Address>, MemoryError> {
    self.check(MemoryOp::Read)?;
    Ok(
      self
        .tables
        .addresses
        .iter()
        .map(|(id, value)| Address { address_id: *id, value: value.clone() })
        .collect(),
    )
  }

  fn insert_address(&mut self, value: &AddressValue) -> Result<Address, MemoryError> {
    self.check(MemoryOp::InsertAddress)?;
    self.tables.last_address_id += 1;
    let address_id = AddressId(self.tables.last_address_id);
    self.tables.addresses.insert(address_id, value.clone());
    Ok(Address { address_id, value: value.clone() })
  }

  fn update_address(
    &mut self,
    id: AddressId,
    value: &AddressValue,
  ) -> Result<Option<Address>, MemoryError> {
    self.check(MemoryOp::UpdateAddress)?;
    Ok(self.tables.addresses.get_mut(&id).map(|stored| {
      *stored = value.clone();
      Address { address_id: id, value: value.clone() }
    }))
  }

  fn delete_address(&mut self, id: AddressId) -> Result<(), MemoryError> {
    self.check(MemoryOp::DeleteAddress)?;
    self.tables.addresses.remove(&id);
    Ok(())
  }
}

impl PersonRepository for MemoryTx<'_> {
  fn find_person(&mut self, id: PersonId) -> Result<Option<Person>, MemoryError> {
    self.check(MemoryOp::Read)?;
    self
      .tables
      .persons
      .get(&id)
      .map(|row| self.person(id, row))
      .transpose()
  }

  fn find_person_by_value(
    &mut self,
    value: &PersonValue,
  ) -> Result<Option<Person>, MemoryError> {
    self.check(MemoryOp::Read)?;
    for (id, row) in &self.tables.persons {
      let person = self.person(*id, row)?;
      if persons_equal(&person.value(), value) {
        return Ok(Some(person));
      }
    }
    Ok(None)
  }

  fn list_persons(&mut self) -> Result<Vec<Person>, MemoryError> {
    self.check(MemoryOp::Read)?;
    self
      .tables
      .persons
      .iter()
      .map(|(id, row)| self.person(*id, row))
      .collect()
  }

  fn insert_person(
    &mut self,
    value: &PersonValue,
    address: &Address,
  ) -> Result<Person, MemoryError> {
    self.check(MemoryOp::InsertPerson)?;
    // Foreign-key precondition: the address row must already exist.
    let address = self.address(address.address_id)?;
    self.tables.last_person_id += 1;
    let person_id = PersonId(self.tables.last_person_id);
    self
      .tables
      .persons
      .insert(person_id, person_row(value, address.address_id));
    Ok(Person::from_value(person_id, value, address))
  }

  fn update_person(
    &mut self,
    id: PersonId,
    value: &PersonValue,
    address: &Address,
  ) -> Result<Option<Person>, MemoryError> {
    self.check(MemoryOp::UpdatePerson)?;
    let address = self.address(address.address_id)?;
    let Some(row) = self.tables.persons.get_mut(&id) else {
      return Ok(None);
    };
    *row = person_row(value, address.address_id);
    Ok(Some(Person::from_value(id, value, address)))
  }

  fn delete_person(&mut self, id: PersonId) -> Result<(), MemoryError> {
    self.check(MemoryOp::DeletePerson)?;
    self.tables.persons.remove(&id);
    Ok(())
  }

  fn count_referencing(&mut self, address_id: AddressId) -> Result<u64, MemoryError> {
    self.check(MemoryOp::Read)?;
    Ok(
      self
        .tables
        .persons
        .values()
        .filter(|row| row.address_id == address_id)
        .count() as u64,
    )
  }
}
