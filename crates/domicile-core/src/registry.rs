//! [`Registry`] — the consistency engine over a [`PersonStore`].
//!
//! The registry owns every rule that keeps the address table normalised:
//!
//! - no two stored addresses are value-equal;
//! - every stored address is referenced by at least one person.
//!
//! Each public write runs as exactly one unit of work; reads go through the
//! store's read-only path. The decision logic lives in plain functions over
//! `&mut R: PersonRepository`, so it is the same code whichever backend
//! supplies the transaction.

use tracing::{debug, warn};

use crate::{
  Error, Result,
  matcher::{addresses_equal, persons_equal},
  model::{Address, AddressId, AddressValue, Person, PersonId, PersonValue},
  store::{AddressRepository as _, PersonRepository, PersonStore},
};

// ─── Read outcome ────────────────────────────────────────────────────────────

/// The result of a best-effort read.
///
/// Reads feed display code, so a storage failure does not abort them: the
/// value falls back to empty and the failure travels alongside it.
#[derive(Debug)]
pub struct ReadOutcome<T> {
  pub value: T,
  pub error: Option<Error>,
}

impl<T: Default> ReadOutcome<T> {
  fn lenient(result: Result<T>, what: &'static str) -> Self {
    match result {
      Ok(value) => Self { value, error: None },
      Err(error) => {
        warn!(%error, "{what} failed; returning an empty result");
        Self { value: T::default(), error: Some(error) }
      }
    }
  }
}

impl<T> ReadOutcome<T> {
  pub fn is_ok(&self) -> bool { self.error.is_none() }

  /// Treat a degraded read as a failure after all.
  pub fn into_result(self) -> Result<T> {
    match self.error {
      Some(error) => Err(error),
      None => Ok(self.value),
    }
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Save, update and delete persons while keeping their addresses shared,
/// deduplicated and free of orphans.
pub struct Registry<S> {
  store: S,
}

impl<S: PersonStore> Registry<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Give the store back, e.g. to close it explicitly.
  pub fn into_store(self) -> S { self.store }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Persist a new person, reusing a stored address with the same value or
  /// inserting one.
  ///
  /// Fails with [`Error::DuplicatePerson`] if a value-equal person exists;
  /// nothing is written in that case.
  pub async fn save(&self, value: PersonValue) -> Result<Person> {
    let person = self
      .store
      .unit_of_work(move |repo| save_in(repo, &value))
      .await?;
    debug!(
      person_id = %person.person_id,
      address_id = %person.address.address_id,
      "saved person"
    );
    Ok(person)
  }

  /// Replace the person at `id` with `value`.
  ///
  /// An address used only by this person is edited in place; a shared one is
  /// left alone and the person moves to another row. Addresses left without
  /// references are removed before the unit of work commits.
  pub async fn update(&self, id: PersonId, value: PersonValue) -> Result<Person> {
    self
      .store
      .unit_of_work(move |repo| update_in(repo, id, &value))
      .await
  }

  /// Remove the person at `id`, and its address if nobody else uses it.
  pub async fn delete(&self, id: PersonId) -> Result<()> {
    self
      .store
      .unit_of_work(move |repo| delete_in(repo, id))
      .await
  }

  /// Remove every person and every address.
  pub async fn purge(&self) -> Result<()> {
    self.store.unit_of_work(|repo| purge_in(repo)).await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn find_by_id(&self, id: PersonId) -> ReadOutcome<Option<Person>> {
    let result = self
      .store
      .read(move |repo| repo.find_person(id).map_err(Error::storage))
      .await;
    ReadOutcome::lenient(result, "finding a person")
  }

  pub async fn find_all(&self) -> ReadOutcome<Vec<Person>> {
    let result = self
      .store
      .read(|repo| repo.list_persons().map_err(Error::storage))
      .await;
    ReadOutcome::lenient(result, "listing persons")
  }

  pub async fn find_address(
    &self,
    id: AddressId,
  ) -> ReadOutcome<Option<Address>> {
    let result = self
      .store
      .read(move |repo| repo.find_address(id).map_err(Error::storage))
      .await;
    ReadOutcome::lenient(result, "finding an address")
  }

  pub async fn find_all_addresses(&self) -> ReadOutcome<Vec<Address>> {
    let result = self
      .store
      .read(|repo| repo.list_addresses().map_err(Error::storage))
      .await;
    ReadOutcome::lenient(result, "listing addresses")
  }
}

// ─── Units of work ───────────────────────────────────────────────────────────

fn save_in<R>(repo: &mut R, value: &PersonValue) -> Result<Person>
where
  R: PersonRepository + ?Sized,
{
  if let Some(existing) =
    repo.find_person_by_value(value).map_err(Error::storage)?
  {
    debug!(person_id = %existing.person_id, "save rejected: duplicate value");
    return Err(Error::DuplicatePerson(existing.person_id));
  }

  // A failed insert below rolls back a freshly inserted address with it.
  let address = resolve_address(repo, &value.address)?;
  repo
    .insert_person(value, &address)
    .map_err(Error::storage)
}

fn update_in<R>(
  repo: &mut R,
  id: PersonId,
  value: &PersonValue,
) -> Result<Person>
where
  R: PersonRepository + ?Sized,
{
  let existing = repo
    .find_person(id)
    .map_err(Error::storage)?
    .ok_or(Error::PersonNotFound(id))?;

  if persons_equal(&existing.value(), value) {
    debug!(person_id = %id, "update is a no-op");
    return Ok(existing);
  }

  let old = existing.address;
  let registered = repo
    .find_address_by_value(&value.address)
    .map_err(Error::storage)?
    .filter(|a| a.address_id != old.address_id);
  let shared_count = repo
    .count_referencing(old.address_id)
    .map_err(Error::storage)?;
  let address_changed = !addresses_equal(&old.value, &value.address);

  let resolved = if !address_changed {
    old
  } else if shared_count > 1 {
    debug!(
      person_id = %id,
      address_id = %old.address_id,
      shared_count,
      "address is shared; leaving it untouched"
    );
    match registered {
      Some(address) => address,
      None => repo.insert_address(&value.address).map_err(Error::storage)?,
    }
  } else if let Some(address) = registered {
    debug!(
      person_id = %id,
      address_id = %address.address_id,
      "moving to an already registered address"
    );
    address
  } else {
    debug!(
      person_id = %id,
      address_id = %old.address_id,
      "editing exclusive address in place"
    );
    repo
      .update_address(old.address_id, &value.address)
      .map_err(Error::storage)?
      .ok_or(Error::AddressNotFound(old.address_id))?
  };

  let person = repo
    .update_person(id, value, &resolved)
    .map_err(Error::storage)?
    .ok_or(Error::PersonNotFound(id))?;

  remove_orphans(repo)?;
  Ok(person)
}

fn delete_in<R>(repo: &mut R, id: PersonId) -> Result<()>
where
  R: PersonRepository + ?Sized,
{
  let person = repo
    .find_person(id)
    .map_err(Error::storage)?
    .ok_or(Error::PersonNotFound(id))?;
  let address_id = person.address.address_id;

  repo.delete_person(id).map_err(Error::storage)?;

  if repo.count_referencing(address_id).map_err(Error::storage)? == 0 {
    repo.delete_address(address_id).map_err(Error::storage)?;
    debug!(person_id = %id, %address_id, "deleted person and its address");
  } else {
    debug!(person_id = %id, %address_id, "deleted person; address still shared");
  }
  Ok(())
}

fn purge_in<R>(repo: &mut R) -> Result<()>
where
  R: PersonRepository + ?Sized,
{
  for person in repo.list_persons().map_err(Error::storage)? {
    repo.delete_person(person.person_id).map_err(Error::storage)?;
  }
  for address in repo.list_addresses().map_err(Error::storage)? {
    repo.delete_address(address.address_id).map_err(Error::storage)?;
  }
  Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Reuse the stored address equal to `value`, or insert it.
fn resolve_address<R>(repo: &mut R, value: &AddressValue) -> Result<Address>
where
  R: PersonRepository + ?Sized,
{
  if let Some(existing) =
    repo.find_address_by_value(value).map_err(Error::storage)?
  {
    debug!(address_id = %existing.address_id, "reusing registered address");
    return Ok(existing);
  }
  repo.insert_address(value).map_err(Error::storage)
}

/// Delete every address no person references. Returns how many went.
fn remove_orphans<R>(repo: &mut R) -> Result<usize>
where
  R: PersonRepository + ?Sized,
{
  let mut removed = 0;
  for address in repo.list_addresses().map_err(Error::storage)? {
    if repo
      .count_referencing(address.address_id)
      .map_err(Error::storage)?
      == 0
    {
      repo
        .delete_address(address.address_id)
        .map_err(Error::storage)?;
      removed += 1;
    }
  }
  if removed > 0 {
    debug!(removed, "removed orphaned addresses");
  }
  Ok(removed)
}
