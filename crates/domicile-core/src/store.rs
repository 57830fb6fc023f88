//! Storage capability traits implemented by every backend.
//!
//! The registry never talks to a database directly. It asks a
//! [`PersonStore`] for a unit of work and runs its decision logic
//! synchronously against the [`PersonRepository`] handed to it; the backend
//! decides how that maps onto a transaction.

use std::future::Future;

use crate::{
  Result,
  model::{Address, AddressId, AddressValue, Person, PersonId, PersonValue},
};

// ─── Repositories ────────────────────────────────────────────────────────────

/// CRUD primitives over address rows, scoped to one open transaction.
pub trait AddressRepository {
  type Error: std::error::Error + Send + Sync + 'static;

  fn find_address(
    &mut self,
    id: AddressId,
  ) -> Result<Option<Address>, Self::Error>;

  /// First value-equal row in id order, if any.
  fn find_address_by_value(
    &mut self,
    value: &AddressValue,
  ) -> Result<Option<Address>, Self::Error>;

  /// Every address row in id order.
  fn list_addresses(&mut self) -> Result<Vec<Address>, Self::Error>;

  /// Insert a row and return it with its freshly assigned id. Performs no
  /// deduplication; that is the registry's job.
  fn insert_address(
    &mut self,
    value: &AddressValue,
  ) -> Result<Address, Self::Error>;

  /// Overwrite every field of the row at `id`. Returns `None` if there is no
  /// such row.
  fn update_address(
    &mut self,
    id: AddressId,
    value: &AddressValue,
  ) -> Result<Option<Address>, Self::Error>;

  /// Remove the row at `id`; a no-op when it does not exist.
  fn delete_address(&mut self, id: AddressId) -> Result<(), Self::Error>;
}

/// CRUD primitives over person rows plus the reference counter.
///
/// Person rows store only the id of their address, so every method that
/// writes a person takes the already-resolved [`Address`].
pub trait PersonRepository: AddressRepository {
  fn find_person(&mut self, id: PersonId)
  -> Result<Option<Person>, Self::Error>;

  /// First person in id order whose scalar fields match and whose address
  /// is value-equal to `value.address`.
  fn find_person_by_value(
    &mut self,
    value: &PersonValue,
  ) -> Result<Option<Person>, Self::Error>;

  /// Every person in id order.
  fn list_persons(&mut self) -> Result<Vec<Person>, Self::Error>;

  /// Insert a person referencing `address`, which must already be stored.
  /// `value.address` is ignored.
  fn insert_person(
    &mut self,
    value: &PersonValue,
    address: &Address,
  ) -> Result<Person, Self::Error>;

  /// Overwrite the person at `id` with `value`, pointing it at `address`.
  /// Returns `None` if there is no such row.
  fn update_person(
    &mut self,
    id: PersonId,
    value: &PersonValue,
    address: &Address,
  ) -> Result<Option<Person>, Self::Error>;

  /// Remove the person at `id`; a no-op when it does not exist.
  fn delete_person(&mut self, id: PersonId) -> Result<(), Self::Error>;

  /// Number of person rows whose address reference equals `address_id`.
  fn count_referencing(
    &mut self,
    address_id: AddressId,
  ) -> Result<u64, Self::Error>;
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A storage backend able to run atomic units of work.
///
/// Implementations own their connection; the registry holds the store by
/// value and dropping it releases the connection.
pub trait PersonStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run `work` inside one transaction.
  ///
  /// The transaction must hold the store's write lock from the start, so
  /// that everything `work` reads stays valid until it commits. It commits
  /// when `work` returns `Ok` and rolls back every change when `work` returns
  /// `Err`. Begin and commit failures surface as
  /// [`Error::Storage`](crate::Error::Storage).
  fn unit_of_work<T, F>(
    &self,
    work: F,
  ) -> impl Future<Output = Result<T>> + Send + '_
  where
    T: Send + 'static,
    F: FnOnce(&mut dyn PersonRepository<Error = Self::Error>) -> Result<T>
      + Send
      + 'static;

  /// Run `work`, which only reads, inside one transaction.
  ///
  /// Backends may skip the write lock here. The default runs `work` as an
  /// ordinary [`unit_of_work`](Self::unit_of_work).
  fn read<T, F>(&self, work: F) -> impl Future<Output = Result<T>> + Send + '_
  where
    T: Send + 'static,
    F: FnOnce(&mut dyn PersonRepository<Error = Self::Error>) -> Result<T>
      + Send
      + 'static,
  {
    self.unit_of_work(work)
  }
}
