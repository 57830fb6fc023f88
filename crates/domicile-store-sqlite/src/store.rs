//! [`SqliteStore`] — the SQLite implementation of [`PersonStore`].

use std::path::Path;

use domicile_core::{
  Error as CoreError, Result as CoreResult,
  model::{Address, AddressId, AddressValue, Person, PersonId, PersonValue},
  store::{AddressRepository, PersonRepository, PersonStore},
};
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use crate::{
  Result,
  encode::{
    ADDRESS_COLUMNS, PERSON_COLUMNS, RawAddress, RawPerson, encode_date,
    encode_gender,
  },
  error::Error,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A person register backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the connection, waiting for queued work to finish. Other clones
  /// of this store fail from then on.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = Error;

  async fn unit_of_work<T, F>(&self, work: F) -> CoreResult<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut dyn PersonRepository<Error = Error>) -> CoreResult<T>
      + Send
      + 'static,
  {
    // IMMEDIATE takes the write lock up front, so the reference counts the
    // registry reads cannot change before it writes.
    self.transact(TransactionBehavior::Immediate, work).await
  }

  async fn read<T, F>(&self, work: F) -> CoreResult<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut dyn PersonRepository<Error = Error>) -> CoreResult<T>
      + Send
      + 'static,
  {
    // DEFERRED only takes a shared lock, which WAL lets run beside a writer.
    self.transact(TransactionBehavior::Deferred, work).await
  }
}

impl SqliteStore {
  async fn transact<T, F>(
    &self,
    behavior: TransactionBehavior,
    work: F,
  ) -> CoreResult<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut dyn PersonRepository<Error = Error>) -> CoreResult<T>
      + Send
      + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(behavior)?;
        let mut repo = SqliteTx { tx };
        let outcome = work(&mut repo);
        if outcome.is_ok() {
          repo.tx.commit()?;
        }
        // Dropping an uncommitted transaction rolls it back.
        Ok(outcome)
      })
      .await
      .map_err(|e| CoreError::storage(Error::Database(e)))?
  }
}

// ─── Transaction ─────────────────────────────────────────────────────────────

/// Repository view of one open transaction.
struct SqliteTx<'c> {
  tx: rusqlite::Transaction<'c>,
}

impl AddressRepository for SqliteTx<'_> {
  type Error = Error;

  fn find_address(&mut self, id: AddressId) -> Result<Option<Address>> {
    let raw = self
      .tx
      .prepare_cached(&format!(
        "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE address_id = ?1"
      ))?
      .query_row(rusqlite::params![id.0], |row| RawAddress::from_row(row, 0))
      .optional()?;
    Ok(raw.map(RawAddress::into_address))
  }

  fn find_address_by_value(
    &mut self,
    value: &AddressValue,
  ) -> Result<Option<Address>> {
    let raw = self
      .tx
      .prepare_cached(&format!(
        "SELECT {ADDRESS_COLUMNS} FROM addresses
         WHERE street = ?1 AND street_number = ?2 AND zip_code = ?3
           AND city = ?4 AND country = ?5
         ORDER BY address_id
         LIMIT 1"
      ))?
      .query_row(
        rusqlite::params![
          value.street,
          value.street_number,
          value.zip_code,
          value.city,
          value.country,
        ],
        |row| RawAddress::from_row(row, 0),
      )
      .optional()?;
    Ok(raw.map(RawAddress::into_address))
  }

  fn list_addresses(&mut self) -> Result<Vec<Address>> {
    let mut stmt = self.tx.prepare_cached(&format!(
      "SELECT {ADDRESS_COLUMNS} FROM addresses ORDER BY address_id"
    ))?;
    let raws = stmt
      .query_map([], |row| RawAddress::from_row(row, 0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(raws.into_iter().map(RawAddress::into_address).collect())
  }

  fn insert_address(&mut self, value: &AddressValue) -> Result<Address> {
    self.tx.execute(
      "INSERT INTO addresses (street, street_number, zip_code, city, country)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      rusqlite::params![
        value.street,
        value.street_number,
        value.zip_code,
        value.city,
        value.country,
      ],
    )?;
    Ok(Address {
      address_id: AddressId(self.tx.last_insert_rowid()),
      value:      value.clone(),
    })
  }

  fn update_address(
    &mut self,
    id: AddressId,
    value: &AddressValue,
  ) -> Result<Option<Address>> {
    let changed = self.tx.execute(
      "UPDATE addresses
       SET street = ?1, street_number = ?2, zip_code = ?3, city = ?4, country = ?5
       WHERE address_id = ?6",
      rusqlite::params![
        value.street,
        value.street_number,
        value.zip_code,
        value.city,
        value.country,
        id.0,
      ],
    )?;
    Ok((changed > 0).then(|| Address { address_id: id, value: value.clone() }))
  }

  fn delete_address(&mut self, id: AddressId) -> Result<()> {
    self.tx.execute(
      "DELETE FROM addresses WHERE address_id = ?1",
      rusqlite::params![id.0],
    )?;
    Ok(())
  }
}

impl PersonRepository for SqliteTx<'_> {
  fn find_person(&mut self, id: PersonId) -> Result<Option<Person>> {
    let raw = self
      .tx
      .prepare_cached(&format!(
        "SELECT {PERSON_COLUMNS}
         FROM persons p
         JOIN addresses a ON a.address_id = p.address_id
         WHERE p.person_id = ?1"
      ))?
      .query_row(rusqlite::params![id.0], RawPerson::from_row)
      .optional()?;
    raw.map(RawPerson::into_person).transpose()
  }

  fn find_person_by_value(
    &mut self,
    value: &PersonValue,
  ) -> Result<Option<Person>> {
    let address = &value.address;
    let raw = self
      .tx
      .prepare_cached(&format!(
        "SELECT {PERSON_COLUMNS}
         FROM persons p
         JOIN addresses a ON a.address_id = p.address_id
         WHERE p.first_name = ?1 AND p.last_name = ?2
           AND p.birthdate = ?3 AND p.gender = ?4
           AND a.street = ?5 AND a.street_number = ?6 AND a.zip_code = ?7
           AND a.city = ?8 AND a.country = ?9
         ORDER BY p.person_id
         LIMIT 1"
      ))?
      .query_row(
        rusqlite::params![
          value.first_name,
          value.last_name,
          encode_date(value.birthdate),
          encode_gender(value.gender),
          address.street,
          address.street_number,
          address.zip_code,
          address.city,
          address.country,
        ],
        RawPerson::from_row,
      )
      .optional()?;
    raw.map(RawPerson::into_person).transpose()
  }

  fn list_persons(&mut self) -> Result<Vec<Person>> {
    let mut stmt = self.tx.prepare_cached(&format!(
      "SELECT {PERSON_COLUMNS}
       FROM persons p
       JOIN addresses a ON a.address_id = p.address_id
       ORDER BY p.person_id"
    ))?;
    let raws = stmt
      .query_map([], RawPerson::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawPerson::into_person).collect()
  }

  fn insert_person(
    &mut self,
    value: &PersonValue,
    address: &Address,
  ) -> Result<Person> {
    self.tx.execute(
      "INSERT INTO persons (address_id, first_name, last_name, birthdate, gender)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      rusqlite::params![
        address.address_id.0,
        value.first_name,
        value.last_name,
        encode_date(value.birthdate),
        encode_gender(value.gender),
      ],
    )?;
    let person_id = PersonId(self.tx.last_insert_rowid());
    Ok(Person::from_value(person_id, value, address.clone()))
  }

  fn update_person(
    &mut self,
    id: PersonId,
    value: &PersonValue,
    address: &Address,
  ) -> Result<Option<Person>> {
    let changed = self.tx.execute(
      "UPDATE persons
       SET address_id = ?1, first_name = ?2, last_name = ?3, birthdate = ?4, gender = ?5
       WHERE person_id = ?6",
      rusqlite::params![
        address.address_id.0,
        value.first_name,
        value.last_name,
        encode_date(value.birthdate),
        encode_gender(value.gender),
        id.0,
      ],
    )?;
    Ok((changed > 0).then(|| Person::from_value(id, value, address.clone())))
  }

  fn delete_person(&mut self, id: PersonId) -> Result<()> {
    self.tx.execute(
      "DELETE FROM persons WHERE person_id = ?1",
      rusqlite::params![id.0],
    )?;
    Ok(())
  }

  fn count_referencing(&mut self, address_id: AddressId) -> Result<u64> {
    let count: i64 = self.tx.query_row(
      "SELECT COUNT(*) FROM persons WHERE address_id = ?1",
      rusqlite::params![address_id.0],
      |row| row.get(0),
    )?;
    Ok(count as u64)
  }
}
