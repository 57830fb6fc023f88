//! Error types for `domicile-core`.

use thiserror::Error;

use crate::model::{AddressId, PersonId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("person not found: {0}")]
  PersonNotFound(PersonId),

  #[error("address not found: {0}")]
  AddressNotFound(AddressId),

  /// A person with the same value is already stored under the given id.
  #[error("an identical person is already stored as {0}")]
  DuplicatePerson(PersonId),

  /// The backend failed to read, write, commit or roll back.
  #[error("storage failure: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error as [`Error::Storage`].
  pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Storage(Box::new(err))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::PersonNotFound(_) | Self::AddressNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
