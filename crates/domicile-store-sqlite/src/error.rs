//! Error type for `domicile-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("unknown gender: {0:?}")]
  UnknownGender(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
