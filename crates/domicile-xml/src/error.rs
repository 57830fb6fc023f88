//! Error types for the domicile-xml codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed person document: {0}")]
  Deserialize(#[from] quick_xml::de::DeError),

  #[error("cannot write person document: {0}")]
  Serialize(#[from] quick_xml::se::SeError),

  /// Text content is trimmed on read, so padded values cannot be written.
  #[error("{field} has leading or trailing whitespace: {value:?}")]
  Untrimmed { field: &'static str, value: String },

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
