//! Runtime settings, read from an optional TOML file and `DOMICILE_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
  /// SQLite database file; a leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf { PathBuf::from("domicile.db") }

impl Settings {
  /// Layer the file at `path` (if it exists) under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("DOMICILE"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let path = std::env::temp_dir().join("domicile-no-such-config.toml");
    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("domicile.db"));
  }

  #[test]
  fn file_sets_store_path() {
    let path = std::env::temp_dir()
      .join(format!("domicile-config-{}.toml", std::process::id()));
    std::fs::write(&path, "store_path = \"/var/lib/domicile/people.db\"\n")
      .unwrap();

    let settings = Settings::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(
      settings.store_path,
      PathBuf::from("/var/lib/domicile/people.db")
    );
  }

  #[test]
  fn tilde_is_expanded_against_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    let settings = Settings { store_path: PathBuf::from("~/people.db") };
    assert_eq!(settings.store_path(), PathBuf::from(home).join("people.db"));
  }
}
