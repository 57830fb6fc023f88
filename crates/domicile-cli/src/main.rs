//! `domicile` — manage a register of persons and their shared addresses.
//!
//! # Usage
//!
//! ```text
//! domicile add --first-name Ann --last-name Lee --birthdate 1990-01-01 \
//!   --gender female --street Main --number 1 --zip 1000 --city X --country Y
//! domicile list --json
//! domicile import people.xml
//! ```
//!
//! The database location comes from `store_path` in `domicile.toml` (or the
//! file given with `--config`), overridable with `DOMICILE_STORE_PATH`.

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use domicile_core::{Registry, model::Gender};
use domicile_store_sqlite::SqliteStore;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "Person register with shared addresses")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "domicile.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Store a new person.
  Add(PersonArgs),
  /// Replace every field of a stored person.
  Update {
    id:     i64,
    #[command(flatten)]
    person: PersonArgs,
  },
  /// Remove a person, and its address if nobody else lives there.
  Delete { id: i64 },
  /// Print one person.
  Show { id: i64 },
  /// Print every person.
  List {
    /// Print JSON instead of one line per person.
    #[arg(long)]
    json: bool,
  },
  /// Print every stored address.
  Addresses,
  /// Save the persons in an XML file, skipping ones already stored.
  Import { file: PathBuf },
  /// Write every person to an XML file.
  Export { file: PathBuf },
  /// Remove all persons and addresses.
  Purge,
}

#[derive(Args, Debug)]
struct PersonArgs {
  #[arg(long, value_parser = commands::trimmed_text)]
  first_name: String,
  #[arg(long, value_parser = commands::trimmed_text)]
  last_name:  String,
  /// Date of birth, YYYY-MM-DD.
  #[arg(long)]
  birthdate:  NaiveDate,
  /// MALE or FEMALE, in any case.
  #[arg(long, value_parser = commands::parse_gender)]
  gender:     Gender,
  #[arg(long, value_parser = commands::trimmed_text)]
  street:     String,
  /// House number, e.g. `22b`.
  #[arg(long, value_parser = commands::trimmed_text)]
  number:     String,
  #[arg(long)]
  zip:        u32,
  #[arg(long, value_parser = commands::trimmed_text)]
  city:       String,
  #[arg(long, value_parser = commands::trimmed_text)]
  country:    String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;
  let store_path = settings.store_path();

  let store = SqliteStore::open(&store_path).await.with_context(|| {
    format!("failed to open store at {}", store_path.display())
  })?;
  tracing::debug!(path = %store_path.display(), "store ready");

  let registry = Registry::new(store);
  let outcome = commands::run(&registry, cli.command).await;
  registry
    .into_store()
    .close()
    .await
    .context("failed to close store")?;
  outcome
}
