//! SQL schema for the Domicile SQLite store.
//!
//! Executed once at connection startup. There are no migrations; the
//! `user_version` pragma records the layout in case one is ever needed.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per distinct address value, shared by every person living there.
-- Rows are removed by the registry once nothing references them.
CREATE TABLE IF NOT EXISTS addresses (
    address_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    street        TEXT    NOT NULL,
    street_number TEXT    NOT NULL,
    zip_code      INTEGER NOT NULL,
    city          TEXT    NOT NULL,
    country       TEXT    NOT NULL,
    UNIQUE (street, street_number, zip_code, city, country)
);

CREATE TABLE IF NOT EXISTS persons (
    person_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    address_id INTEGER NOT NULL REFERENCES addresses(address_id),
    first_name TEXT    NOT NULL,
    last_name  TEXT    NOT NULL,
    birthdate  TEXT    NOT NULL,   -- ISO 8601 calendar date
    gender     TEXT    NOT NULL CHECK (gender IN ('MALE', 'FEMALE'))
);

CREATE INDEX IF NOT EXISTS persons_address_idx ON persons(address_id);

PRAGMA user_version = 1;
";
