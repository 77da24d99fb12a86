// Copyright 2023 Remi Bernotavicius

use crate::error::{Error, Result};
use diesel::prelude::Connection as _;
use diesel::RunQueryDsl as _;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::Path;

pub mod models;
pub mod schema;

pub type Connection = diesel::sqlite::SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

diesel::define_sql_function! {
    /// Lowercases the whole of Unicode. SQLite's `lower()` and `LIKE` only fold
    /// ASCII.
    fn lower_unicode(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Opens the database at `url` and brings its schema up to date. `url` may be
/// a file path or `:memory:`.
pub fn establish(url: &str) -> Result<Connection> {
    let mut connection = Connection::establish(url)?;
    // SQLite leaves foreign keys (and so every ON DELETE CASCADE) off unless
    // asked per connection.
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut connection)?;
    lower_unicode_utils::register_impl(&mut connection, |x: String| x.to_lowercase())?;
    connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(Error::Migration)?;
    Ok(connection)
}

pub fn establish_connection(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let url = path.to_str().ok_or_else(|| {
        Error::validation("database", format!("path {path:?} is not valid UTF-8"))
    })?;
    establish(url)
}

#[cfg(test)]
pub fn test_connection() -> Connection {
    establish(":memory:").unwrap()
}

#[test]
fn migrations() {
    let mut conn = test_connection();
    conn.revert_all_migrations(MIGRATIONS).unwrap();
    conn.run_pending_migrations(MIGRATIONS).unwrap();
}

#[test]
fn lower_unicode_folds_cyrillic() {
    let mut conn = test_connection();
    let lowered: String = diesel::select(lower_unicode("МОЛОКО Almidón"))
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(lowered, "молоко almidón");
}

#[test]
fn foreign_keys_are_enforced() {
    use diesel::sql_types::Integer;

    #[derive(diesel::QueryableByName)]
    struct Pragma {
        #[diesel(sql_type = Integer)]
        foreign_keys: i32,
    }

    let mut conn = test_connection();
    let pragma: Pragma = diesel::sql_query("PRAGMA foreign_keys")
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(pragma.foreign_keys, 1);
}
