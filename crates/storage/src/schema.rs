use rusqlite::Connection;

use crate::error::StorageError;

/// Account-kind identifier for the records this crate edits.
pub const IMAP_ACCOUNT_TYPE: &str = "com.apple.account.IMAP";

/// Core Data bookkeeping values observed on property rows written by the
/// owning system; inserted rows must carry the same ones.
pub const PROPERTY_ENT: i64 = 3;
pub const PROPERTY_OPT: i64 = 1;

/// Default store location relative to the user's home directory.
pub const DEFAULT_DB_SUBDIR: &str = "Library/Accounts";
pub const DEFAULT_DB_NAME: &str = "Accounts4.sqlite";

/// Create the externally-owned table layout in a scratch database.
///
/// The real store is created and migrated by its owning system; the
/// repository never runs DDL against it. This exists so tests can provision
/// a database with the same shape.
pub fn provision(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS ZACCOUNTTYPE (
    Z_PK INTEGER PRIMARY KEY,
    ZIDENTIFIER TEXT
);

CREATE TABLE IF NOT EXISTS ZACCOUNT (
    Z_PK INTEGER PRIMARY KEY,
    ZACCOUNTTYPE INTEGER NOT NULL,
    ZPARENTACCOUNT INTEGER,
    ZACCOUNTDESCRIPTION TEXT
);

CREATE TABLE IF NOT EXISTS ZACCOUNTPROPERTY (
    Z_PK INTEGER PRIMARY KEY,
    Z_ENT INTEGER,
    Z_OPT INTEGER,
    ZOWNER INTEGER NOT NULL,
    ZKEY TEXT NOT NULL,
    ZVALUE BLOB NOT NULL
);
";
