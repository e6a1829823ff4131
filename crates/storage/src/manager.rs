use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, warn};

use accountfix_core::{AccountInfo, Property};

use crate::backup;
use crate::error::StorageError;
use crate::schema::{IMAP_ACCOUNT_TYPE, PROPERTY_ENT, PROPERTY_OPT};

/// Repository over the externally-owned account store.
///
/// A connection is opened per `load`/`save` call and never held across
/// calls; the store file belongs to another system and this crate only
/// borrows it briefly. All access is single-threaded and synchronous.
pub struct AccountManager {
    db_dir: PathBuf,
    db_name: String,
}

impl AccountManager {
    pub fn new(db_dir: impl Into<PathBuf>, db_name: impl Into<String>) -> Self {
        Self {
            db_dir: db_dir.into(),
            db_name: db_name.into(),
        }
    }

    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_dir.join(&self.db_name)
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        Ok(Connection::open(self.db_path())?)
    }

    /// Load every parentless account of the recognized kind, in retrieval
    /// order. Accounts without a description are skipped entirely; property
    /// rows with unrecognized keys or undecodable blobs are skipped without
    /// sinking their account. Any SQL error fails the whole load.
    pub fn load(&self) -> Result<Vec<AccountInfo>, StorageError> {
        let conn = self.connect()?;

        let Some(type_id) = find_account_type_id(&conn, IMAP_ACCOUNT_TYPE)? else {
            debug!(identifier = IMAP_ACCOUNT_TYPE, "account type not present in store");
            return Ok(Vec::new());
        };

        let mut stmt = conn.prepare(
            "SELECT Z_PK, ZACCOUNTDESCRIPTION FROM ZACCOUNT
             WHERE ZACCOUNTTYPE = ?1 AND ZPARENTACCOUNT IS NULL",
        )?;
        let rows = stmt
            .query_map([type_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut accounts = Vec::new();
        for (pk, description) in rows {
            let Some(description) = description else {
                debug!(account = pk, "skipping account without description");
                continue;
            };
            accounts.push(load_account(&conn, pk, description)?);
        }
        debug!(count = accounts.len(), "loaded accounts");
        Ok(accounts)
    }

    /// Persist the dirty subset of one account.
    ///
    /// With `with_backup` the whole store directory is snapshotted first; a
    /// backup failure aborts the call before anything is written. After
    /// that, writes are best-effort per field: a failed field is logged and
    /// stays dirty, the rest proceed, and the call still returns `Ok`.
    pub fn save(&self, account: &mut AccountInfo, with_backup: bool) -> Result<(), StorageError> {
        if with_backup {
            backup::backup_store_dir(&self.db_dir)?;
        }

        let conn = self.connect()?;
        store_description(&conn, account);
        store_properties(&conn, account);
        Ok(())
    }

    /// Discard every in-memory edit on the account. Never touches storage.
    pub fn reset(&self, account: &mut AccountInfo) {
        account.rollback_description();
        account.bulk_rollback();
    }
}

fn find_account_type_id(conn: &Connection, identifier: &str) -> Result<Option<i64>, StorageError> {
    let mut stmt = conn.prepare("SELECT Z_PK FROM ZACCOUNTTYPE WHERE ZIDENTIFIER = ?1 LIMIT 1")?;
    let mut rows = stmt.query_map([identifier], |row| row.get::<_, i64>(0))?;
    match rows.next() {
        Some(id) => Ok(Some(id?)),
        None => Ok(None),
    }
}

fn load_account(conn: &Connection, pk: i64, description: String) -> Result<AccountInfo, StorageError> {
    let mut account = AccountInfo::new(pk, description);

    let mut stmt =
        conn.prepare("SELECT Z_PK, ZKEY, ZVALUE FROM ZACCOUNTPROPERTY WHERE ZOWNER = ?1")?;
    let rows = stmt.query_map([pk], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Vec<u8>>(2)?,
        ))
    })?;

    for row in rows {
        let (row_id, key, bytes) = row?;
        // Unknown keys and undecodable blobs lose that row only
        if let Err(e) = account.load_value(&key, bytes, row_id) {
            warn!(account = pk, key = %key, error = %e, "skipping property row");
        }
    }
    Ok(account)
}

fn store_description(conn: &Connection, account: &mut AccountInfo) {
    if !account.is_description_dirty() {
        return;
    }
    let result = conn.execute(
        "UPDATE ZACCOUNT SET ZACCOUNTDESCRIPTION = ?1 WHERE Z_PK = ?2",
        rusqlite::params![account.description(), account.id()],
    );
    match result {
        Ok(_) => account.commit_description(),
        Err(e) => warn!(account = account.id(), error = %e, "description update failed"),
    }
}

fn store_properties(conn: &Connection, account: &mut AccountInfo) {
    for key in account.dirty_property_keys() {
        let Some(property) = account.property(key) else {
            continue;
        };
        match upsert_property(conn, property) {
            Ok(row_id) => {
                // Marks the field clean and records a newly assigned id
                let _ = account.commit_property(key, row_id);
            }
            Err(e) => {
                warn!(account = account.id(), key = %key, error = %e, "property write failed");
            }
        }
    }
}

/// Update the existing row when the property has a storage id, insert a new
/// one otherwise. Returns the row id the caller must commit back into the
/// property.
fn upsert_property(conn: &Connection, property: &Property) -> Result<i64, StorageError> {
    match property.id() {
        Some(row_id) => {
            conn.execute(
                "UPDATE ZACCOUNTPROPERTY
                 SET Z_ENT = ?1, Z_OPT = ?2, ZOWNER = ?3, ZKEY = ?4, ZVALUE = ?5
                 WHERE Z_PK = ?6",
                rusqlite::params![
                    PROPERTY_ENT,
                    PROPERTY_OPT,
                    property.owner_id(),
                    property.key().as_str(),
                    property.encoded(),
                    row_id,
                ],
            )?;
            Ok(row_id)
        }
        None => {
            conn.execute(
                "INSERT INTO ZACCOUNTPROPERTY (Z_ENT, Z_OPT, ZOWNER, ZKEY, ZVALUE)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    PROPERTY_ENT,
                    PROPERTY_OPT,
                    property.owner_id(),
                    property.key().as_str(),
                    property.encoded(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        }
    }
}
