use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use rusqlite::Connection;
use tempfile::TempDir;

use accountfix_core::PropertyValue;
use accountfix_storage::schema::{self, DEFAULT_DB_NAME, IMAP_ACCOUNT_TYPE, PROPERTY_ENT, PROPERTY_OPT};
use accountfix_storage::{AccountManager, StorageError};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A scratch account store with the externally-owned table layout, plus an
/// `AccountManager` pointed at it. Row-level helpers write and read the raw
/// tables directly so tests can seed fixtures and verify what the
/// repository actually persisted.
pub struct TestStore {
    root: TempDir,
    store_dir: PathBuf,
    pub manager: AccountManager,
    type_id: i64,
}

impl TestStore {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        init_tracing();

        let root = tempfile::tempdir()?;
        let store_dir = root.path().join("Accounts");
        fs::create_dir(&store_dir)?;

        let conn = Connection::open(store_dir.join(DEFAULT_DB_NAME))?;
        schema::provision(&conn)?;
        conn.execute(
            "INSERT INTO ZACCOUNTTYPE (ZIDENTIFIER) VALUES (?1)",
            [IMAP_ACCOUNT_TYPE],
        )?;
        let type_id = conn.last_insert_rowid();

        let manager = AccountManager::new(&store_dir, DEFAULT_DB_NAME);
        Ok(Self {
            root,
            store_dir,
            manager,
            type_id,
        })
    }

    /// A store whose account type row is missing, so `load` finds nothing.
    pub fn without_account_type() -> Result<Self, Box<dyn std::error::Error>> {
        let store = Self::new()?;
        store.connect()?.execute("DELETE FROM ZACCOUNTTYPE", [])?;
        Ok(store)
    }

    /// Parent directory of the store directory; backups land here as
    /// timestamped siblings.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    pub fn connect(&self) -> Result<Connection, StorageError> {
        Ok(Connection::open(self.store_dir.join(DEFAULT_DB_NAME))?)
    }

    /// Insert a parentless account of the recognized kind.
    pub fn insert_account(
        &self,
        description: Option<&str>,
    ) -> Result<i64, Box<dyn std::error::Error>> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO ZACCOUNT (ZACCOUNTTYPE, ZPARENTACCOUNT, ZACCOUNTDESCRIPTION)
             VALUES (?1, NULL, ?2)",
            rusqlite::params![self.type_id, description],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert a child account; the repository must never load these.
    pub fn insert_child_account(
        &self,
        parent: i64,
        description: &str,
    ) -> Result<i64, Box<dyn std::error::Error>> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO ZACCOUNT (ZACCOUNTTYPE, ZPARENTACCOUNT, ZACCOUNTDESCRIPTION)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![self.type_id, parent, description],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert a property row holding the encoded value.
    pub fn insert_property(
        &self,
        owner: i64,
        key: &str,
        value: &PropertyValue,
    ) -> Result<i64, Box<dyn std::error::Error>> {
        self.insert_raw_property(owner, key, &value.encode()?)
    }

    /// Insert a property row with arbitrary bytes, bypassing the codec.
    pub fn insert_raw_property(
        &self,
        owner: i64,
        key: &str,
        bytes: &[u8],
    ) -> Result<i64, Box<dyn std::error::Error>> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO ZACCOUNTPROPERTY (Z_ENT, Z_OPT, ZOWNER, ZKEY, ZVALUE)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![PROPERTY_ENT, PROPERTY_OPT, owner, key, bytes],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Key and raw value of one property row, if it exists.
    pub fn property_row(
        &self,
        row_id: i64,
    ) -> Result<Option<(String, Vec<u8>)>, Box<dyn std::error::Error>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT ZKEY, ZVALUE FROM ZACCOUNTPROPERTY WHERE Z_PK = ?1")?;
        let mut rows = stmt.query_map([row_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
        })?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn property_count(&self, owner: i64) -> Result<i64, Box<dyn std::error::Error>> {
        let conn = self.connect()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM ZACCOUNTPROPERTY WHERE ZOWNER = ?1",
            [owner],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Stored description of one account row.
    pub fn description_of(&self, pk: i64) -> Result<Option<String>, Box<dyn std::error::Error>> {
        let conn = self.connect()?;
        let description = conn.query_row(
            "SELECT ZACCOUNTDESCRIPTION FROM ZACCOUNT WHERE Z_PK = ?1",
            [pk],
            |row| row.get(0),
        )?;
        Ok(description)
    }

    /// Paths of backup directories created next to the store.
    pub fn backup_dirs(&self) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(self.root.path())? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() && name.starts_with("Accounts-") {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}
