use crate::error::CoreError;
use crate::keys::PropertyKey;
use crate::value::{self, PropertyValue};

/// One keyed field of one account, tracked independently.
///
/// Two blobs live side by side: `stored` is what the database currently
/// holds (absent until the first successful commit), `current` is the
/// working value. The property is dirty when the blobs differ byte-wise or
/// when it has never been persisted.
#[derive(Debug, Clone)]
pub struct Property {
    id: Option<i64>,
    key: PropertyKey,
    owner_id: i64,
    stored: Option<Vec<u8>>,
    current: Vec<u8>,
}

impl Property {
    /// Build a clean property from a stored row. The blob is validated and
    /// legacy port-number text is coerced to a native integer here, once,
    /// so everything downstream sees it as if it had always been numeric.
    pub fn from_row(
        id: i64,
        key: PropertyKey,
        bytes: Vec<u8>,
        owner_id: i64,
    ) -> Result<Self, CoreError> {
        let stored = value::normalize(key, bytes)?;
        Ok(Self {
            id: Some(id),
            key,
            owner_id,
            stored: Some(stored.clone()),
            current: stored,
        })
    }

    /// Build a never-persisted property from a user edit. It stays dirty
    /// until the repository commits it with a storage-assigned id.
    pub fn from_edit(
        key: PropertyKey,
        value: &PropertyValue,
        owner_id: i64,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            id: None,
            key,
            owner_id,
            stored: None,
            current: value.encode()?,
        })
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn key(&self) -> PropertyKey {
        self.key
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    /// Decode the working value.
    pub fn value(&self) -> Result<PropertyValue, CoreError> {
        PropertyValue::decode(&self.current)
    }

    /// The raw working blob, exactly as the repository will write it.
    pub fn encoded(&self) -> &[u8] {
        &self.current
    }

    /// Replace the working value. Never touches the stored blob.
    pub fn set_value(&mut self, value: &PropertyValue) -> Result<(), CoreError> {
        self.current = value.encode()?;
        Ok(())
    }

    /// Whether this property has ever been persisted.
    pub fn is_persisted(&self) -> bool {
        self.stored.is_some()
    }

    /// Byte-wise comparison of the blobs, not semantic equality of the
    /// decoded scalars. Two encoders may produce different bytes for the
    /// same value; observable save behavior depends on keeping this exact.
    pub fn is_dirty(&self) -> bool {
        match &self.stored {
            Some(stored) => *stored != self.current,
            None => true,
        }
    }

    /// Mark the working value as persisted under the given storage id.
    /// Called by the repository after a successful write.
    pub fn commit(&mut self, id: i64) {
        self.id = Some(id);
        self.stored = Some(self.current.clone());
    }

    /// Revert the working value to the stored blob. Returns `false` when the
    /// property was never persisted, in which case there is nothing to revert
    /// to and the owning account drops the property instead.
    pub fn rollback(&mut self) -> bool {
        match &self.stored {
            Some(stored) => {
                self.current = stored.clone();
                true
            }
            None => false,
        }
    }
}
