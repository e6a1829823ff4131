use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::warn;

use crate::error::CoreError;
use crate::keys::PropertyKey;
use crate::property::Property;
use crate::value::PropertyValue;

/// One account record: a description plus at most one property per key.
///
/// Accounts are never created here, only loaded from the store and edited,
/// so the storage id is always present. The description follows the same
/// stored/working dual-buffer pattern as each property; rollback and commit
/// are selective per field.
#[derive(Debug)]
pub struct AccountInfo {
    id: i64,
    stored_description: String,
    current_description: String,
    properties: BTreeMap<PropertyKey, Property>,
}

impl AccountInfo {
    pub fn new(id: i64, description: String) -> Self {
        Self {
            id,
            stored_description: description.clone(),
            current_description: description,
            properties: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// The working description (including uncommitted edits).
    pub fn description(&self) -> &str {
        &self.current_description
    }

    pub fn update_description(&mut self, description: impl Into<String>) {
        self.current_description = description.into();
    }

    pub fn commit_description(&mut self) {
        self.stored_description = self.current_description.clone();
    }

    pub fn rollback_description(&mut self) {
        self.current_description = self.stored_description.clone();
    }

    pub fn is_description_dirty(&self) -> bool {
        self.stored_description != self.current_description
    }

    /// Read the working value for a key. Absent for keys with no loaded or
    /// edited property, and for blobs that no longer decode; callers that
    /// need to tell those apart must check the property directly.
    pub fn read_value(&self, key: PropertyKey) -> Option<PropertyValue> {
        self.properties.get(&key)?.value().ok()
    }

    /// Write a value under a key on the allow-list, creating the property if
    /// it does not exist yet. Writes to read-only keys are rejected with a
    /// diagnostic; default callers ignore the result, tests observe it.
    pub fn write_value(&mut self, key: PropertyKey, value: &PropertyValue) -> Result<(), CoreError> {
        if !key.is_writable() {
            warn!(key = %key, "rejected write to non-writable property key");
            return Err(CoreError::UnwritableKey(key));
        }
        match self.properties.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().set_value(value)?,
            Entry::Vacant(entry) => {
                entry.insert(Property::from_edit(key, value, self.id)?);
            }
        }
        Ok(())
    }

    /// Load one stored property row. Any recognized key is accepted so that
    /// read-only properties remain inspectable; unrecognized key strings and
    /// undecodable blobs are rejected, and the caller skips that row only.
    pub fn load_value(&mut self, key_str: &str, bytes: Vec<u8>, row_id: i64) -> Result<(), CoreError> {
        let Some(key) = PropertyKey::parse(key_str) else {
            warn!(key = key_str, account = self.id, "skipping unrecognized property key");
            return Err(CoreError::UnknownKey(key_str.to_string()));
        };
        let property = Property::from_row(row_id, key, bytes, self.id)?;
        self.properties.insert(key, property);
        Ok(())
    }

    /// Mark a property as persisted under a storage id, after a successful
    /// write. A missing entry means the repository and this account disagree
    /// about what was saved; that is logged, not propagated as a crash.
    pub fn commit_property(&mut self, key: PropertyKey, id: i64) -> Result<(), CoreError> {
        match self.properties.get_mut(&key) {
            Some(property) => {
                property.commit(id);
                Ok(())
            }
            None => {
                warn!(key = %key, account = self.id, "commit for a property that is not loaded");
                Err(CoreError::MissingProperty(key))
            }
        }
    }

    /// Discard every in-memory property edit: persisted properties revert to
    /// their stored blobs, never-persisted ones are forgotten entirely.
    /// Idempotent.
    pub fn bulk_rollback(&mut self) {
        self.properties.retain(|_, property| property.rollback());
    }

    pub fn is_any_property_dirty(&self) -> bool {
        self.properties.values().any(Property::is_dirty)
    }

    pub fn property(&self, key: PropertyKey) -> Option<&Property> {
        self.properties.get(&key)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Keys of every currently dirty property, in key order.
    pub fn dirty_property_keys(&self) -> Vec<PropertyKey> {
        self.properties
            .values()
            .filter(|p| p.is_dirty())
            .map(Property::key)
            .collect()
    }
}
