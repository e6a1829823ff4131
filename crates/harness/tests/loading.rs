use accountfix_core::{PropertyKey, PropertyValue};
use accountfix_harness::TestStore;
use accountfix_storage::AccountManager;

// ============================================================================
// Load policy: which rows become accounts and properties
// ============================================================================

#[test]
fn empty_store_loads_no_accounts() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    assert!(store.manager.load()?.is_empty());
    Ok(())
}

#[test]
fn store_without_the_account_type_loads_no_accounts() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::without_account_type()?;
    store.insert_account(Some("Work"))?;
    assert!(store.manager.load()?.is_empty());
    Ok(())
}

#[test]
fn accounts_load_in_retrieval_order_with_their_properties() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    let work = store.insert_account(Some("Work"))?;
    let home = store.insert_account(Some("Home"))?;
    store.insert_property(work, "Hostname", &PropertyValue::Text("imap.example.com".into()))?;
    store.insert_property(work, "PortNumber", &PropertyValue::Integer(993))?;
    store.insert_property(home, "AllowsInsecureAuthentication", &PropertyValue::Boolean(true))?;

    let accounts = store.manager.load()?;
    assert_eq!(accounts.len(), 2);

    assert_eq!(accounts[0].id(), work);
    assert_eq!(accounts[0].description(), "Work");
    assert_eq!(
        accounts[0].read_value(PropertyKey::Hostname),
        Some(PropertyValue::Text("imap.example.com".into()))
    );
    assert_eq!(
        accounts[0].read_value(PropertyKey::PortNumber),
        Some(PropertyValue::Integer(993))
    );

    assert_eq!(accounts[1].id(), home);
    assert_eq!(accounts[1].description(), "Home");
    assert_eq!(
        accounts[1].read_value(PropertyKey::AllowsInsecureAuthentication),
        Some(PropertyValue::Boolean(true))
    );

    // Freshly loaded accounts are clean on every axis
    for account in &accounts {
        assert!(!account.is_description_dirty());
        assert!(!account.is_any_property_dirty());
    }
    Ok(())
}

#[test]
fn accounts_without_a_description_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.insert_account(None)?;
    let named = store.insert_account(Some("Named"))?;

    let accounts = store.manager.load()?;
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id(), named);
    Ok(())
}

#[test]
fn child_accounts_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    let parent = store.insert_account(Some("Parent"))?;
    store.insert_child_account(parent, "Child")?;

    let accounts = store.manager.load()?;
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id(), parent);
    Ok(())
}

#[test]
fn load_fails_when_the_store_cannot_be_opened() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    let manager = AccountManager::new(store.root().join("missing"), "Accounts4.sqlite");
    assert!(manager.load().is_err());
    Ok(())
}

// ============================================================================
// Per-row tolerance: one bad property never sinks the entity
// ============================================================================

#[test]
fn unrecognized_property_keys_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    let pk = store.insert_account(Some("Work"))?;
    store.insert_property(pk, "NotARealKey", &PropertyValue::Boolean(true))?;
    store.insert_property(pk, "Hostname", &PropertyValue::Text("imap.example.com".into()))?;

    let accounts = store.manager.load()?;
    assert_eq!(accounts[0].property_count(), 1);
    assert_eq!(
        accounts[0].read_value(PropertyKey::Hostname),
        Some(PropertyValue::Text("imap.example.com".into()))
    );
    Ok(())
}

#[test]
fn undecodable_property_values_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    let pk = store.insert_account(Some("Work"))?;
    store.insert_raw_property(pk, "ServerPath", &[0xc1, 0xde, 0xad])?;
    store.insert_property(pk, "PortNumber", &PropertyValue::Integer(143))?;

    let accounts = store.manager.load()?;
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].property_count(), 1);
    assert_eq!(accounts[0].read_value(PropertyKey::ServerPath), None);
    assert_eq!(
        accounts[0].read_value(PropertyKey::PortNumber),
        Some(PropertyValue::Integer(143))
    );
    Ok(())
}

#[test]
fn legacy_textual_port_number_loads_as_a_clean_integer() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    let pk = store.insert_account(Some("Legacy"))?;
    store.insert_property(pk, "PortNumber", &PropertyValue::Text("993".into()))?;

    let accounts = store.manager.load()?;
    let account = &accounts[0];
    assert_eq!(account.read_value(PropertyKey::PortNumber), Some(PropertyValue::Integer(993)));
    // Coercion happens at load; the property must not look edited
    assert!(!account.is_any_property_dirty());
    Ok(())
}

#[test]
fn read_only_keys_load_for_inspection_but_reject_writes() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    let pk = store.insert_account(Some("Work"))?;
    store.insert_property(pk, "SSLEnabled", &PropertyValue::Boolean(true))?;

    let mut accounts = store.manager.load()?;
    let account = &mut accounts[0];
    assert_eq!(account.read_value(PropertyKey::SslEnabled), Some(PropertyValue::Boolean(true)));

    assert!(account.write_value(PropertyKey::SslEnabled, &PropertyValue::Boolean(false)).is_err());
    // The loaded value is untouched and nothing became dirty
    assert_eq!(account.read_value(PropertyKey::SslEnabled), Some(PropertyValue::Boolean(true)));
    assert!(!account.is_any_property_dirty());
    Ok(())
}
