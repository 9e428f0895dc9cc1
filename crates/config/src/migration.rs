use std::path::Path;
use std::sync::Arc;
use toml_edit::{DocumentMut, Item, Table, Value};

/// Migrates config file to latest format if needed
pub async fn migrate_config_if_needed<P: AsRef<Path>>(
    path: P,
    events: Option<&Arc<snapvault_events::EventBus>>,
) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    let mut doc = content.parse::<DocumentMut>()?;

    let added_fields = migrate_document(&mut doc)?;

    // Only write if we added fields
    if !added_fields.is_empty() {
        tokio::fs::write(path.as_ref(), doc.to_string()).await?;
        tracing::debug!("Config migrated: {:?}", added_fields);

        if let Some(event_bus) = events {
            event_bus.emit(snapvault_events::AppEvent::ConfigMigrated {
                added_fields: added_fields.clone(),
            });
        }
    }

    Ok(())
}

/// Applies every section migration, returning the names of touched fields
pub(crate) fn migrate_document(doc: &mut DocumentMut) -> anyhow::Result<Vec<String>> {
    let mut added_fields = Vec::new();

    migrate_storage_section(doc, &mut added_fields)?;
    migrate_tracker_section(doc, &mut added_fields)?;
    migrate_auth_section(doc, &mut added_fields)?;
    migrate_users_array(doc, &mut added_fields)?;

    Ok(added_fields)
}

fn migrate_storage_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> anyhow::Result<()> {
    ensure_table(doc.as_table_mut(), "storage", added_fields);

    let storage = doc["storage"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Invalid [storage] section in config"))?;

    // Older files called the directory backend "local"
    let legacy_backend = matches!(
        storage.get("backend"),
        Some(Item::Value(Value::String(kind))) if kind.value() == "local"
    );
    if legacy_backend {
        storage["backend"] = Item::Value(Value::from("directory"));
        added_fields.push("storage.backend (renamed local -> directory)".to_string());
    }

    ensure_field(storage, "local_dir", Value::from("snapvault/files"), added_fields);
    ensure_field(storage, "backend", Value::from("directory"), added_fields);
    ensure_field(storage, "remote_dir", Value::from("snapvault/cloud"), added_fields);

    ensure_table(storage, "s3", added_fields);
    let s3 = storage["s3"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Invalid [storage.s3] section in config"))?;
    ensure_field(s3, "enabled", Value::from(false), added_fields);
    ensure_field(s3, "endpoint_url", Value::from(""), added_fields);
    ensure_field(s3, "region", Value::from("auto"), added_fields);
    ensure_field(s3, "access_key_id", Value::from(""), added_fields);
    ensure_field(s3, "secret_access_key", Value::from(""), added_fields);
    ensure_field(s3, "bucket_name", Value::from("snapvault-media"), added_fields);
    ensure_field(s3, "bucket_prefix", Value::from(""), added_fields);

    Ok(())
}

fn migrate_tracker_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> anyhow::Result<()> {
    ensure_table(doc.as_table_mut(), "tracker", added_fields);

    let tracker = doc["tracker"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Invalid [tracker] section in config"))?;
    ensure_field(tracker, "purge_remote_duplicates", Value::from(true), added_fields);
    ensure_field(tracker, "purge_untracked_local", Value::from(true), added_fields);

    Ok(())
}

fn migrate_auth_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> anyhow::Result<()> {
    ensure_table(doc.as_table_mut(), "auth", added_fields);

    let auth = doc["auth"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Invalid [auth] section in config"))?;
    ensure_field(auth, "region", Value::from("us-east-1"), added_fields);

    Ok(())
}

fn migrate_users_array(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> anyhow::Result<()> {
    // Only touch an existing users array, never create an empty one
    if let Some(users) = doc
        .get_mut("users")
        .and_then(|u| u.as_array_of_tables_mut())
    {
        for (idx, user_table) in users.iter_mut().enumerate() {
            if !user_table.contains_key("confirmed") {
                user_table.insert("confirmed", Item::Value(Value::from(false)));
                added_fields.push(format!("users[{}].confirmed", idx));
            }
        }
    }

    Ok(())
}

fn ensure_table(parent: &mut Table, key: &str, added_fields: &mut Vec<String>) {
    if !parent.contains_key(key) {
        parent.insert(key, Item::Table(Table::new()));
        added_fields.push(key.to_string());
    }
}

fn ensure_field(
    table: &mut Table,
    key: &str,
    default_value: Value,
    added_fields: &mut Vec<String>,
) {
    if !table.contains_key(key) {
        table[key] = Item::Value(default_value);
        added_fields.push(key.to_string());
    }
}
