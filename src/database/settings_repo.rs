// Settings repository for chat-local
// Handles CRUD operations for application settings

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::models::{AllSettings, Setting};
use super::DatabaseManager;

impl DatabaseManager {
    /// Get a single setting by key
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| {
            get_setting_impl(conn, key)
        })
    }

    /// Set a single setting
    pub fn set_setting(&self, key: &str, value: &str, value_type: &str) -> Result<()> {
        self.with_connection(|conn| {
            set_setting_impl(conn, key, value, value_type)
        })
    }

    /// Get all settings
    pub fn get_all_settings_list(&self) -> Result<Vec<Setting>> {
        self.with_connection(get_all_settings_impl)
    }

    /// Load all settings as a structured object
    pub fn load_all_settings(&self) -> Result<AllSettings> {
        self.with_connection(load_all_settings_impl)
    }

    /// Set a boolean setting
    pub fn set_bool_setting(&self, key: &str, value: bool) -> Result<()> {
        self.set_setting(key, if value { "true" } else { "false" }, "boolean")
    }

    /// Get a boolean setting
    pub fn get_bool_setting(&self, key: &str, default: bool) -> Result<bool> {
        match self.get_setting(key)? {
            Some(v) => Ok(v == "true"),
            None => Ok(default),
        }
    }

    /// Delete a setting by key
    pub fn delete_setting(&self, key: &str) -> Result<()> {
        self.with_connection(|conn| {
            delete_setting_impl(conn, key)
        })
    }
}

fn get_setting_impl(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare(
        "SELECT value FROM settings WHERE key = ?"
    ).context("Failed to prepare get_setting query")?;

    let result = stmt.query_row(params![key], |row| row.get(0));

    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context("Failed to get setting"),
    }
}

fn set_setting_impl(conn: &Connection, key: &str, value: &str, value_type: &str) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO settings (key, value, value_type, updated_at)
        VALUES (?1, ?2, ?3, datetime('now'))
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            value_type = excluded.value_type,
            updated_at = datetime('now')
        "#,
        params![key, value, value_type],
    ).context("Failed to set setting")?;

    Ok(())
}

fn get_all_settings_impl(conn: &Connection) -> Result<Vec<Setting>> {
    let mut stmt = conn.prepare(
        "SELECT key, value, value_type, updated_at FROM settings"
    ).context("Failed to prepare get_all_settings query")?;

    let settings = stmt.query_map([], |row| {
        Ok(Setting {
            key: row.get(0)?,
            value: row.get(1)?,
            value_type: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }).context("Failed to query settings")?;

    settings.collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to collect settings")
}

fn load_all_settings_impl(conn: &Connection) -> Result<AllSettings> {
    let mut settings = AllSettings::default();

    let mut stmt = conn.prepare(
        "SELECT key, value FROM settings"
    ).context("Failed to prepare load_all_settings query")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
        ))
    }).context("Failed to query settings")?;

    for row in rows {
        let (key, value) = row.context("Failed to read setting row")?;

        match key.as_str() {
            "tts_language" => settings.tts_language = Some(value),
            "auto_speak_responses" => settings.auto_speak_responses = value == "true",
            "saved_model_path" => settings.saved_model_path = Some(value),
            "saved_model_name" => settings.saved_model_name = Some(value),
            _ => {
                log::debug!("Unknown setting key: {}", key);
            }
        }
    }

    Ok(settings)
}

fn delete_setting_impl(conn: &Connection, key: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM settings WHERE key = ?",
        params![key],
    ).context("Failed to delete setting")?;

    Ok(())
}
