use std::path::{Path, PathBuf};

use driftwood_core::compose::ClinicProfile;
use driftwood_engine::RunSettings;
use driftwood_openphone::OpenPhoneConfig;
use driftwood_summary::SmtpConfig;
use serde::{Deserialize, Serialize};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

const REDACTED: &str = "****";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftwoodConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    pub clinic: ClinicProfile,
    /// Staff member the texts are signed by.
    pub sender_name: String,
    #[serde(default)]
    pub spanish_enabled: bool,
    pub openphone: OpenPhoneConfig,
    pub database_path: PathBuf,
    /// Where the run summary is mailed. Without it the summary is printed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SmtpConfig>,
}

impl DriftwoodConfig {
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            clinic: self.clinic.clone(),
            sender_name: self.sender_name.clone(),
            spanish_enabled: self.spanish_enabled,
        }
    }
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("driftwood").join("config.json"))
}

pub fn load_config(path: &Path) -> eyre::Result<DriftwoodConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: DriftwoodConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update driftwood."
        ));
    }

    // v0 → v1: openphone.key became openphone.api_key
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        if let Some(openphone) = obj.get_mut("openphone").and_then(|v| v.as_object_mut()) {
            if let Some(key) = openphone.remove("key") {
                openphone.entry("api_key").or_insert(key);
            }
        }
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (renamed openphone.key)");
    }

    Ok(json)
}

pub fn save_config(path: &Path, config: &DriftwoodConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path has no parent: {}", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    // The file holds the messaging API key and SMTP password.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

/// The config as JSON with secrets masked, for display.
pub fn redacted(config: &DriftwoodConfig) -> eyre::Result<serde_json::Value> {
    let mut shown = config.clone();
    shown.openphone.api_key = redact_key(&shown.openphone.api_key);
    if let Some(smtp) = shown.summary.as_mut() {
        if smtp.password.is_some() {
            smtp.password = Some(REDACTED.to_string());
        }
    }
    Ok(serde_json::to_value(&shown)?)
}

fn redact_key(key: &str) -> String {
    if key.len() <= 8 {
        return REDACTED.to_string();
    }
    let suffix = &key[key.len() - 4..];
    format!("{REDACTED}{suffix}")
}
