//! Configuration loading.
//!
//! Configuration is a TOML file resolved in this order:
//!
//! 1. an explicit path (`--config`)
//! 2. the `SVARA_CONFIG` environment variable
//! 3. `<platform config dir>/svara/config.toml`
//!
//! A missing file yields defaults. Environment variables are applied last
//! (`SVARA_SUPABASE_URL`, `SVARA_SUPABASE_ANON_KEY`, ...).

use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::media::{DEFAULT_MAX_IMAGE_BYTES, MediaRules};

/// Behaviour shared by loadable, exportable configuration types.
pub trait ConfigManager: Default + Serialize + DeserializeOwned {
    /// Project name, used for the config directory and env prefix.
    fn project_name() -> &'static str;

    /// Applies overrides looked up by environment variable name.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>;

    /// Flattens the configuration into environment variables.
    fn to_env_vars(&self) -> Result<Vec<(String, String)>>;

    /// Default config file location for this platform.
    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(Self::project_name()).join("config.toml"))
    }

    /// Picks the config file to use.
    fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        let var = format!("{}_CONFIG", Self::project_name().to_uppercase());
        if let Ok(path) = std::env::var(&var) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        Self::default_config_path()
    }

    /// Loads the file (or defaults) and applies environment overrides.
    fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(config_path) {
            Some(path) if path.exists() => {
                let content =
                    std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
                toml::from_str(&content).map_err(|e| {
                    Error::config(format!("Failed to parse {}: {e}", path.display()))
                })?
            }
            Some(path) => {
                log::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Renders the configuration as TOML.
    fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}

/// Remote data service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseSettings {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public anon key sent as `apikey`.
    pub anon_key: String,
    /// Table holding client rows.
    pub table: String,
    /// Private bucket holding car photos.
    pub bucket: String,
    /// Folder inside the bucket for new uploads.
    pub object_prefix: String,
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            table: "clients".to_string(),
            bucket: "cars".to_string(),
            object_prefix: "cars".to_string(),
        }
    }
}

/// Photo upload and display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Upload ceiling in bytes.
    pub max_image_bytes: u64,
    /// Validity of signed URLs, in seconds.
    pub signed_url_ttl_secs: u64,
    /// Reuse signed URLs across lookups of the same object.
    pub cache_signed_urls: bool,
    /// `cache-control` max-age sent with uploads, in seconds.
    pub upload_cache_control_secs: u64,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            signed_url_ttl_secs: 3600,
            cache_signed_urls: false,
            upload_cache_control_secs: 3600,
        }
    }
}

impl MediaSettings {
    /// Upload rules derived from these settings.
    pub fn rules(&self) -> MediaRules {
        MediaRules::with_max_bytes(self.max_image_bytes)
    }

    /// Signed URL validity.
    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }
}

/// Admin panel behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// How long a banner message stays visible, in seconds.
    pub banner_dismiss_secs: u64,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            banner_dismiss_secs: 5,
        }
    }
}

impl AdminSettings {
    /// Banner lifetime.
    pub fn banner_ttl(&self) -> Duration {
        Duration::from_secs(self.banner_dismiss_secs)
    }
}

/// Where the signed-in session is kept between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Session file; empty means `<config dir>/svara/session.json`.
    pub file: String,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvaraConfig {
    /// Remote data service.
    pub supabase: SupabaseSettings,
    /// Photos.
    pub media: MediaSettings,
    /// Admin panel.
    pub admin: AdminSettings,
    /// Session persistence.
    pub session: SessionSettings,
}

impl SvaraConfig {
    /// Checks that the remote service can be reached with these settings.
    pub fn validate(&self) -> Result<()> {
        if self.supabase.url.trim().is_empty() {
            return Err(Error::config(
                "supabase.url is not set (config file or SVARA_SUPABASE_URL)",
            ));
        }
        url::Url::parse(&self.supabase.url)
            .map_err(|e| Error::config(format!("supabase.url is not a valid URL: {e}")))?;
        if self.supabase.anon_key.trim().is_empty() {
            return Err(Error::config(
                "supabase.anon_key is not set (config file or SVARA_SUPABASE_ANON_KEY)",
            ));
        }
        if self.media.signed_url_ttl_secs == 0 {
            return Err(Error::config("media.signed_url_ttl_secs must be positive"));
        }
        Ok(())
    }

    /// Resolved session file location.
    pub fn session_path(&self) -> Option<PathBuf> {
        if !self.session.file.is_empty() {
            return Some(PathBuf::from(&self.session.file));
        }
        dirs::config_dir().map(|d| d.join(Self::project_name()).join("session.json"))
    }
}

impl ConfigManager for SvaraConfig {
    fn project_name() -> &'static str {
        "svara"
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SVARA_SUPABASE_URL") {
            self.supabase.url = v;
        }
        if let Some(v) = lookup("SVARA_SUPABASE_ANON_KEY") {
            self.supabase.anon_key = v;
        }
        if let Some(v) = lookup("SVARA_SUPABASE_BUCKET") {
            self.supabase.bucket = v;
        }
        if let Some(v) = lookup("SVARA_SESSION_FILE") {
            self.session.file = v;
        }
        if let Some(v) = lookup("SVARA_MAX_IMAGE_BYTES") {
            match v.parse() {
                Ok(n) => self.media.max_image_bytes = n,
                Err(_) => log::warn!("Ignoring SVARA_MAX_IMAGE_BYTES={v}: not a number"),
            }
        }
    }

    fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        Ok(vec![
            ("SVARA_SUPABASE_URL".to_string(), self.supabase.url.clone()),
            (
                "SVARA_SUPABASE_ANON_KEY".to_string(),
                self.supabase.anon_key.clone(),
            ),
            (
                "SVARA_SUPABASE_BUCKET".to_string(),
                self.supabase.bucket.clone(),
            ),
            ("SVARA_SESSION_FILE".to_string(), self.session.file.clone()),
            (
                "SVARA_MAX_IMAGE_BYTES".to_string(),
                self.media.max_image_bytes.to_string(),
            ),
        ])
    }
}
