//! Handlers for `svara config`.
//!
//! The `cmd_config_*` functions are generic over [`ConfigManager`] and write
//! their output to the given writer. The TOML dotted-key helpers are public
//! for reuse.

use std::io::Write;
use std::path::PathBuf;

use svara_core::config::{ConfigManager, SvaraConfig};
use svara_core::{Error, Result};

use crate::cli::ConfigAction;

/// Dispatches a `svara config` action.
pub fn handle_config_command(
    config_path: Option<&str>,
    action: ConfigAction,
    out: &mut dyn Write,
) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path::<SvaraConfig>(config_path, out),
        ConfigAction::Get { key } => cmd_config_get::<SvaraConfig>(config_path, &key, out),
        ConfigAction::Set { key, value } => {
            cmd_config_set::<SvaraConfig>(config_path, &key, &value, out)
        }
        ConfigAction::Init { file, force } => {
            cmd_config_init::<SvaraConfig>(file.as_deref().or(config_path), force, out)
        }
        ConfigAction::Export { docker_env } => {
            let config = SvaraConfig::load(config_path)?;
            cmd_config_export(&config, docker_env, out)
        }
    }
}

fn write_err(e: std::io::Error) -> Error {
    Error::io_with_path(e, "<stdout>")
}

/// Prints the resolved config file path.
pub fn cmd_config_path<C: ConfigManager>(config_path: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let path = C::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    writeln!(out, "{}", path.display()).map_err(write_err)?;
    if !path.exists() {
        tracing::info!(
            "{} does not exist yet, run `{} config init` to create it",
            path.display(),
            C::project_name()
        );
    }
    Ok(())
}

/// Prints a value by dotted key.
pub fn cmd_config_get<C: ConfigManager>(
    config_path: Option<&str>,
    key: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let config = C::load(config_path)?;
    let value = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    let found = get_nested_value(&value, key)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))?;
    writeln!(out, "{}", format_toml_value(found)).map_err(write_err)
}

/// Sets a value by dotted key in the existing config file.
///
/// The edited file must still parse as `C`.
pub fn cmd_config_set<C: ConfigManager>(
    config_path: Option<&str>,
    key: &str,
    value: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let path = C::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `{} config init` first.",
            path.display(),
            C::project_name()
        )));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;

    set_nested_value(&mut doc, key, parse_value(value))?;
    let toml_str = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    toml::from_str::<C>(&toml_str)
        .map_err(|e| Error::config(format!("Invalid value for '{key}': {e}")))?;

    std::fs::write(&path, toml_str).map_err(|e| Error::io_with_path(e, &path))?;

    writeln!(out, "Set {key} = {value} in {}", path.display()).map_err(write_err)
}

/// Writes a default configuration file.
pub fn cmd_config_init<C: ConfigManager>(
    file: Option<&str>,
    force: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => C::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = C::default().to_toml_string()?;
    std::fs::write(&path, &toml_str).map_err(|e| Error::io_with_path(e, &path))?;

    writeln!(out, "Config file created at {}", path.display()).map_err(write_err)
}

/// Prints the configuration as environment variables.
pub fn cmd_config_export<C: ConfigManager>(
    config: &C,
    docker_env: bool,
    out: &mut dyn Write,
) -> Result<()> {
    for (key, value) in config.to_env_vars()? {
        if docker_env {
            writeln!(out, "--env {key}={value}").map_err(write_err)?;
        } else {
            writeln!(out, "{key}={value}").map_err(write_err)?;
        }
    }
    Ok(())
}

/// Navigates a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Sets a value at a dotted key path, creating intermediate tables as needed.
pub fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let (parents, last) = match key.rsplit_once('.') {
        Some((parents, last)) => (Some(parents), last),
        None => (None, key),
    };
    if last.is_empty() {
        return Err(Error::config("Empty key path"));
    }

    let mut current = root;
    for part in parents.into_iter().flat_map(|p| p.split('.')) {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?
        .insert(last.to_string(), value);
    Ok(())
}

/// Parses a string into a TOML value: bool, then integer, then float, then string.
pub fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => return toml::Value::Boolean(true),
        "false" => return toml::Value::Boolean(false),
        _ => {}
    }
    if let Ok(i) = s.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(s.to_string())
}

/// Formats a TOML value for display.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}
