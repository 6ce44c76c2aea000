use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::suggest::{KeyBindings, KeyError, KeyIdentifier};

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_IDLE_MS: u64 = 600;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
    pub accept_key: Option<String>,
    pub reject_key: Option<String>,
    pub auto_suggest: bool,
    pub idle_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches are OR-ed, values in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            endpoint: other.endpoint.clone().or_else(|| self.endpoint.clone()),
            timeout_ms: other.timeout_ms.or(self.timeout_ms),
            accept_key: other.accept_key.clone().or_else(|| self.accept_key.clone()),
            reject_key: other.reject_key.clone().or_else(|| self.reject_key.clone()),
            auto_suggest: self.auto_suggest || other.auto_suggest,
            idle_ms: other.idle_ms.or(self.idle_ms),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    pub fn idle_delay_ms(&self) -> u64 {
        self.idle_ms.unwrap_or(DEFAULT_IDLE_MS)
    }

    /// Resolve the accept/reject keys, falling back to Tab and Esc.
    ///
    /// # Errors
    ///
    /// Fails on an unknown key name or if both resolve to the same key.
    pub fn key_bindings(&self) -> Result<KeyBindings, KeyError> {
        let defaults = KeyBindings::default();
        let accept = self
            .accept_key
            .as_deref()
            .map_or(Ok(defaults.accept_key()), str::parse::<KeyIdentifier>)?;
        let reject = self
            .reject_key
            .as_deref()
            .map_or(Ok(defaults.reject_key()), str::parse::<KeyIdentifier>)?;
        KeyBindings::new(accept, reject)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("inkling").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("inkling")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("inkling").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("inkling")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".inklingrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# inkling defaults (saved with --save)".to_string()];
    if let Some(endpoint) = &flags.endpoint {
        lines.push(format!("--endpoint {endpoint}"));
    }
    if let Some(ms) = flags.timeout_ms {
        lines.push(format!("--timeout-ms {ms}"));
    }
    if let Some(key) = &flags.accept_key {
        lines.push(format!("--accept-key {key}"));
    }
    if let Some(key) = &flags.reject_key {
        lines.push(format!("--reject-key {key}"));
    }
    if flags.auto_suggest {
        lines.push("--auto-suggest".to_string());
    }
    if let Some(ms) = flags.idle_ms {
        lines.push(format!("--idle-ms {ms}"));
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick recognized flags out of `tokens`. Unknown tokens and malformed
/// numbers are ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--auto-suggest" {
            flags.auto_suggest = true;
            i += 1;
            continue;
        }
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (token, None),
        };
        if !matches!(
            name,
            "--endpoint"
                | "--timeout-ms"
                | "--accept-key"
                | "--reject-key"
                | "--idle-ms"
                | "--log-file"
        ) {
            i += 1;
            continue;
        }
        let value = match inline_value {
            Some(value) => value,
            None => {
                let Some(next) = tokens.get(i + 1) else {
                    break;
                };
                i += 1;
                next.clone()
            }
        };
        match name {
            "--endpoint" => flags.endpoint = Some(value),
            "--timeout-ms" => flags.timeout_ms = value.parse().ok(),
            "--accept-key" => flags.accept_key = Some(value),
            "--reject-key" => flags.reject_key = Some(value),
            "--idle-ms" => flags.idle_ms = value.parse().ok(),
            "--log-file" => flags.log_file = Some(PathBuf::from(value)),
            _ => {}
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "inkling",
            "--endpoint",
            "http://localhost:8787",
            "--timeout-ms=2500",
            "--accept-key",
            "ctrl-y",
            "--auto-suggest",
            "--idle-ms",
            "900",
            "--log-file=inkling.log",
            "draft.md",
        ]));
        assert_eq!(flags.endpoint.as_deref(), Some("http://localhost:8787"));
        assert_eq!(flags.timeout_ms, Some(2500));
        assert_eq!(flags.accept_key.as_deref(), Some("ctrl-y"));
        assert!(flags.auto_suggest);
        assert_eq!(flags.idle_ms, Some(900));
        assert_eq!(flags.log_file, Some(PathBuf::from("inkling.log")));
        assert_eq!(flags.reject_key, None);
    }

    #[test]
    fn test_malformed_number_is_ignored() {
        let flags = parse_flag_tokens(&tokens(&["--timeout-ms", "soon"]));
        assert_eq!(flags.timeout_ms, None);
        assert_eq!(flags.timeout(), Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }

    #[test]
    fn test_trailing_flag_without_value() {
        let flags = parse_flag_tokens(&tokens(&["--auto-suggest", "--endpoint"]));
        assert!(flags.auto_suggest);
        assert_eq!(flags.endpoint, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            auto_suggest: true,
            endpoint: Some("http://file".to_string()),
            idle_ms: Some(300),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            endpoint: Some("http://cli".to_string()),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.auto_suggest);
        assert_eq!(merged.endpoint.as_deref(), Some("http://cli"));
        assert_eq!(merged.idle_delay_ms(), 300);
    }

    #[test]
    fn test_key_bindings_default_and_custom() {
        let defaults = ConfigFlags::default().key_bindings().unwrap();
        assert_eq!(defaults, KeyBindings::default());

        let flags = ConfigFlags {
            accept_key: Some("ctrl-y".to_string()),
            reject_key: Some("ctrl-n".to_string()),
            ..ConfigFlags::default()
        };
        let keys = flags.key_bindings().unwrap();
        assert_eq!(keys.accept_key(), KeyIdentifier::Ctrl('y'));
        assert_eq!(keys.reject_key(), KeyIdentifier::Ctrl('n'));
    }

    #[test]
    fn test_key_bindings_reject_conflict_and_unknown() {
        let conflict = ConfigFlags {
            accept_key: Some("esc".to_string()),
            ..ConfigFlags::default()
        };
        assert_eq!(
            conflict.key_bindings(),
            Err(KeyError::Conflict(KeyIdentifier::Esc))
        );

        let unknown = ConfigFlags {
            reject_key: Some("hyper-q".to_string()),
            ..ConfigFlags::default()
        };
        assert!(matches!(unknown.key_bindings(), Err(KeyError::Unknown(_))));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".inklingrc");
        let flags = ConfigFlags {
            endpoint: Some("http://localhost:8787".to_string()),
            timeout_ms: Some(1500),
            accept_key: Some("ctrl-y".to_string()),
            reject_key: Some("ctrl-n".to_string()),
            auto_suggest: true,
            idle_ms: Some(750),
            log_file: Some(PathBuf::from("inkling.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
